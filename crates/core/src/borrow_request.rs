//! Borrow requests between connected users.
//!
//! A request starts `pending` and is either accepted (becoming `active`) or
//! rejected by the item's owner. Requester and item details are denormalized
//! so a request list renders without extra lookups.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::item::ItemCategory;
use crate::types::{EntityId, Timestamp};

/// Lifecycle of a borrow request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorrowRequestStatus {
    Pending,
    Active,
    Rejected,
}

impl BorrowRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Rejected => "rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "active" => Some(Self::Active),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// All valid status values.
    pub const ALL: &'static [&'static str] = &["pending", "active", "rejected"];
}

impl std::fmt::Display for BorrowRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pending or decided request to borrow someone else's item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRequest {
    pub id: EntityId,
    pub item_id: EntityId,
    pub owner_id: EntityId,
    pub requester_id: EntityId,
    pub status: BorrowRequestStatus,
    pub message: Option<String>,
    pub requested_due_date: Option<Timestamp>,
    pub requester_name: String,
    pub requester_avatar_url: Option<String>,
    pub item_name: String,
    pub item_category: ItemCategory,
    #[serde(default)]
    pub item_images: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl BorrowRequest {
    /// Accept the request. Only pending requests can be decided.
    pub fn accept(&mut self, now: Timestamp) -> Result<(), CoreError> {
        self.transition(BorrowRequestStatus::Active, now)
    }

    /// Reject the request. Only pending requests can be decided.
    pub fn reject(&mut self, now: Timestamp) -> Result<(), CoreError> {
        self.transition(BorrowRequestStatus::Rejected, now)
    }

    fn transition(&mut self, to: BorrowRequestStatus, now: Timestamp) -> Result<(), CoreError> {
        if self.status != BorrowRequestStatus::Pending {
            return Err(CoreError::Conflict(format!(
                "borrow request {} is already {}",
                self.id, self.status
            )));
        }
        self.status = to;
        self.updated_at = now;
        Ok(())
    }
}
