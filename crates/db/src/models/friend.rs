//! Friend row model and insert DTO.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use lenderoo_core::friend::{Friend, NewFriend};
use lenderoo_core::types::Timestamp;

/// A row from the `friends` table.
#[derive(Debug, Clone, FromRow)]
pub struct FriendRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub current_items_borrowed: i32,
    pub total_items_borrowed: i32,
    pub owned_items_count: i32,
    pub legacy_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<FriendRow> for Friend {
    fn from(row: FriendRow) -> Self {
        Friend {
            id: row.id.to_string(),
            user_id: row.user_id.to_string(),
            name: row.name,
            email: row.email,
            phone: row.phone,
            avatar_url: row.avatar_url,
            current_items_borrowed: count(row.current_items_borrowed),
            total_items_borrowed: count(row.total_items_borrowed),
            owned_items_count: count(row.owned_items_count),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub(crate) fn count(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

/// DTO for inserting a friend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateFriendRecord {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub current_items_borrowed: u32,
    pub total_items_borrowed: u32,
    /// On-device id when the row is copied from the local store.
    pub legacy_id: Option<String>,
    /// Defaults to now when `None`.
    pub created_at: Option<Timestamp>,
}

impl From<NewFriend> for CreateFriendRecord {
    fn from(input: NewFriend) -> Self {
        Self {
            name: input.name.trim().to_string(),
            email: input.email,
            phone: input.phone,
            avatar_url: input.avatar_url,
            ..Default::default()
        }
    }
}
