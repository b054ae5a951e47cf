//! Borrow-history row model and insert DTO.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use lenderoo_core::history::{BorrowHistory, NewBorrowHistory};
use lenderoo_core::types::Timestamp;

/// A row from the `borrow_history` table.
#[derive(Debug, Clone, FromRow)]
pub struct HistoryRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub item_id: Uuid,
    pub friend_id: Uuid,
    pub borrowed_date: Timestamp,
    pub due_date: Option<Timestamp>,
    pub returned_date: Option<Timestamp>,
    pub notes: Option<String>,
    pub legacy_id: Option<String>,
    pub created_at: Timestamp,
}

impl From<HistoryRow> for BorrowHistory {
    fn from(row: HistoryRow) -> Self {
        BorrowHistory {
            id: row.id.to_string(),
            user_id: row.user_id.to_string(),
            item_id: row.item_id.to_string(),
            friend_id: row.friend_id.to_string(),
            borrowed_date: row.borrowed_date,
            due_date: row.due_date,
            returned_date: row.returned_date,
            notes: row.notes,
            created_at: row.created_at,
        }
    }
}

/// DTO for inserting a history entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateHistoryRecord {
    pub entry: NewBorrowHistory,
    /// On-device id when the row is copied from the local store.
    pub legacy_id: Option<String>,
}

impl From<NewBorrowHistory> for CreateHistoryRecord {
    fn from(entry: NewBorrowHistory) -> Self {
        Self {
            entry,
            legacy_id: None,
        }
    }
}
