//! Repository for the `borrow_history` table.

use sqlx::PgPool;
use uuid::Uuid;

use lenderoo_core::history::BorrowHistory;

use crate::error::{parse_uuid, StoreError};
use crate::models::history::{CreateHistoryRecord, HistoryRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, item_id, friend_id, borrowed_date, due_date, returned_date, \
     notes, legacy_id, created_at";

/// Provides append and close operations for borrow history.
pub struct HistoryRepo;

impl HistoryRepo {
    /// Append a history entry for `user_id`, returning the created row.
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        input: &CreateHistoryRecord,
    ) -> Result<HistoryRow, StoreError> {
        let item_id = parse_uuid(&input.entry.item_id)?;
        let friend_id = parse_uuid(&input.entry.friend_id)?;
        let query = format!(
            "INSERT INTO borrow_history (user_id, item_id, friend_id, borrowed_date, due_date,
                                         returned_date, notes, legacy_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, HistoryRow>(&query)
            .bind(user_id)
            .bind(item_id)
            .bind(friend_id)
            .bind(input.entry.borrowed_date)
            .bind(input.entry.due_date)
            .bind(input.entry.returned_date)
            .bind(&input.entry.notes)
            .bind(&input.legacy_id)
            .fetch_one(pool)
            .await?;
        Ok(row)
    }

    /// Find an entry previously copied from the device with the given local id.
    pub async fn find_by_legacy_id(
        pool: &PgPool,
        user_id: Uuid,
        legacy_id: &str,
    ) -> Result<Option<HistoryRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM borrow_history WHERE user_id = $1 AND legacy_id = $2"
        );
        sqlx::query_as::<_, HistoryRow>(&query)
            .bind(user_id)
            .bind(legacy_id)
            .fetch_optional(pool)
            .await
    }

    /// List the history of one item, most recent loan first.
    pub async fn list_by_item(pool: &PgPool, item_id: Uuid) -> Result<Vec<HistoryRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM borrow_history
             WHERE item_id = $1
             ORDER BY borrowed_date DESC"
        );
        sqlx::query_as::<_, HistoryRow>(&query)
            .bind(item_id)
            .fetch_all(pool)
            .await
    }

    /// Persist the mutable fields of an entry (due date, return, notes).
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        entry: &BorrowHistory,
    ) -> Result<Option<HistoryRow>, sqlx::Error> {
        let query = format!(
            "UPDATE borrow_history SET
                due_date = $2,
                returned_date = $3,
                notes = $4
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, HistoryRow>(&query)
            .bind(id)
            .bind(entry.due_date)
            .bind(entry.returned_date)
            .bind(&entry.notes)
            .fetch_optional(pool)
            .await
    }
}
