//! Repository for the `items` table.

use sqlx::PgPool;
use uuid::Uuid;

use lenderoo_core::item::Item;

use crate::error::{parse_uuid, StoreError};
use crate::models::item::{CreateItemRecord, ItemRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, name, description, notes, category, images, borrowed_by, \
     borrowed_date, due_date, returned_date, metadata, legacy_id, created_at, updated_at";

/// Provides CRUD operations for items.
pub struct ItemRepo;

impl ItemRepo {
    /// Insert a new item owned by `user_id`, returning the created row.
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        input: &CreateItemRecord,
    ) -> Result<ItemRow, StoreError> {
        let borrowed_by = input.borrowed_by.as_deref().map(parse_uuid).transpose()?;
        let metadata = input
            .metadata
            .as_ref()
            .map(serde_json::to_value)
            .transpose()?;
        let query = format!(
            "INSERT INTO items (user_id, name, description, notes, category, images, borrowed_by,
                                borrowed_date, due_date, returned_date, metadata, legacy_id, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, COALESCE($13, NOW()))
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, ItemRow>(&query)
            .bind(user_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.notes)
            .bind(input.category.as_str())
            .bind(&input.images)
            .bind(borrowed_by)
            .bind(input.borrowed_date)
            .bind(input.due_date)
            .bind(input.returned_date)
            .bind(metadata)
            .bind(&input.legacy_id)
            .bind(input.created_at)
            .fetch_one(pool)
            .await?;
        Ok(row)
    }

    /// Find an item by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<ItemRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM items WHERE id = $1");
        sqlx::query_as::<_, ItemRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an item previously copied from the device with the given local id.
    pub async fn find_by_legacy_id(
        pool: &PgPool,
        user_id: Uuid,
        legacy_id: &str,
    ) -> Result<Option<ItemRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM items WHERE user_id = $1 AND legacy_id = $2");
        sqlx::query_as::<_, ItemRow>(&query)
            .bind(user_id)
            .bind(legacy_id)
            .fetch_optional(pool)
            .await
    }

    /// List all items owned by `user_id`, newest first.
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<ItemRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM items
             WHERE user_id = $1
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, ItemRow>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// List items currently out with `friend_id` (unreturned).
    pub async fn list_lent_to(pool: &PgPool, friend_id: Uuid) -> Result<Vec<ItemRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM items
             WHERE borrowed_by = $1 AND returned_date IS NULL
             ORDER BY borrowed_date ASC"
        );
        sqlx::query_as::<_, ItemRow>(&query)
            .bind(friend_id)
            .fetch_all(pool)
            .await
    }

    /// Overwrite the mutable fields of an item. Last write wins.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(pool: &PgPool, id: Uuid, item: &Item) -> Result<Option<ItemRow>, StoreError> {
        let borrowed_by = item.borrowed_by.as_deref().map(parse_uuid).transpose()?;
        let metadata = item.metadata.as_ref().map(serde_json::to_value).transpose()?;
        let query = format!(
            "UPDATE items SET
                name = $2,
                description = $3,
                notes = $4,
                category = $5,
                images = $6,
                borrowed_by = $7,
                borrowed_date = $8,
                due_date = $9,
                returned_date = $10,
                metadata = $11,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, ItemRow>(&query)
            .bind(id)
            .bind(&item.name)
            .bind(&item.description)
            .bind(&item.notes)
            .bind(item.category.as_str())
            .bind(&item.images)
            .bind(borrowed_by)
            .bind(item.borrowed_date)
            .bind(item.due_date)
            .bind(item.returned_date)
            .bind(metadata)
            .fetch_optional(pool)
            .await?;
        Ok(row)
    }

    /// Delete an item by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
