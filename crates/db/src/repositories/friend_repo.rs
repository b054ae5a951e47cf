//! Repository for the `friends` table.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::friend::{CreateFriendRecord, FriendRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, name, email, phone, avatar_url, current_items_borrowed, \
     total_items_borrowed, owned_items_count, legacy_id, created_at, updated_at";

/// Provides CRUD operations for friends plus loan counter updates.
pub struct FriendRepo;

impl FriendRepo {
    /// Insert a new friend owned by `user_id`, returning the created row.
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        input: &CreateFriendRecord,
    ) -> Result<FriendRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO friends (user_id, name, email, phone, avatar_url, current_items_borrowed,
                                  total_items_borrowed, legacy_id, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, COALESCE($9, NOW()))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FriendRow>(&query)
            .bind(user_id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.avatar_url)
            .bind(to_column(input.current_items_borrowed))
            .bind(to_column(input.total_items_borrowed))
            .bind(&input.legacy_id)
            .bind(input.created_at)
            .fetch_one(pool)
            .await
    }

    /// Find a friend by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<FriendRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM friends WHERE id = $1");
        sqlx::query_as::<_, FriendRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a friend previously copied from the device with the given local id.
    pub async fn find_by_legacy_id(
        pool: &PgPool,
        user_id: Uuid,
        legacy_id: &str,
    ) -> Result<Option<FriendRow>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM friends WHERE user_id = $1 AND legacy_id = $2");
        sqlx::query_as::<_, FriendRow>(&query)
            .bind(user_id)
            .bind(legacy_id)
            .fetch_optional(pool)
            .await
    }

    /// List all friends of `user_id`, ordered by name ascending.
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<FriendRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM friends
             WHERE user_id = $1
             ORDER BY name ASC"
        );
        sqlx::query_as::<_, FriendRow>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Overwrite the loan counters. Returns `None` if the friend is gone.
    pub async fn update_counts(
        pool: &PgPool,
        id: Uuid,
        current_items_borrowed: u32,
        total_items_borrowed: u32,
    ) -> Result<Option<FriendRow>, sqlx::Error> {
        let query = format!(
            "UPDATE friends SET
                current_items_borrowed = $2,
                total_items_borrowed = $3,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FriendRow>(&query)
            .bind(id)
            .bind(to_column(current_items_borrowed))
            .bind(to_column(total_items_borrowed))
            .fetch_optional(pool)
            .await
    }

    /// Delete a friend by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM friends WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn to_column(count: u32) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}
