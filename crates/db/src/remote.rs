//! Relational remote store seam and its Postgres implementation.

use async_trait::async_trait;

use lenderoo_core::friend::Friend;
use lenderoo_core::history::BorrowHistory;
use lenderoo_core::item::Item;

use crate::error::{parse_uuid, StoreError};
use crate::models::friend::CreateFriendRecord;
use crate::models::history::CreateHistoryRecord;
use crate::models::item::CreateItemRecord;
use crate::repositories::{FriendRepo, HistoryRepo, ItemRepo};
use crate::DbPool;

/// Typed access to the hosted relational store.
///
/// Owner-scoped operations take the signed-in user's id; the store stamps it
/// on every created row.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    // -- friends ------------------------------------------------------------

    async fn create_friend(&self, owner_id: &str, input: &CreateFriendRecord)
        -> Result<Friend, StoreError>;
    async fn find_friend(&self, id: &str) -> Result<Option<Friend>, StoreError>;
    async fn find_friend_by_legacy_id(
        &self,
        owner_id: &str,
        legacy_id: &str,
    ) -> Result<Option<Friend>, StoreError>;
    async fn list_friends(&self, owner_id: &str) -> Result<Vec<Friend>, StoreError>;
    async fn update_friend_counts(
        &self,
        id: &str,
        current_items_borrowed: u32,
        total_items_borrowed: u32,
    ) -> Result<Option<Friend>, StoreError>;
    async fn delete_friend(&self, id: &str) -> Result<bool, StoreError>;

    // -- items --------------------------------------------------------------

    async fn create_item(&self, owner_id: &str, input: &CreateItemRecord)
        -> Result<Item, StoreError>;
    async fn find_item(&self, id: &str) -> Result<Option<Item>, StoreError>;
    async fn find_item_by_legacy_id(
        &self,
        owner_id: &str,
        legacy_id: &str,
    ) -> Result<Option<Item>, StoreError>;
    async fn list_items(&self, owner_id: &str) -> Result<Vec<Item>, StoreError>;
    /// Items currently out with `friend_id` and not yet returned.
    async fn list_items_lent_to(&self, friend_id: &str) -> Result<Vec<Item>, StoreError>;
    async fn update_item(&self, item: &Item) -> Result<Option<Item>, StoreError>;
    async fn delete_item(&self, id: &str) -> Result<bool, StoreError>;

    // -- history ------------------------------------------------------------

    async fn create_history(
        &self,
        owner_id: &str,
        input: &CreateHistoryRecord,
    ) -> Result<BorrowHistory, StoreError>;
    async fn find_history_by_legacy_id(
        &self,
        owner_id: &str,
        legacy_id: &str,
    ) -> Result<Option<BorrowHistory>, StoreError>;
    async fn list_history_for_item(&self, item_id: &str)
        -> Result<Vec<BorrowHistory>, StoreError>;
    async fn update_history(&self, entry: &BorrowHistory)
        -> Result<Option<BorrowHistory>, StoreError>;
}

/// [`RemoteStore`] backed by a Postgres pool.
#[derive(Clone)]
pub struct PgRemoteStore {
    pool: DbPool,
}

impl PgRemoteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl RemoteStore for PgRemoteStore {
    async fn create_friend(
        &self,
        owner_id: &str,
        input: &CreateFriendRecord,
    ) -> Result<Friend, StoreError> {
        let row = FriendRepo::create(&self.pool, parse_uuid(owner_id)?, input).await?;
        tracing::debug!(friend_id = %row.id, "Friend created");
        Ok(row.into())
    }

    async fn find_friend(&self, id: &str) -> Result<Option<Friend>, StoreError> {
        let row = FriendRepo::find_by_id(&self.pool, parse_uuid(id)?).await?;
        Ok(row.map(Into::into))
    }

    async fn find_friend_by_legacy_id(
        &self,
        owner_id: &str,
        legacy_id: &str,
    ) -> Result<Option<Friend>, StoreError> {
        let row =
            FriendRepo::find_by_legacy_id(&self.pool, parse_uuid(owner_id)?, legacy_id).await?;
        Ok(row.map(Into::into))
    }

    async fn list_friends(&self, owner_id: &str) -> Result<Vec<Friend>, StoreError> {
        let rows = FriendRepo::list_by_user(&self.pool, parse_uuid(owner_id)?).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_friend_counts(
        &self,
        id: &str,
        current_items_borrowed: u32,
        total_items_borrowed: u32,
    ) -> Result<Option<Friend>, StoreError> {
        let row = FriendRepo::update_counts(
            &self.pool,
            parse_uuid(id)?,
            current_items_borrowed,
            total_items_borrowed,
        )
        .await?;
        Ok(row.map(Into::into))
    }

    async fn delete_friend(&self, id: &str) -> Result<bool, StoreError> {
        Ok(FriendRepo::delete(&self.pool, parse_uuid(id)?).await?)
    }

    async fn create_item(
        &self,
        owner_id: &str,
        input: &CreateItemRecord,
    ) -> Result<Item, StoreError> {
        let row = ItemRepo::create(&self.pool, parse_uuid(owner_id)?, input).await?;
        tracing::debug!(item_id = %row.id, "Item created");
        Ok(row.into())
    }

    async fn find_item(&self, id: &str) -> Result<Option<Item>, StoreError> {
        let row = ItemRepo::find_by_id(&self.pool, parse_uuid(id)?).await?;
        Ok(row.map(Into::into))
    }

    async fn find_item_by_legacy_id(
        &self,
        owner_id: &str,
        legacy_id: &str,
    ) -> Result<Option<Item>, StoreError> {
        let row = ItemRepo::find_by_legacy_id(&self.pool, parse_uuid(owner_id)?, legacy_id).await?;
        Ok(row.map(Into::into))
    }

    async fn list_items(&self, owner_id: &str) -> Result<Vec<Item>, StoreError> {
        let rows = ItemRepo::list_by_user(&self.pool, parse_uuid(owner_id)?).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_items_lent_to(&self, friend_id: &str) -> Result<Vec<Item>, StoreError> {
        let rows = ItemRepo::list_lent_to(&self.pool, parse_uuid(friend_id)?).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_item(&self, item: &Item) -> Result<Option<Item>, StoreError> {
        let row = ItemRepo::update(&self.pool, parse_uuid(&item.id)?, item).await?;
        Ok(row.map(Into::into))
    }

    async fn delete_item(&self, id: &str) -> Result<bool, StoreError> {
        Ok(ItemRepo::delete(&self.pool, parse_uuid(id)?).await?)
    }

    async fn create_history(
        &self,
        owner_id: &str,
        input: &CreateHistoryRecord,
    ) -> Result<BorrowHistory, StoreError> {
        let row = HistoryRepo::create(&self.pool, parse_uuid(owner_id)?, input).await?;
        Ok(row.into())
    }

    async fn find_history_by_legacy_id(
        &self,
        owner_id: &str,
        legacy_id: &str,
    ) -> Result<Option<BorrowHistory>, StoreError> {
        let row =
            HistoryRepo::find_by_legacy_id(&self.pool, parse_uuid(owner_id)?, legacy_id).await?;
        Ok(row.map(Into::into))
    }

    async fn list_history_for_item(&self, item_id: &str) -> Result<Vec<BorrowHistory>, StoreError> {
        let rows = HistoryRepo::list_by_item(&self.pool, parse_uuid(item_id)?).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_history(
        &self,
        entry: &BorrowHistory,
    ) -> Result<Option<BorrowHistory>, StoreError> {
        let row = HistoryRepo::update(&self.pool, parse_uuid(&entry.id)?, entry).await?;
        Ok(row.map(Into::into))
    }
}
