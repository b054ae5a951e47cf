//! Item lifecycle: create, lend, set a due date, return, delete.
//!
//! Every operation is scoped to the signed-in user. Writes are sequential
//! and not transactional; the store's last write wins.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use lenderoo_core::error::CoreError;
use lenderoo_core::friend::{Friend, NewFriend};
use lenderoo_core::history::{BorrowHistory, NewBorrowHistory};
use lenderoo_core::item::{validate_loan_fields, Item, NewItem};
use lenderoo_core::status::{ItemStatus, StatusConfig, StatusSummary};
use lenderoo_core::types::Timestamp;
use lenderoo_db::auth::AuthProvider;
use lenderoo_db::object_storage::{item_image_path, ObjectStorage};
use lenderoo_db::remote::RemoteStore;

use crate::error::ServiceResult;

/// Request body for lending an item.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LendItem {
    pub friend_id: String,
    /// Defaults to now.
    pub borrowed_date: Option<Timestamp>,
    pub due_date: Option<Timestamp>,
    pub notes: Option<String>,
}

/// An item together with its derived status fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    #[serde(flatten)]
    pub item: Item,
    #[serde(flatten)]
    pub summary: StatusSummary,
}

#[derive(Clone)]
pub struct LendingService {
    remote: Arc<dyn RemoteStore>,
    auth: Arc<dyn AuthProvider>,
    storage: Arc<dyn ObjectStorage>,
    status: StatusConfig,
}

impl LendingService {
    pub fn new(
        remote: Arc<dyn RemoteStore>,
        auth: Arc<dyn AuthProvider>,
        storage: Arc<dyn ObjectStorage>,
        status: StatusConfig,
    ) -> Self {
        Self {
            remote,
            auth,
            storage,
            status,
        }
    }

    async fn owner_id(&self) -> ServiceResult<String> {
        Ok(self.auth.require_user().await?.id)
    }

    /// Fetch an item owned by the signed-in user.
    ///
    /// Items owned by someone else are reported as not found.
    pub async fn get_item(&self, id: &str) -> ServiceResult<Item> {
        let owner_id = self.owner_id().await?;
        self.remote
            .find_item(id)
            .await?
            .filter(|item| item.user_id == owner_id)
            .ok_or_else(|| not_found("Item", id))
    }

    /// Fetch a friend of the signed-in user.
    pub async fn get_friend(&self, id: &str) -> ServiceResult<Friend> {
        let owner_id = self.owner_id().await?;
        self.remote
            .find_friend(id)
            .await?
            .filter(|friend| friend.user_id == owner_id)
            .ok_or_else(|| not_found("Friend", id))
    }

    pub fn view(&self, item: Item, now: Timestamp) -> ItemView {
        let summary = StatusSummary::for_item(&item, now, &self.status);
        ItemView { item, summary }
    }

    // -- items ------------------------------------------------------------

    pub async fn create_item(&self, input: NewItem) -> ServiceResult<Item> {
        input.validate_all()?;
        let owner_id = self.owner_id().await?;
        let item = self.remote.create_item(&owner_id, &input.into()).await?;
        tracing::info!(item_id = %item.id, "Item created");
        Ok(item)
    }

    /// All items of the signed-in user with status derived at `now`.
    pub async fn list_items_with_status(&self, now: Timestamp) -> ServiceResult<Vec<ItemView>> {
        let owner_id = self.owner_id().await?;
        let items = self.remote.list_items(&owner_id).await?;
        Ok(items.into_iter().map(|item| self.view(item, now)).collect())
    }

    /// Items past their due date at `now`.
    pub async fn overdue_items(&self, now: Timestamp) -> ServiceResult<Vec<ItemView>> {
        let views = self.list_items_with_status(now).await?;
        Ok(views
            .into_iter()
            .filter(|v| v.summary.status == ItemStatus::Overdue)
            .collect())
    }

    /// Lent items due within the configured window at `now`.
    pub async fn due_soon_items(&self, now: Timestamp) -> ServiceResult<Vec<ItemView>> {
        let views = self.list_items_with_status(now).await?;
        Ok(views.into_iter().filter(|v| v.summary.is_due_soon).collect())
    }

    /// Lend an available (or previously returned) item to a friend.
    pub async fn lend_item(&self, item_id: &str, input: LendItem) -> ServiceResult<Item> {
        let mut item = self.get_item(item_id).await?;
        if item.is_lent() {
            return Err(CoreError::Conflict(format!("{} is already lent out", item.name)).into());
        }
        let friend = self.get_friend(&input.friend_id).await?;

        let borrowed_date = input.borrowed_date.unwrap_or_else(Utc::now);
        validate_loan_fields(Some(&friend.id), Some(borrowed_date), input.due_date, None)?;

        item.borrowed_by = Some(friend.id.clone());
        item.borrowed_date = Some(borrowed_date);
        item.due_date = input.due_date;
        item.returned_date = None;
        let item = self.save_item(&item).await?;

        self.remote
            .create_history(
                &item.user_id,
                &NewBorrowHistory {
                    item_id: item.id.clone(),
                    friend_id: friend.id.clone(),
                    borrowed_date,
                    due_date: input.due_date,
                    returned_date: None,
                    notes: input.notes,
                }
                .into(),
            )
            .await?;

        self.remote
            .update_friend_counts(
                &friend.id,
                friend.current_items_borrowed.saturating_add(1),
                friend.total_items_borrowed.saturating_add(1),
            )
            .await?;

        tracing::info!(item_id = %item.id, friend_id = %friend.id, "Item lent");
        Ok(item)
    }

    /// Change or clear the due date of a lent item.
    pub async fn set_due_date(
        &self,
        item_id: &str,
        due_date: Option<Timestamp>,
    ) -> ServiceResult<Item> {
        let mut item = self.get_item(item_id).await?;
        if !item.is_lent() {
            return Err(CoreError::Conflict(format!("{} is not lent out", item.name)).into());
        }
        validate_loan_fields(item.borrowed_by.as_deref(), item.borrowed_date, due_date, None)?;

        item.due_date = due_date;
        let item = self.save_item(&item).await?;

        if let Some(mut entry) = self.open_history(&item).await? {
            entry.due_date = due_date;
            self.remote.update_history(&entry).await?;
        }
        Ok(item)
    }

    /// Mark a lent item as returned.
    pub async fn return_item(
        &self,
        item_id: &str,
        returned_date: Option<Timestamp>,
    ) -> ServiceResult<Item> {
        let mut item = self.get_item(item_id).await?;
        if !item.is_lent() {
            return Err(CoreError::Conflict(format!("{} is not lent out", item.name)).into());
        }
        let returned = returned_date.unwrap_or_else(Utc::now);
        validate_loan_fields(None, item.borrowed_date, item.due_date, Some(returned))?;

        let open_entry = self.open_history(&item).await?;
        let friend_id = item.borrowed_by.take();
        item.returned_date = Some(returned);
        let item = self.save_item(&item).await?;

        match open_entry {
            Some(mut entry) => {
                entry.close(returned)?;
                self.remote.update_history(&entry).await?;
            }
            None => tracing::warn!(item_id = %item.id, "No open history entry for returned item"),
        }

        if let Some(friend_id) = friend_id {
            if let Some(friend) = self.remote.find_friend(&friend_id).await? {
                self.remote
                    .update_friend_counts(
                        &friend.id,
                        friend.current_items_borrowed.saturating_sub(1),
                        friend.total_items_borrowed,
                    )
                    .await?;
            }
        }

        tracing::info!(item_id = %item.id, "Item returned");
        Ok(item)
    }

    /// Upload an image and append its URL to the item.
    pub async fn attach_image(
        &self,
        item_id: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> ServiceResult<Item> {
        let mut item = self.get_item(item_id).await?;
        let path = item_image_path(&item.user_id, &item.id, file_name);
        let url = self.storage.upload(&path, bytes).await?;
        item.images.push(url);
        self.save_item(&item).await
    }

    /// Delete an item that is not currently lent out, with its images.
    pub async fn delete_item(&self, item_id: &str) -> ServiceResult<()> {
        let item = self.get_item(item_id).await?;
        if item.is_lent() {
            return Err(CoreError::Conflict(format!(
                "{} is lent out and cannot be deleted until it is returned",
                item.name
            ))
            .into());
        }

        for url in &item.images {
            let Some(path) = self.storage.path_for_url(url) else {
                continue;
            };
            if let Err(e) = self.storage.delete(path).await {
                tracing::warn!(item_id = %item.id, path, error = %e, "Failed to delete item image");
            }
        }

        if !self.remote.delete_item(&item.id).await? {
            return Err(not_found("Item", item_id));
        }
        tracing::info!(item_id = %item.id, "Item deleted");
        Ok(())
    }

    /// Full loan history of one item, most recent first.
    pub async fn item_history(&self, item_id: &str) -> ServiceResult<Vec<BorrowHistory>> {
        let item = self.get_item(item_id).await?;
        Ok(self.remote.list_history_for_item(&item.id).await?)
    }

    // -- friends ----------------------------------------------------------

    pub async fn create_friend(&self, input: NewFriend) -> ServiceResult<Friend> {
        input.validate_all()?;
        let owner_id = self.owner_id().await?;
        let friend = self.remote.create_friend(&owner_id, &input.into()).await?;
        tracing::info!(friend_id = %friend.id, "Friend created");
        Ok(friend)
    }

    pub async fn list_friends(&self) -> ServiceResult<Vec<Friend>> {
        let owner_id = self.owner_id().await?;
        Ok(self.remote.list_friends(&owner_id).await?)
    }

    /// Delete a friend who has nothing borrowed right now.
    pub async fn delete_friend(&self, friend_id: &str) -> ServiceResult<()> {
        let friend = self.get_friend(friend_id).await?;
        let active = self.remote.list_items_lent_to(&friend.id).await?;
        if !active.is_empty() {
            return Err(CoreError::Conflict(format!(
                "{} still has {} borrowed item(s)",
                friend.name,
                active.len()
            ))
            .into());
        }
        if !self.remote.delete_friend(&friend.id).await? {
            return Err(not_found("Friend", friend_id));
        }
        tracing::info!(friend_id = %friend.id, "Friend deleted");
        Ok(())
    }

    // -- helpers ----------------------------------------------------------

    async fn save_item(&self, item: &Item) -> ServiceResult<Item> {
        self.remote
            .update_item(item)
            .await?
            .ok_or_else(|| not_found("Item", &item.id))
    }

    /// The unreturned history entry for the item's current borrower.
    async fn open_history(&self, item: &Item) -> ServiceResult<Option<BorrowHistory>> {
        let Some(friend_id) = item.borrowed_by.as_deref() else {
            return Ok(None);
        };
        let entries = self.remote.list_history_for_item(&item.id).await?;
        Ok(entries
            .into_iter()
            .find(|e| e.is_open() && e.friend_id == friend_id))
    }
}

fn not_found(entity: &'static str, id: &str) -> crate::error::ServiceError {
    CoreError::NotFound {
        entity,
        id: id.to_string(),
    }
    .into()
}
