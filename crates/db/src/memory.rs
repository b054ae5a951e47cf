//! In-process [`RemoteStore`] used by tests, demos and offline runs.
//!
//! Mirrors the Postgres schema's observable behavior: generated ids,
//! owner scoping, legacy-id lookups, `ON DELETE SET NULL` for an item's
//! borrower and cascading history deletes.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use lenderoo_core::friend::Friend;
use lenderoo_core::history::BorrowHistory;
use lenderoo_core::item::Item;
use lenderoo_core::types::new_id;

use crate::error::StoreError;
use crate::models::friend::CreateFriendRecord;
use crate::models::history::CreateHistoryRecord;
use crate::models::item::CreateItemRecord;
use crate::remote::RemoteStore;

struct Stored<T> {
    record: T,
    legacy_id: Option<String>,
}

#[derive(Default)]
struct Tables {
    friends: Vec<Stored<Friend>>,
    items: Vec<Stored<Item>>,
    history: Vec<Stored<BorrowHistory>>,
    rejected_names: HashSet<String>,
}

/// Row counts per table, for assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableCounts {
    pub friends: usize,
    pub items: usize,
    pub history: usize,
}

#[derive(Default)]
pub struct MemoryRemoteStore {
    tables: RwLock<Tables>,
}

impl MemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later friend or item insert with this exact name fail, the
    /// way a constraint violation or dropped request would.
    pub async fn reject_inserts_named(&self, name: impl Into<String>) {
        self.tables.write().await.rejected_names.insert(name.into());
    }

    pub async fn counts(&self) -> TableCounts {
        let tables = self.tables.read().await;
        TableCounts {
            friends: tables.friends.len(),
            items: tables.items.len(),
            history: tables.history.len(),
        }
    }

    /// Every history row, in insertion order.
    pub async fn all_history(&self) -> Vec<BorrowHistory> {
        let tables = self.tables.read().await;
        tables.history.iter().map(|h| h.record.clone()).collect()
    }
}

fn reject_if_named(tables: &Tables, table: &str, name: &str) -> Result<(), StoreError> {
    if tables.rejected_names.contains(name) {
        return Err(StoreError::Unavailable(format!(
            "insert into {table} rejected for '{name}'"
        )));
    }
    Ok(())
}

fn find_legacy<'a, T>(
    rows: &'a [Stored<T>],
    owner_of: impl Fn(&T) -> &str,
    owner_id: &str,
    legacy_id: &str,
) -> Option<&'a T> {
    rows.iter()
        .find(|s| owner_of(&s.record) == owner_id && s.legacy_id.as_deref() == Some(legacy_id))
        .map(|s| &s.record)
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    async fn create_friend(
        &self,
        owner_id: &str,
        input: &CreateFriendRecord,
    ) -> Result<Friend, StoreError> {
        let mut tables = self.tables.write().await;
        reject_if_named(&tables, "friends", &input.name)?;
        let now = Utc::now();
        let friend = Friend {
            id: new_id(),
            user_id: owner_id.to_string(),
            name: input.name.clone(),
            email: input.email.clone(),
            phone: input.phone.clone(),
            avatar_url: input.avatar_url.clone(),
            current_items_borrowed: input.current_items_borrowed,
            total_items_borrowed: input.total_items_borrowed,
            owned_items_count: 0,
            created_at: input.created_at.unwrap_or(now),
            updated_at: now,
        };
        tables.friends.push(Stored {
            record: friend.clone(),
            legacy_id: input.legacy_id.clone(),
        });
        Ok(friend)
    }

    async fn find_friend(&self, id: &str) -> Result<Option<Friend>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .friends
            .iter()
            .find(|s| s.record.id == id)
            .map(|s| s.record.clone()))
    }

    async fn find_friend_by_legacy_id(
        &self,
        owner_id: &str,
        legacy_id: &str,
    ) -> Result<Option<Friend>, StoreError> {
        let tables = self.tables.read().await;
        Ok(find_legacy(&tables.friends, |f| f.user_id.as_str(), owner_id, legacy_id).cloned())
    }

    async fn list_friends(&self, owner_id: &str) -> Result<Vec<Friend>, StoreError> {
        let tables = self.tables.read().await;
        let mut friends: Vec<Friend> = tables
            .friends
            .iter()
            .filter(|s| s.record.user_id == owner_id)
            .map(|s| s.record.clone())
            .collect();
        friends.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(friends)
    }

    async fn update_friend_counts(
        &self,
        id: &str,
        current_items_borrowed: u32,
        total_items_borrowed: u32,
    ) -> Result<Option<Friend>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(stored) = tables.friends.iter_mut().find(|s| s.record.id == id) else {
            return Ok(None);
        };
        stored.record.current_items_borrowed = current_items_borrowed;
        stored.record.total_items_borrowed = total_items_borrowed;
        stored.record.updated_at = Utc::now();
        Ok(Some(stored.record.clone()))
    }

    async fn delete_friend(&self, id: &str) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let before = tables.friends.len();
        tables.friends.retain(|s| s.record.id != id);
        if tables.friends.len() == before {
            return Ok(false);
        }
        for stored in tables.items.iter_mut() {
            if stored.record.borrowed_by.as_deref() == Some(id) {
                stored.record.borrowed_by = None;
            }
        }
        tables.history.retain(|s| s.record.friend_id != id);
        Ok(true)
    }

    async fn create_item(
        &self,
        owner_id: &str,
        input: &CreateItemRecord,
    ) -> Result<Item, StoreError> {
        let mut tables = self.tables.write().await;
        reject_if_named(&tables, "items", &input.name)?;
        let now = Utc::now();
        let item = Item {
            id: new_id(),
            user_id: owner_id.to_string(),
            name: input.name.clone(),
            description: input.description.clone(),
            notes: input.notes.clone(),
            category: input.category,
            images: input.images.clone(),
            borrowed_by: input.borrowed_by.clone(),
            borrowed_date: input.borrowed_date,
            due_date: input.due_date,
            returned_date: input.returned_date,
            metadata: input.metadata.clone(),
            created_at: input.created_at.unwrap_or(now),
            updated_at: now,
        };
        tables.items.push(Stored {
            record: item.clone(),
            legacy_id: input.legacy_id.clone(),
        });
        Ok(item)
    }

    async fn find_item(&self, id: &str) -> Result<Option<Item>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .items
            .iter()
            .find(|s| s.record.id == id)
            .map(|s| s.record.clone()))
    }

    async fn find_item_by_legacy_id(
        &self,
        owner_id: &str,
        legacy_id: &str,
    ) -> Result<Option<Item>, StoreError> {
        let tables = self.tables.read().await;
        Ok(find_legacy(&tables.items, |i| i.user_id.as_str(), owner_id, legacy_id).cloned())
    }

    async fn list_items(&self, owner_id: &str) -> Result<Vec<Item>, StoreError> {
        let tables = self.tables.read().await;
        let mut items: Vec<Item> = tables
            .items
            .iter()
            .filter(|s| s.record.user_id == owner_id)
            .map(|s| s.record.clone())
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn list_items_lent_to(&self, friend_id: &str) -> Result<Vec<Item>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .items
            .iter()
            .filter(|s| {
                s.record.borrowed_by.as_deref() == Some(friend_id)
                    && s.record.returned_date.is_none()
            })
            .map(|s| s.record.clone())
            .collect())
    }

    async fn update_item(&self, item: &Item) -> Result<Option<Item>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(stored) = tables.items.iter_mut().find(|s| s.record.id == item.id) else {
            return Ok(None);
        };
        let mut updated = item.clone();
        updated.user_id = stored.record.user_id.clone();
        updated.created_at = stored.record.created_at;
        updated.updated_at = Utc::now();
        stored.record = updated.clone();
        Ok(Some(updated))
    }

    async fn delete_item(&self, id: &str) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let before = tables.items.len();
        tables.items.retain(|s| s.record.id != id);
        if tables.items.len() == before {
            return Ok(false);
        }
        tables.history.retain(|s| s.record.item_id != id);
        Ok(true)
    }

    async fn create_history(
        &self,
        owner_id: &str,
        input: &CreateHistoryRecord,
    ) -> Result<BorrowHistory, StoreError> {
        let mut tables = self.tables.write().await;
        let entry = BorrowHistory {
            id: new_id(),
            user_id: owner_id.to_string(),
            item_id: input.entry.item_id.clone(),
            friend_id: input.entry.friend_id.clone(),
            borrowed_date: input.entry.borrowed_date,
            due_date: input.entry.due_date,
            returned_date: input.entry.returned_date,
            notes: input.entry.notes.clone(),
            created_at: Utc::now(),
        };
        tables.history.push(Stored {
            record: entry.clone(),
            legacy_id: input.legacy_id.clone(),
        });
        Ok(entry)
    }

    async fn find_history_by_legacy_id(
        &self,
        owner_id: &str,
        legacy_id: &str,
    ) -> Result<Option<BorrowHistory>, StoreError> {
        let tables = self.tables.read().await;
        Ok(find_legacy(&tables.history, |h| h.user_id.as_str(), owner_id, legacy_id).cloned())
    }

    async fn list_history_for_item(&self, item_id: &str) -> Result<Vec<BorrowHistory>, StoreError> {
        let tables = self.tables.read().await;
        let mut entries: Vec<BorrowHistory> = tables
            .history
            .iter()
            .filter(|s| s.record.item_id == item_id)
            .map(|s| s.record.clone())
            .collect();
        entries.sort_by(|a, b| b.borrowed_date.cmp(&a.borrowed_date));
        Ok(entries)
    }

    async fn update_history(
        &self,
        entry: &BorrowHistory,
    ) -> Result<Option<BorrowHistory>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(stored) = tables.history.iter_mut().find(|s| s.record.id == entry.id) else {
            return Ok(None);
        };
        stored.record.due_date = entry.due_date;
        stored.record.returned_date = entry.returned_date;
        stored.record.notes = entry.notes.clone();
        Ok(Some(stored.record.clone()))
    }
}
