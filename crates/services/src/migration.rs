//! One-time copy of on-device records into the remote store.
//!
//! The pass is best effort and runs once:
//!
//! 1. If the completion flag is set, return immediately with zero counts.
//! 2. Read the local friends, items and history in one batch.
//! 3. Copy friends, recording `local id -> remote id`.
//! 4. Copy items, rewriting `borrowedBy` through that mapping.
//! 5. Copy history entries whose friend (and item) resolve; skip the rest.
//! 6. Set the completion flag, even if individual records failed.
//!
//! Only reading the local export, resolving the signed-in user, or writing
//! the flag can fail the whole pass. Every record failure is logged and
//! the pass moves on. Local data is left untouched until
//! [`Migrator::clear_local_data_after_migration`] runs.
//!
//! Remote rows carry the original local id as `legacy_id`; a re-run after an
//! interrupted pass reuses those rows instead of creating duplicates.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use lenderoo_core::history::NewBorrowHistory;
use lenderoo_core::item::{ItemCategory, ItemMetadata};
use lenderoo_core::relative_time::parse_timestamp;
use lenderoo_core::types::{EntityId, Timestamp};
use lenderoo_db::auth::AuthProvider;
use lenderoo_db::local::LocalStore;
use lenderoo_db::models::friend::CreateFriendRecord;
use lenderoo_db::models::history::CreateHistoryRecord;
use lenderoo_db::models::item::CreateItemRecord;
use lenderoo_db::remote::RemoteStore;
use lenderoo_db::StoreError;

use crate::error::{ServiceError, ServiceResult};

/// Local key-value store keys written by earlier app versions.
pub mod keys {
    pub const ITEMS: &str = "@lenderoo_items";
    pub const FRIENDS: &str = "@lenderoo_friends";
    pub const HISTORY: &str = "@lenderoo_history";
    pub const MIGRATION_COMPLETE: &str = "@lenderoo_migration_complete";

    /// Keys removed by the post-migration cleanup.
    pub const DATA: &[&str] = &[ITEMS, FRIENDS, HISTORY];
}

const FLAG_SET: &str = "true";

// ---------------------------------------------------------------------------
// Local record shapes
// ---------------------------------------------------------------------------

/// A friend as persisted on the device. Dates are stored as strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalFriend {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(alias = "avatar")]
    pub avatar_url: Option<String>,
    pub current_items_borrowed: Option<u32>,
    pub total_items_borrowed: Option<u32>,
    pub created_at: Option<String>,
}

/// An item as persisted on the device.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalItem {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub borrowed_by: Option<String>,
    pub borrowed_date: Option<String>,
    pub due_date: Option<String>,
    pub returned_date: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: Option<String>,
}

/// A history entry as persisted on the device.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalHistory {
    pub id: String,
    pub item_id: String,
    pub friend_id: String,
    pub borrowed_date: Option<String>,
    pub due_date: Option<String>,
    pub returned_date: Option<String>,
    pub notes: Option<String>,
}

/// The three local collections, read in one batch. Records stay as raw
/// JSON so a malformed entry only fails itself.
#[derive(Debug, Default)]
pub struct LocalExport {
    pub friends: Vec<serde_json::Value>,
    pub items: Vec<serde_json::Value>,
    pub history: Vec<serde_json::Value>,
}

impl LocalExport {
    pub fn is_empty(&self) -> bool {
        self.friends.is_empty() && self.items.is_empty() && self.history.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// What happened to one source record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// A new remote row was created.
    Created,
    /// A row from an earlier interrupted run was found and reused.
    Reused,
    /// The record cannot be migrated meaningfully and was left out.
    Skipped,
    /// The remote write (or decoding the record) failed.
    Failed,
}

/// Per-collection outcome counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordTally {
    pub created: usize,
    pub reused: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RecordTally {
    fn record(mut self, outcome: RecordOutcome) -> Self {
        match outcome {
            RecordOutcome::Created => self.created += 1,
            RecordOutcome::Reused => self.reused += 1,
            RecordOutcome::Skipped => self.skipped += 1,
            RecordOutcome::Failed => self.failed += 1,
        }
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationDetails {
    pub friends: RecordTally,
    pub items: RecordTally,
    pub history: RecordTally,
}

/// Result of [`Migrator::migrate_local_data`].
///
/// The counts are source records attempted per collection, not successes;
/// see `details` for the breakdown.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationReport {
    pub success: bool,
    pub items_count: usize,
    pub friends_count: usize,
    pub history_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub details: MigrationDetails,
}

impl MigrationReport {
    fn nothing_to_do() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }

    fn failed(error: impl std::fmt::Display) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            ..Default::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Migrator
// ---------------------------------------------------------------------------

/// Runs the local-to-remote migration against injected stores.
#[derive(Clone)]
pub struct Migrator {
    local: Arc<dyn LocalStore>,
    remote: Arc<dyn RemoteStore>,
    auth: Arc<dyn AuthProvider>,
}

impl Migrator {
    pub fn new(
        local: Arc<dyn LocalStore>,
        remote: Arc<dyn RemoteStore>,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        Self {
            local,
            remote,
            auth,
        }
    }

    /// Whether a previous pass has finished.
    pub async fn is_migration_complete(&self) -> ServiceResult<bool> {
        let flag = self.local.get(keys::MIGRATION_COMPLETE).await?;
        Ok(flag.as_deref() == Some(FLAG_SET))
    }

    /// Copy every locally persisted record into the remote store, once.
    pub async fn migrate_local_data(&self) -> MigrationReport {
        match self.is_migration_complete().await {
            Ok(true) => {
                tracing::debug!("Migration already complete, skipping");
                return MigrationReport::nothing_to_do();
            }
            Ok(false) => {}
            Err(e) => {
                tracing::error!(error = %e, "Failed to read migration flag");
                return MigrationReport::failed(e);
            }
        }

        let export = match self.read_local_export().await {
            Ok(export) => export,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read local data");
                return MigrationReport::failed(e);
            }
        };

        if export.is_empty() {
            tracing::info!("No local data to migrate");
            if let Err(e) = self.mark_complete().await {
                return MigrationReport::failed(e);
            }
            return MigrationReport::nothing_to_do();
        }

        let owner_id = match self.auth.require_user().await {
            Ok(user) => user.id,
            Err(e) => {
                tracing::error!(error = %e, "Cannot migrate without a signed-in user");
                return MigrationReport::failed(e);
            }
        };

        tracing::info!(
            friends = export.friends.len(),
            items = export.items.len(),
            history = export.history.len(),
            "Starting local data migration"
        );

        let mut friend_ids: HashMap<String, EntityId> = HashMap::new();
        let mut friends = RecordTally::default();
        for raw in &export.friends {
            friends = friends.record(self.migrate_friend(&owner_id, raw, &mut friend_ids).await);
        }

        let mut item_ids: HashMap<String, EntityId> = HashMap::new();
        let mut items = RecordTally::default();
        for raw in &export.items {
            items = items.record(
                self.migrate_item(&owner_id, raw, &friend_ids, &mut item_ids)
                    .await,
            );
        }

        let mut history = RecordTally::default();
        for raw in &export.history {
            history = history.record(
                self.migrate_history(&owner_id, raw, &friend_ids, &item_ids)
                    .await,
            );
        }

        if let Err(e) = self.mark_complete().await {
            tracing::error!(error = %e, "Failed to persist migration flag");
            return MigrationReport::failed(e);
        }

        let report = MigrationReport {
            success: true,
            items_count: export.items.len(),
            friends_count: export.friends.len(),
            history_count: export.history.len(),
            error: None,
            details: MigrationDetails {
                friends,
                items,
                history,
            },
        };
        tracing::info!(details = ?report.details, "Local data migration finished");
        report
    }

    /// Remove the migrated collections from the device.
    ///
    /// Refuses with [`ServiceError::MigrationIncomplete`] until a pass has
    /// completed. The completion flag itself is kept.
    pub async fn clear_local_data_after_migration(&self) -> ServiceResult<()> {
        if !self.is_migration_complete().await? {
            return Err(ServiceError::MigrationIncomplete);
        }
        for key in keys::DATA {
            self.local.remove(key).await?;
        }
        tracing::info!("Local data cleared after migration");
        Ok(())
    }

    async fn mark_complete(&self) -> Result<(), StoreError> {
        self.local.set(keys::MIGRATION_COMPLETE, FLAG_SET).await
    }

    async fn read_local_export(&self) -> Result<LocalExport, StoreError> {
        Ok(LocalExport {
            friends: self.read_collection(keys::FRIENDS).await?,
            items: self.read_collection(keys::ITEMS).await?,
            history: self.read_collection(keys::HISTORY).await?,
        })
    }

    async fn read_collection(&self, key: &str) -> Result<Vec<serde_json::Value>, StoreError> {
        match self.local.get(key).await? {
            Some(raw) if !raw.trim().is_empty() => Ok(serde_json::from_str(&raw)?),
            _ => Ok(Vec::new()),
        }
    }

    async fn migrate_friend(
        &self,
        owner_id: &str,
        raw: &serde_json::Value,
        friend_ids: &mut HashMap<String, EntityId>,
    ) -> RecordOutcome {
        let local: LocalFriend = match decode(raw, "friend") {
            Some(local) => local,
            None => return RecordOutcome::Failed,
        };

        match self
            .remote
            .find_friend_by_legacy_id(owner_id, &local.id)
            .await
        {
            Ok(Some(existing)) => {
                friend_ids.insert(local.id, existing.id);
                return RecordOutcome::Reused;
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(local_id = %local.id, error = %e, "Failed to check for migrated friend");
                return RecordOutcome::Failed;
            }
        }

        let record = CreateFriendRecord {
            name: local.name.trim().to_string(),
            email: local.email,
            phone: local.phone,
            avatar_url: local.avatar_url,
            current_items_borrowed: local.current_items_borrowed.unwrap_or(0),
            total_items_borrowed: local.total_items_borrowed.unwrap_or(0),
            legacy_id: Some(local.id.clone()),
            created_at: local.created_at.as_deref().and_then(parse_timestamp),
        };
        match self.remote.create_friend(owner_id, &record).await {
            Ok(friend) => {
                tracing::debug!(local_id = %local.id, remote_id = %friend.id, "Friend migrated");
                friend_ids.insert(local.id, friend.id);
                RecordOutcome::Created
            }
            Err(e) => {
                tracing::warn!(local_id = %local.id, error = %e, "Failed to migrate friend");
                RecordOutcome::Failed
            }
        }
    }

    async fn migrate_item(
        &self,
        owner_id: &str,
        raw: &serde_json::Value,
        friend_ids: &HashMap<String, EntityId>,
        item_ids: &mut HashMap<String, EntityId>,
    ) -> RecordOutcome {
        let local: LocalItem = match decode(raw, "item") {
            Some(local) => local,
            None => return RecordOutcome::Failed,
        };

        match self.remote.find_item_by_legacy_id(owner_id, &local.id).await {
            Ok(Some(existing)) => {
                item_ids.insert(local.id, existing.id);
                return RecordOutcome::Reused;
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(local_id = %local.id, error = %e, "Failed to check for migrated item");
                return RecordOutcome::Failed;
            }
        }

        let borrower = local
            .borrowed_by
            .as_ref()
            .and_then(|old| friend_ids.get(old).cloned());
        if local.borrowed_by.is_some() && borrower.is_none() {
            tracing::debug!(local_id = %local.id, "Borrower not migrated, item treated as not lent");
        }

        let created_at = local.created_at.as_deref().and_then(parse_timestamp);
        let loan = LoanFields::resolve(&local, borrower, created_at);

        let category = local
            .category
            .as_deref()
            .map(ItemCategory::from_str_or_other)
            .unwrap_or(ItemCategory::Other);
        let record = CreateItemRecord {
            name: local.name.trim().to_string(),
            description: local.description,
            notes: local.notes,
            category,
            images: local.images,
            borrowed_by: loan.borrowed_by,
            borrowed_date: loan.borrowed_date,
            due_date: loan.due_date,
            returned_date: loan.returned_date,
            metadata: local
                .metadata
                .as_ref()
                .and_then(|value| ItemMetadata::from_untyped(category, value)),
            legacy_id: Some(local.id.clone()),
            created_at,
        };
        match self.remote.create_item(owner_id, &record).await {
            Ok(item) => {
                tracing::debug!(local_id = %local.id, remote_id = %item.id, "Item migrated");
                item_ids.insert(local.id, item.id);
                RecordOutcome::Created
            }
            Err(e) => {
                tracing::warn!(local_id = %local.id, error = %e, "Failed to migrate item");
                RecordOutcome::Failed
            }
        }
    }

    async fn migrate_history(
        &self,
        owner_id: &str,
        raw: &serde_json::Value,
        friend_ids: &HashMap<String, EntityId>,
        item_ids: &HashMap<String, EntityId>,
    ) -> RecordOutcome {
        let local: LocalHistory = match decode(raw, "history entry") {
            Some(local) => local,
            None => return RecordOutcome::Failed,
        };

        let (Some(friend_id), Some(item_id)) =
            (friend_ids.get(&local.friend_id), item_ids.get(&local.item_id))
        else {
            tracing::debug!(local_id = %local.id, "History references unmigrated records, skipped");
            return RecordOutcome::Skipped;
        };
        let Some(borrowed_date) = local.borrowed_date.as_deref().and_then(parse_timestamp) else {
            tracing::debug!(local_id = %local.id, "History entry has no borrowed date, skipped");
            return RecordOutcome::Skipped;
        };

        match self
            .remote
            .find_history_by_legacy_id(owner_id, &local.id)
            .await
        {
            Ok(Some(_)) => return RecordOutcome::Reused,
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(local_id = %local.id, error = %e, "Failed to check for migrated history");
                return RecordOutcome::Failed;
            }
        }

        let record = CreateHistoryRecord {
            entry: NewBorrowHistory {
                item_id: item_id.clone(),
                friend_id: friend_id.clone(),
                borrowed_date,
                due_date: local.due_date.as_deref().and_then(parse_timestamp),
                returned_date: local.returned_date.as_deref().and_then(parse_timestamp),
                notes: local.notes,
            },
            legacy_id: Some(local.id.clone()),
        };
        match self.remote.create_history(owner_id, &record).await {
            Ok(_) => RecordOutcome::Created,
            Err(e) => {
                tracing::warn!(local_id = %local.id, error = %e, "Failed to migrate history entry");
                RecordOutcome::Failed
            }
        }
    }
}

fn decode<T: serde::de::DeserializeOwned>(raw: &serde_json::Value, what: &str) -> Option<T> {
    match serde_json::from_value(raw.clone()) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(record = what, error = %e, "Malformed local record, skipped");
            None
        }
    }
}

/// Loan fields of a local item after borrower remapping.
///
/// Earlier app versions never checked these fields against each other, so
/// [`LoanFields::resolve`] repairs them instead of rejecting the item.
#[derive(Debug, PartialEq)]
struct LoanFields {
    borrowed_by: Option<EntityId>,
    borrowed_date: Option<Timestamp>,
    due_date: Option<Timestamp>,
    returned_date: Option<Timestamp>,
}

impl LoanFields {
    /// - Returned items lose the borrower. A missing or later borrowed date
    ///   is replaced by the returned date.
    /// - Items whose borrower resolved stay lent; a missing borrowed date
    ///   falls back to the item's creation time.
    /// - Everything else is not lent out.
    /// - A due date on an earlier calendar day than the borrowed date is
    ///   dropped.
    fn resolve(local: &LocalItem, borrower: Option<EntityId>, created_at: Option<Timestamp>) -> Self {
        let borrowed_date = local.borrowed_date.as_deref().and_then(parse_timestamp);
        let due_date = local.due_date.as_deref().and_then(parse_timestamp);
        let returned_date = local.returned_date.as_deref().and_then(parse_timestamp);

        let loan = match (returned_date, borrower) {
            (Some(returned), _) => {
                let borrowed = match borrowed_date {
                    Some(borrowed) if borrowed <= returned => borrowed,
                    _ => {
                        tracing::debug!(local_id = %local.id, "Unreliable borrowed date on returned item, using returned date");
                        returned
                    }
                };
                Self {
                    borrowed_by: None,
                    borrowed_date: Some(borrowed),
                    due_date,
                    returned_date: Some(returned),
                }
            }
            (None, Some(borrower)) => Self {
                borrowed_date: borrowed_date.or(created_at).or_else(|| Some(chrono::Utc::now())),
                borrowed_by: Some(borrower),
                due_date,
                returned_date: None,
            },
            (None, None) => Self {
                borrowed_by: None,
                borrowed_date: None,
                due_date: None,
                returned_date: None,
            },
        };
        loan.without_early_due_date(&local.id)
    }

    fn without_early_due_date(mut self, local_id: &str) -> Self {
        if let (Some(borrowed), Some(due)) = (self.borrowed_date, self.due_date) {
            if due.date_naive() < borrowed.date_naive() {
                tracing::debug!(local_id, "Due date precedes borrowed date, dropped");
                self.due_date = None;
            }
        }
        self
    }
}
