//! Integration tests for the local-to-remote migration.
//!
//! Every test runs against isolated in-memory stores.

use std::sync::Arc;

use assert_matches::assert_matches;
use async_trait::async_trait;
use serde_json::json;

use lenderoo_core::item::{ItemCategory, ItemMetadata};
use lenderoo_core::status::{calculate_item_status, ItemStatus};
use lenderoo_db::auth::StaticAuthProvider;
use lenderoo_db::local::{LocalStore, MemoryLocalStore};
use lenderoo_db::memory::MemoryRemoteStore;
use lenderoo_db::remote::RemoteStore;
use lenderoo_db::StoreError;
use lenderoo_services::migration::{keys, Migrator};
use lenderoo_services::ServiceError;

const OWNER: &str = "owner-1";

struct Harness {
    local: Arc<MemoryLocalStore>,
    remote: Arc<MemoryRemoteStore>,
    migrator: Migrator,
}

fn harness(entries: Vec<(&str, serde_json::Value)>) -> Harness {
    let local = Arc::new(MemoryLocalStore::with_entries(
        entries.into_iter().map(|(k, v)| (k, v.to_string())),
    ));
    let remote = Arc::new(MemoryRemoteStore::new());
    let migrator = Migrator::new(
        local.clone(),
        remote.clone(),
        Arc::new(StaticAuthProvider::signed_in(OWNER, None)),
    );
    Harness {
        local,
        remote,
        migrator,
    }
}

fn friend(id: &str, name: &str) -> serde_json::Value {
    json!({ "id": id, "name": name, "createdAt": "2025-11-02T10:00:00.000Z" })
}

fn item(id: &str, name: &str, borrowed_by: Option<&str>) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "category": "tool",
        "borrowedBy": borrowed_by,
        "borrowedDate": borrowed_by.map(|_| "2025-12-01T09:00:00.000Z"),
        "createdAt": "2025-11-03T10:00:00.000Z"
    })
}

// ---------------------------------------------------------------------------
// Idempotence
// ---------------------------------------------------------------------------

#[tokio::test]
async fn second_run_returns_immediately_with_zero_counts() {
    let h = harness(vec![
        (keys::FRIENDS, json!([friend("f1", "Ana")])),
        (keys::ITEMS, json!([item("i1", "Drill", Some("f1"))])),
    ]);

    let first = h.migrator.migrate_local_data().await;
    assert!(first.success);
    assert_eq!(first.friends_count, 1);
    assert_eq!(first.items_count, 1);
    let after_first = h.remote.counts().await;

    let second = h.migrator.migrate_local_data().await;
    assert!(second.success);
    assert_eq!(second.friends_count, 0);
    assert_eq!(second.items_count, 0);
    assert_eq!(second.history_count, 0);
    assert_eq!(h.remote.counts().await, after_first);
}

#[tokio::test]
async fn empty_local_store_sets_flag() {
    let h = harness(vec![]);
    let report = h.migrator.migrate_local_data().await;
    assert!(report.success);
    assert_eq!(report.items_count, 0);
    assert!(h.migrator.is_migration_complete().await.unwrap());
}

#[tokio::test]
async fn interrupted_run_reuses_rows_instead_of_duplicating() {
    let h = harness(vec![
        (keys::FRIENDS, json!([friend("f1", "Ana"), friend("f2", "Ben")])),
        (keys::ITEMS, json!([item("i1", "Drill", Some("f2"))])),
    ]);
    assert!(h.migrator.migrate_local_data().await.success);
    let after_first = h.remote.counts().await;

    // Simulate a crash before the flag was written.
    h.local.remove(keys::MIGRATION_COMPLETE).await.unwrap();

    let rerun = h.migrator.migrate_local_data().await;
    assert!(rerun.success);
    assert_eq!(rerun.friends_count, 2);
    assert_eq!(rerun.details.friends.reused, 2);
    assert_eq!(rerun.details.items.reused, 1);
    assert_eq!(h.remote.counts().await, after_first);
}

// ---------------------------------------------------------------------------
// Foreign-key remapping
// ---------------------------------------------------------------------------

#[tokio::test]
async fn item_borrower_points_at_new_remote_friend_id() {
    let h = harness(vec![
        (keys::FRIENDS, json!([friend("f1", "Ana"), friend("f2", "Ben")])),
        (keys::ITEMS, json!([item("i1", "Drill", Some("f1"))])),
    ]);

    let report = h.migrator.migrate_local_data().await;
    assert!(report.success);

    let ana = h
        .remote
        .find_friend_by_legacy_id(OWNER, "f1")
        .await
        .unwrap()
        .expect("Ana migrated");
    let drill = h
        .remote
        .find_item_by_legacy_id(OWNER, "i1")
        .await
        .unwrap()
        .expect("Drill migrated");

    assert_ne!(ana.id, "f1");
    assert_eq!(drill.borrowed_by.as_deref(), Some(ana.id.as_str()));
    assert_eq!(drill.user_id, OWNER);
}

#[tokio::test]
async fn item_with_unknown_borrower_is_not_lent() {
    let h = harness(vec![(
        keys::ITEMS,
        json!([item("i1", "Ladder", Some("ghost"))]),
    )]);

    assert!(h.migrator.migrate_local_data().await.success);
    let ladder = h
        .remote
        .find_item_by_legacy_id(OWNER, "i1")
        .await
        .unwrap()
        .unwrap();
    assert!(ladder.borrowed_by.is_none());
    assert!(ladder.borrowed_date.is_none());
    assert_eq!(calculate_item_status(&ladder), ItemStatus::Available);
}

#[tokio::test]
async fn returned_item_keeps_dates_without_borrower() {
    let h = harness(vec![
        (keys::FRIENDS, json!([friend("f1", "Ana")])),
        (
            keys::ITEMS,
            json!([{
                "id": "i1",
                "name": "Tent",
                "category": "sports",
                "borrowedBy": "f1",
                "borrowedDate": "2025-06-01",
                "returnedDate": "2025-06-10",
            }]),
        ),
    ]);

    assert!(h.migrator.migrate_local_data().await.success);
    let tent = h
        .remote
        .find_item_by_legacy_id(OWNER, "i1")
        .await
        .unwrap()
        .unwrap();
    assert!(tent.borrowed_by.is_none());
    assert!(tent.returned_date.is_some());
    assert_eq!(calculate_item_status(&tent), ItemStatus::Returned);
}

#[tokio::test]
async fn inconsistent_loan_dates_are_tidied_not_dropped() {
    let h = harness(vec![
        (keys::FRIENDS, json!([friend("f1", "Ana")])),
        (
            keys::ITEMS,
            json!([
                {
                    "id": "i1",
                    "name": "Drill",
                    "borrowedBy": "f1",
                    "borrowedDate": "2025-12-05",
                    "dueDate": "2025-12-01"
                },
                {
                    "id": "i2",
                    "name": "Tent",
                    "borrowedBy": "f1",
                    "borrowedDate": "2025-12-10",
                    "returnedDate": "2025-12-02"
                },
                {
                    "id": "i3",
                    "name": "Ladder",
                    "borrowedBy": "f1",
                    "dueDate": "2025-10-01",
                    "createdAt": "2025-11-03T10:00:00.000Z"
                }
            ]),
        ),
    ]);

    let report = h.migrator.migrate_local_data().await;
    assert!(report.success);
    assert_eq!(report.details.items.created, 3);
    assert_eq!(report.details.items.failed, 0);

    let ana = h
        .remote
        .find_friend_by_legacy_id(OWNER, "f1")
        .await
        .unwrap()
        .unwrap();

    let drill = h.remote.find_item_by_legacy_id(OWNER, "i1").await.unwrap().unwrap();
    assert_eq!(drill.borrowed_by.as_deref(), Some(ana.id.as_str()));
    assert!(drill.due_date.is_none());
    assert_eq!(calculate_item_status(&drill), ItemStatus::Borrowed);

    let tent = h.remote.find_item_by_legacy_id(OWNER, "i2").await.unwrap().unwrap();
    assert!(tent.borrowed_by.is_none());
    assert_eq!(tent.borrowed_date, tent.returned_date);
    assert_eq!(calculate_item_status(&tent), ItemStatus::Returned);

    let ladder = h.remote.find_item_by_legacy_id(OWNER, "i3").await.unwrap().unwrap();
    assert_eq!(ladder.borrowed_by.as_deref(), Some(ana.id.as_str()));
    assert!(ladder.borrowed_date.is_some());
    assert!(ladder.due_date.is_none());
}

#[tokio::test]
async fn untyped_book_metadata_becomes_tagged() {
    let h = harness(vec![(
        keys::ITEMS,
        json!([{
            "id": "b1",
            "name": "Dune",
            "category": "book",
            "metadata": { "author": "Frank Herbert", "pageCount": 412 }
        }]),
    )]);

    assert!(h.migrator.migrate_local_data().await.success);
    let dune = h
        .remote
        .find_item_by_legacy_id(OWNER, "b1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(dune.category, ItemCategory::Book);
    assert_matches!(dune.metadata, Some(ItemMetadata::Book(ref b)) if b.page_count == Some(412));
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

#[tokio::test]
async fn history_is_remapped_or_skipped() {
    let h = harness(vec![
        (keys::FRIENDS, json!([friend("f1", "Ana")])),
        (keys::ITEMS, json!([item("i1", "Drill", None)])),
        (
            keys::HISTORY,
            json!([
                {
                    "id": "h1",
                    "itemId": "i1",
                    "friendId": "f1",
                    "borrowedDate": "2025-10-01T08:00:00Z",
                    "returnedDate": "2025-10-05T08:00:00Z"
                },
                {
                    "id": "h2",
                    "itemId": "i1",
                    "friendId": "unknown-friend",
                    "borrowedDate": "2025-10-07T08:00:00Z"
                }
            ]),
        ),
    ]);

    let report = h.migrator.migrate_local_data().await;
    assert!(report.success);
    assert_eq!(report.history_count, 2);
    assert_eq!(report.details.history.created, 1);
    assert_eq!(report.details.history.skipped, 1);

    let ana = h
        .remote
        .find_friend_by_legacy_id(OWNER, "f1")
        .await
        .unwrap()
        .unwrap();
    let history = h.remote.all_history().await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].friend_id, ana.id);
    assert!(history[0].returned_date.is_some());
}

#[tokio::test]
async fn history_for_unmigrated_item_is_skipped() {
    let h = harness(vec![
        (keys::FRIENDS, json!([friend("f1", "Ana")])),
        (
            keys::ITEMS,
            json!([item("i1", "Drill", None), item("i2", "Broken", None)]),
        ),
        (
            keys::HISTORY,
            json!([
                {
                    "id": "h1",
                    "itemId": "i2",
                    "friendId": "f1",
                    "borrowedDate": "2025-10-01T08:00:00Z"
                },
                {
                    "id": "h2",
                    "itemId": "never-existed",
                    "friendId": "f1",
                    "borrowedDate": "2025-10-02T08:00:00Z"
                }
            ]),
        ),
    ]);
    h.remote.reject_inserts_named("Broken").await;

    let report = h.migrator.migrate_local_data().await;
    assert!(report.success);
    assert_eq!(report.details.friends.created, 1);
    assert_eq!(report.details.items.failed, 1);
    assert_eq!(report.history_count, 2);
    assert_eq!(report.details.history.skipped, 2);
    assert_eq!(report.details.history.created, 0);
    assert!(h.remote.all_history().await.is_empty());
    assert!(h.migrator.is_migration_complete().await.unwrap());
}

// ---------------------------------------------------------------------------
// Partial failure
// ---------------------------------------------------------------------------

#[tokio::test]
async fn one_failed_friend_does_not_stop_the_batch() {
    let h = harness(vec![
        (
            keys::FRIENDS,
            json!([friend("f1", "Ana"), friend("f2", "Broken"), friend("f3", "Cleo")]),
        ),
        (
            keys::ITEMS,
            json!([
                item("i1", "Drill", Some("f1")),
                item("i2", "Saw", Some("f2")),
                item("i3", "Sander", Some("f3")),
            ]),
        ),
    ]);
    h.remote.reject_inserts_named("Broken").await;

    let report = h.migrator.migrate_local_data().await;
    assert!(report.success);
    // Counts are attempted records, not successes.
    assert_eq!(report.friends_count, 3);
    assert_eq!(report.details.friends.created, 2);
    assert_eq!(report.details.friends.failed, 1);
    assert_eq!(report.details.items.created, 3);

    let counts = h.remote.counts().await;
    assert_eq!(counts.friends, 2);
    assert_eq!(counts.items, 3);

    let saw = h
        .remote
        .find_item_by_legacy_id(OWNER, "i2")
        .await
        .unwrap()
        .unwrap();
    assert!(saw.borrowed_by.is_none());
    let sander = h
        .remote
        .find_item_by_legacy_id(OWNER, "i3")
        .await
        .unwrap()
        .unwrap();
    assert!(sander.borrowed_by.is_some());

    assert!(h.migrator.is_migration_complete().await.unwrap());
}

#[tokio::test]
async fn malformed_record_only_fails_itself() {
    let h = harness(vec![(
        keys::ITEMS,
        json!([{ "id": "bad" }, item("i2", "Saw", None)]),
    )]);

    let report = h.migrator.migrate_local_data().await;
    assert!(report.success);
    assert_eq!(report.items_count, 2);
    assert_eq!(report.details.items.failed, 1);
    assert_eq!(report.details.items.created, 1);
}

// ---------------------------------------------------------------------------
// Fatal failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unreadable_export_fails_without_setting_flag() {
    let local = Arc::new(MemoryLocalStore::with_entries([(keys::ITEMS, "{not json")]));
    let migrator = Migrator::new(
        local,
        Arc::new(MemoryRemoteStore::new()),
        Arc::new(StaticAuthProvider::signed_in(OWNER, None)),
    );

    let report = migrator.migrate_local_data().await;
    assert!(!report.success);
    assert!(report.error.is_some());
    assert!(!migrator.is_migration_complete().await.unwrap());
}

#[tokio::test]
async fn signed_out_user_cannot_migrate() {
    let local = Arc::new(MemoryLocalStore::with_entries([(
        keys::FRIENDS,
        json!([friend("f1", "Ana")]).to_string(),
    )]));
    let remote = Arc::new(MemoryRemoteStore::new());
    let migrator = Migrator::new(local, remote.clone(), Arc::new(StaticAuthProvider::signed_out()));

    let report = migrator.migrate_local_data().await;
    assert!(!report.success);
    assert_eq!(remote.counts().await.friends, 0);
    assert!(!migrator.is_migration_complete().await.unwrap());
}

/// Local store whose writes always fail.
struct ReadOnlyStore(MemoryLocalStore);

#[async_trait]
impl LocalStore for ReadOnlyStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.0.get(key).await
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("storage is read-only".into()))
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.0.remove(key).await
    }
}

#[tokio::test]
async fn failing_flag_write_is_fatal() {
    let local = ReadOnlyStore(MemoryLocalStore::with_entries([(
        keys::FRIENDS,
        json!([friend("f1", "Ana")]).to_string(),
    )]));
    let migrator = Migrator::new(
        Arc::new(local),
        Arc::new(MemoryRemoteStore::new()),
        Arc::new(StaticAuthProvider::signed_in(OWNER, None)),
    );

    let report = migrator.migrate_local_data().await;
    assert!(!report.success);
    assert!(report.error.unwrap().contains("read-only"));
}

// ---------------------------------------------------------------------------
// Clearing local data
// ---------------------------------------------------------------------------

#[tokio::test]
async fn clear_refuses_before_migration_completes() {
    let h = harness(vec![(keys::FRIENDS, json!([friend("f1", "Ana")]))]);

    assert_matches!(
        h.migrator.clear_local_data_after_migration().await,
        Err(ServiceError::MigrationIncomplete)
    );
    assert!(h.local.get(keys::FRIENDS).await.unwrap().is_some());
}

#[tokio::test]
async fn clear_removes_local_data_once_complete() {
    let h = harness(vec![
        (keys::FRIENDS, json!([friend("f1", "Ana")])),
        (keys::ITEMS, json!([item("i1", "Drill", None)])),
        (keys::HISTORY, json!([])),
    ]);
    assert!(h.migrator.migrate_local_data().await.success);

    h.migrator.clear_local_data_after_migration().await.unwrap();

    for key in keys::DATA {
        assert!(h.local.get(key).await.unwrap().is_none());
    }
    assert!(h.migrator.is_migration_complete().await.unwrap());
}
