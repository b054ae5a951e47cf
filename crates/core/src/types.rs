/// Record identifiers are opaque strings: UUIDs in the remote store, whatever
/// the device generated in the local export.
pub type EntityId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Generate a fresh random identifier.
pub fn new_id() -> EntityId {
    uuid::Uuid::new_v4().to_string()
}
