//! Item row model and insert DTO.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use lenderoo_core::item::{Item, ItemCategory, ItemMetadata, NewItem};
use lenderoo_core::types::{EntityId, Timestamp};

/// A row from the `items` table.
#[derive(Debug, Clone, FromRow)]
pub struct ItemRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub category: String,
    pub images: Vec<String>,
    pub borrowed_by: Option<Uuid>,
    pub borrowed_date: Option<Timestamp>,
    pub due_date: Option<Timestamp>,
    pub returned_date: Option<Timestamp>,
    pub metadata: Option<serde_json::Value>,
    pub legacy_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        let category = ItemCategory::from_str_or_other(&row.category);
        Item {
            id: row.id.to_string(),
            user_id: row.user_id.to_string(),
            name: row.name,
            description: row.description,
            notes: row.notes,
            category,
            images: row.images,
            borrowed_by: row.borrowed_by.map(|id| id.to_string()),
            borrowed_date: row.borrowed_date,
            due_date: row.due_date,
            returned_date: row.returned_date,
            metadata: row
                .metadata
                .as_ref()
                .and_then(|value| decode_metadata(category, value)),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Decode a stored metadata document, accepting both the tagged form and
/// older untagged objects.
pub fn decode_metadata(category: ItemCategory, value: &serde_json::Value) -> Option<ItemMetadata> {
    serde_json::from_value::<ItemMetadata>(value.clone())
        .ok()
        .or_else(|| ItemMetadata::from_untyped(category, value))
}

/// DTO for inserting an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateItemRecord {
    pub name: String,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub category: ItemCategory,
    pub images: Vec<String>,
    pub borrowed_by: Option<EntityId>,
    pub borrowed_date: Option<Timestamp>,
    pub due_date: Option<Timestamp>,
    pub returned_date: Option<Timestamp>,
    pub metadata: Option<ItemMetadata>,
    /// On-device id when the row is copied from the local store.
    pub legacy_id: Option<String>,
    /// Defaults to now when `None`.
    pub created_at: Option<Timestamp>,
}

impl From<NewItem> for CreateItemRecord {
    fn from(input: NewItem) -> Self {
        Self {
            name: input.name.trim().to_string(),
            description: input.description,
            notes: input.notes,
            category: input.category,
            images: input.images,
            borrowed_by: None,
            borrowed_date: None,
            due_date: None,
            returned_date: None,
            metadata: input.metadata,
            legacy_id: None,
            created_at: None,
        }
    }
}
