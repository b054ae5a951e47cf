//! Item records: the physical possessions an owner tracks.
//!
//! Category-specific details live in [`ItemMetadata`], a tagged union keyed
//! by category instead of a loose bag of optional fields.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::{EntityId, Timestamp};
use crate::validation::{require_non_blank, validate_input};

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// What kind of thing an item is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    Book,
    Tool,
    Clothing,
    Electronics,
    Game,
    Sports,
    Kitchen,
    Other,
}

impl ItemCategory {
    /// Return the category name as stored in the `items.category` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Book => "book",
            Self::Tool => "tool",
            Self::Clothing => "clothing",
            Self::Electronics => "electronics",
            Self::Game => "game",
            Self::Sports => "sports",
            Self::Kitchen => "kitchen",
            Self::Other => "other",
        }
    }

    /// Parse a category string. Returns `None` for unknown values.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "book" => Some(Self::Book),
            "tool" => Some(Self::Tool),
            "clothing" => Some(Self::Clothing),
            "electronics" => Some(Self::Electronics),
            "game" => Some(Self::Game),
            "sports" => Some(Self::Sports),
            "kitchen" => Some(Self::Kitchen),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    /// Parse leniently, mapping anything unrecognised to [`ItemCategory::Other`].
    pub fn from_str_or_other(s: &str) -> Self {
        Self::from_str(&s.trim().to_ascii_lowercase()).unwrap_or(Self::Other)
    }

    /// All valid category values.
    pub const ALL: &'static [&'static str] = &[
        "book",
        "tool",
        "clothing",
        "electronics",
        "game",
        "sports",
        "kitchen",
        "other",
    ];
}

impl std::fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

/// Details that only make sense for books.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookMetadata {
    pub author: Option<String>,
    pub series: Option<String>,
    pub series_number: Option<u32>,
    pub isbn: Option<String>,
    pub page_count: Option<u32>,
    /// 1 to 5 stars.
    pub rating: Option<u8>,
    pub published_year: Option<i32>,
    pub cover_url: Option<String>,
}

/// Free-form descriptors shared by every non-book category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralMetadata {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub condition: Option<String>,
}

/// Category-specific item metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemMetadata {
    Book(BookMetadata),
    General(GeneralMetadata),
}

impl ItemMetadata {
    /// Interpret an untyped metadata object according to `category`.
    ///
    /// Unknown keys are ignored. Returns `None` when `value` is not an object
    /// or none of the recognised fields are present.
    pub fn from_untyped(category: ItemCategory, value: &serde_json::Value) -> Option<Self> {
        let obj = value.as_object()?;
        if obj.is_empty() {
            return None;
        }
        match category {
            ItemCategory::Book => {
                let book = BookMetadata {
                    author: string_field(obj, "author"),
                    series: string_field(obj, "series"),
                    series_number: number_field(obj, "seriesNumber"),
                    isbn: string_field(obj, "isbn"),
                    page_count: number_field(obj, "pageCount"),
                    rating: number_field(obj, "rating"),
                    published_year: number_field(obj, "publishedYear"),
                    cover_url: string_field(obj, "coverUrl"),
                };
                (book != BookMetadata::default()).then_some(Self::Book(book))
            }
            _ => {
                let general = GeneralMetadata {
                    brand: string_field(obj, "brand"),
                    model: string_field(obj, "model"),
                    size: string_field(obj, "size"),
                    color: string_field(obj, "color"),
                    condition: string_field(obj, "condition"),
                };
                (general != GeneralMetadata::default()).then_some(Self::General(general))
            }
        }
    }

    /// Check the metadata is allowed on an item of `category`.
    pub fn validate_for(&self, category: ItemCategory) -> Result<(), CoreError> {
        match self {
            Self::Book(book) => {
                if category != ItemCategory::Book {
                    return Err(CoreError::Validation(format!(
                        "metadata: book metadata is not allowed on category '{category}'"
                    )));
                }
                if let Some(rating) = book.rating {
                    if !(1..=5).contains(&rating) {
                        return Err(CoreError::Validation(format!(
                            "metadata.rating: must be between 1 and 5, got {rating}"
                        )));
                    }
                }
                Ok(())
            }
            Self::General(_) => {
                if category == ItemCategory::Book {
                    return Err(CoreError::Validation(
                        "metadata: books require book metadata".into(),
                    ));
                }
                Ok(())
            }
        }
    }

    /// The author, when this is book metadata.
    pub fn author(&self) -> Option<&str> {
        match self {
            Self::Book(book) => book.author.as_deref(),
            Self::General(_) => None,
        }
    }
}

fn string_field(obj: &serde_json::Map<String, serde_json::Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Numbers from hand-edited forms arrive either as JSON numbers or strings.
fn number_field<T: TryFrom<i64>>(
    obj: &serde_json::Map<String, serde_json::Value>,
    key: &str,
) -> Option<T> {
    let raw = match obj.get(key)? {
        serde_json::Value::Number(n) => n.as_i64()?,
        serde_json::Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    T::try_from(raw).ok()
}

// ---------------------------------------------------------------------------
// Item
// ---------------------------------------------------------------------------

/// A physical possession tracked by its owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: EntityId,
    pub user_id: EntityId,
    pub name: String,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub category: ItemCategory,
    #[serde(default)]
    pub images: Vec<String>,
    /// Friend currently holding the item; `None` means it is not lent out.
    pub borrowed_by: Option<EntityId>,
    pub borrowed_date: Option<Timestamp>,
    pub due_date: Option<Timestamp>,
    pub returned_date: Option<Timestamp>,
    pub metadata: Option<ItemMetadata>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Item {
    /// `true` while the item is out with a friend and not yet returned.
    pub fn is_lent(&self) -> bool {
        self.borrowed_by.is_some() && self.returned_date.is_none()
    }

    /// Check the loan fields are mutually consistent.
    ///
    /// - `borrowed_by` and `borrowed_date` are set together or not at all.
    /// - `returned_date` requires `borrowed_date` and must not precede it.
    /// - `due_date` must not precede `borrowed_date`.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_loan_fields(
            self.borrowed_by.as_deref(),
            self.borrowed_date,
            self.due_date,
            self.returned_date,
        )?;
        if let Some(metadata) = &self.metadata {
            metadata.validate_for(self.category)?;
        }
        Ok(())
    }
}

/// Loan-field consistency rules shared by [`Item::validate`] and the
/// lending operations.
pub fn validate_loan_fields(
    borrowed_by: Option<&str>,
    borrowed_date: Option<Timestamp>,
    due_date: Option<Timestamp>,
    returned_date: Option<Timestamp>,
) -> Result<(), CoreError> {
    // After a return the borrower is cleared but the borrowed date stays.
    if borrowed_by.is_some() && borrowed_date.is_none() {
        return Err(CoreError::Validation(
            "borrowedDate: required when borrowedBy is set".into(),
        ));
    }
    if borrowed_by.is_none() && borrowed_date.is_some() && returned_date.is_none() {
        return Err(CoreError::Validation(
            "borrowedBy: required when borrowedDate is set".into(),
        ));
    }
    match (borrowed_date, returned_date) {
        (None, Some(_)) => {
            return Err(CoreError::Validation(
                "returnedDate: requires a borrowedDate".into(),
            ))
        }
        (Some(borrowed), Some(returned)) if returned < borrowed => {
            return Err(CoreError::Validation(
                "returnedDate: must not precede borrowedDate".into(),
            ))
        }
        _ => {}
    }
    if let (Some(borrowed), Some(due)) = (borrowed_date, due_date) {
        if due.date_naive() < borrowed.date_naive() {
            return Err(CoreError::Validation(
                "dueDate: must not precede borrowedDate".into(),
            ));
        }
    }
    Ok(())
}

/// Form input for creating an item.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    #[validate(length(min = 1, max = 100, message = "Name is required (max 100 characters)"))]
    pub name: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub notes: Option<String>,
    pub category: ItemCategory,
    #[serde(default)]
    pub images: Vec<String>,
    pub metadata: Option<ItemMetadata>,
}

impl NewItem {
    /// Run the form rules plus the metadata/category check.
    pub fn validate_all(&self) -> Result<(), CoreError> {
        validate_input(self)?;
        require_non_blank("name", &self.name)?;
        if let Some(metadata) = &self.metadata {
            metadata.validate_for(self.category)?;
        }
        Ok(())
    }
}
