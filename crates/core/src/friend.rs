//! Friends: local contacts or reciprocal connections who may borrow items.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::{EntityId, Timestamp};
use crate::validation::{require_non_blank, validate_input};

/// A friend row as seen by the UI layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Friend {
    pub id: EntityId,
    /// Owner of this contact entry.
    pub user_id: EntityId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    /// Items this friend holds right now.
    #[serde(default)]
    pub current_items_borrowed: u32,
    /// Items this friend has ever borrowed.
    #[serde(default)]
    pub total_items_borrowed: u32,
    /// Items the friend owns, when they are a connected app user.
    #[serde(default)]
    pub owned_items_count: u32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Form input for creating a friend.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewFriend {
    #[validate(length(min = 1, max = 100, message = "Name is required (max 100 characters)"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
}

impl NewFriend {
    pub fn validate_all(&self) -> Result<(), CoreError> {
        validate_input(self)?;
        require_non_blank("name", &self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn invalid_email_is_rejected() {
        let input = NewFriend {
            name: "Sam".into(),
            email: Some("sam-at-home".into()),
            phone: None,
            avatar_url: None,
        };
        let err = input.validate_all().unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("Invalid email address"));
    }

    #[test]
    fn missing_counts_default_to_zero() {
        let json = serde_json::json!({
            "id": "f1",
            "userId": "u1",
            "name": "Sam",
            "email": null,
            "phone": null,
            "avatarUrl": null,
            "createdAt": "2026-01-01T00:00:00Z",
            "updatedAt": "2026-01-01T00:00:00Z"
        });
        let f: Friend = serde_json::from_value(json).unwrap();
        assert_eq!(f.current_items_borrowed, 0);
        assert_eq!(f.total_items_borrowed, 0);
    }
}
