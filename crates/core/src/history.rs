//! Borrow history: one row per loan, closed when the item comes back.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{EntityId, Timestamp};

/// A completed or ongoing loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowHistory {
    pub id: EntityId,
    pub user_id: EntityId,
    pub item_id: EntityId,
    pub friend_id: EntityId,
    pub borrowed_date: Timestamp,
    pub due_date: Option<Timestamp>,
    pub returned_date: Option<Timestamp>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
}

impl BorrowHistory {
    /// `true` until the loan is closed.
    pub fn is_open(&self) -> bool {
        self.returned_date.is_none()
    }

    /// Close the loan. A closed entry is immutable.
    pub fn close(&mut self, returned_date: Timestamp) -> Result<(), CoreError> {
        if !self.is_open() {
            return Err(CoreError::Conflict(format!(
                "history entry {} is already closed",
                self.id
            )));
        }
        if returned_date < self.borrowed_date {
            return Err(CoreError::Validation(
                "returnedDate: must not precede borrowedDate".into(),
            ));
        }
        self.returned_date = Some(returned_date);
        Ok(())
    }
}

/// Input for appending a history entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBorrowHistory {
    pub item_id: EntityId,
    pub friend_id: EntityId,
    pub borrowed_date: Timestamp,
    pub due_date: Option<Timestamp>,
    pub returned_date: Option<Timestamp>,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{Duration, Utc};

    fn entry() -> BorrowHistory {
        let now = Utc::now();
        BorrowHistory {
            id: "h1".into(),
            user_id: "u1".into(),
            item_id: "i1".into(),
            friend_id: "f1".into(),
            borrowed_date: now - Duration::days(3),
            due_date: None,
            returned_date: None,
            notes: None,
            created_at: now,
        }
    }

    #[test]
    fn close_sets_returned_date_once() {
        let mut h = entry();
        let when = Utc::now();
        h.close(when).unwrap();
        assert_eq!(h.returned_date, Some(when));
        assert!(!h.is_open());
        assert_matches!(h.close(Utc::now()), Err(CoreError::Conflict(_)));
        assert_eq!(h.returned_date, Some(when));
    }

    #[test]
    fn close_before_borrow_is_rejected() {
        let mut h = entry();
        let too_early = h.borrowed_date - Duration::days(1);
        assert_matches!(h.close(too_early), Err(CoreError::Validation(_)));
        assert!(h.is_open());
    }
}
