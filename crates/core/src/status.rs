//! Borrow status derivation and loan date arithmetic.
//!
//! Every function here is pure. The `*_at` variants take the reference
//! instant explicitly; the plain variants use the current time. Date-only
//! comparisons use UTC calendar days.

use chrono::{NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::item::Item;
use crate::relative_time::parse_timestamp;
use crate::types::Timestamp;

/// Default "due soon" window, in days.
pub const DEFAULT_DUE_SOON_DAYS: i64 = 3;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

// ---------------------------------------------------------------------------
// ItemStatus
// ---------------------------------------------------------------------------

/// Presentation state of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Available,
    Borrowed,
    Overdue,
    Returned,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Borrowed => "borrowed",
            Self::Overdue => "overdue",
            Self::Returned => "returned",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "available" => Some(Self::Available),
            "borrowed" => Some(Self::Borrowed),
            "overdue" => Some(Self::Overdue),
            "returned" => Some(Self::Returned),
            _ => None,
        }
    }

    /// All valid status values.
    pub const ALL: &'static [&'static str] = &["available", "borrowed", "overdue", "returned"];
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tunables for status presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusConfig {
    /// Items due within this many days (inclusive) count as due soon.
    pub due_soon_days: i64,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            due_soon_days: DEFAULT_DUE_SOON_DAYS,
        }
    }
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// Classify `item` relative to the current time.
pub fn calculate_item_status(item: &Item) -> ItemStatus {
    calculate_item_status_at(item, Utc::now())
}

/// Classify `item` relative to `now`.
///
/// Returned wins over everything, then a missing borrower means available,
/// then a due date before today means overdue.
pub fn calculate_item_status_at(item: &Item, now: Timestamp) -> ItemStatus {
    if item.returned_date.is_some() {
        return ItemStatus::Returned;
    }
    if item.borrowed_by.is_none() {
        return ItemStatus::Available;
    }
    match item.due_date {
        Some(due) if due.date_naive() < now.date_naive() => ItemStatus::Overdue,
        _ => ItemStatus::Borrowed,
    }
}

/// Midnight (UTC) at the start of `now`'s calendar day.
pub fn start_of_day(now: Timestamp) -> Timestamp {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Days from today until `due`; negative once the date has passed.
pub fn days_until_due(due: Timestamp) -> i64 {
    days_until_due_at(due, Utc::now())
}

/// Days from the start of `now`'s day until `due`, rounded up.
pub fn days_until_due_at(due: Timestamp, now: Timestamp) -> i64 {
    let diff = (due - start_of_day(now)).num_milliseconds();
    // Integer division truncates toward zero, which is already the ceiling
    // for negative quotients.
    let quotient = diff / MILLIS_PER_DAY;
    if diff % MILLIS_PER_DAY > 0 {
        quotient + 1
    } else {
        quotient
    }
}

/// [`days_until_due`] for a stored date string. `None` if it does not parse.
pub fn days_until_due_str(due: &str) -> Option<i64> {
    parse_timestamp(due).map(days_until_due)
}

/// Whole days an item has been (or was) out.
pub fn days_borrowed(borrowed: Timestamp, returned: Option<Timestamp>) -> i64 {
    days_borrowed_at(borrowed, returned, Utc::now())
}

/// Whole days between `borrowed` and `returned`, or `now` while still out.
/// Never negative.
pub fn days_borrowed_at(borrowed: Timestamp, returned: Option<Timestamp>, now: Timestamp) -> i64 {
    let end = returned.unwrap_or(now);
    (end - borrowed).num_days().max(0)
}

/// `true` when `due` falls within the default due-soon window.
pub fn is_due_soon(due: Timestamp) -> bool {
    is_due_soon_at(due, Utc::now(), DEFAULT_DUE_SOON_DAYS)
}

/// `true` when `0 <= days_until_due <= threshold_days`.
pub fn is_due_soon_at(due: Timestamp, now: Timestamp, threshold_days: i64) -> bool {
    let days = days_until_due_at(due, now);
    (0..=threshold_days).contains(&days)
}

/// Derived view of an item for list rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSummary {
    pub status: ItemStatus,
    pub days_until_due: Option<i64>,
    pub days_borrowed: Option<i64>,
    pub is_due_soon: bool,
}

impl StatusSummary {
    /// Compute every derived field for `item` at `now`.
    pub fn for_item(item: &Item, now: Timestamp, config: &StatusConfig) -> Self {
        let status = calculate_item_status_at(item, now);
        let open = matches!(status, ItemStatus::Borrowed | ItemStatus::Overdue);
        let days_until_due = item
            .due_date
            .filter(|_| open)
            .map(|due| days_until_due_at(due, now));
        let is_due_soon = open
            && item
                .due_date
                .is_some_and(|due| is_due_soon_at(due, now, config.due_soon_days));
        Self {
            status,
            days_until_due,
            days_borrowed: item
                .borrowed_date
                .map(|borrowed| days_borrowed_at(borrowed, item.returned_date, now)),
            is_due_soon,
        }
    }
}
