//! Lenderoo domain core.
//!
//! Pure types and logic for tracking items lent to friends: the record
//! models, borrow status derivation, date arithmetic, and input validation.
//! Nothing in this crate performs I/O.

pub mod books;
pub mod borrow_request;
pub mod error;
pub mod friend;
pub mod history;
pub mod item;
pub mod relative_time;
pub mod status;
pub mod types;
pub mod validation;
