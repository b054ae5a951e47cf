//! Row structs (snake_case columns) and insert DTOs.
//!
//! Rows convert into the camelCase domain types from `lenderoo_core`.

pub mod friend;
pub mod history;
pub mod item;
