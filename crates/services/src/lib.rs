//! Stateful Lenderoo operations over injected stores.
//!
//! - [`migration::Migrator`]: the one-time copy of on-device records into
//!   the remote store.
//! - [`lending::LendingService`]: the item lifecycle (lend, due date,
//!   return, guarded deletes).

pub mod config;
pub mod error;
pub mod lending;
pub mod migration;

pub use error::{ServiceError, ServiceResult};
