//! Storage seams for Lenderoo.
//!
//! Each external collaborator is an async trait so services can be handed
//! either the real backend or an isolated in-memory double:
//!
//! - [`remote::RemoteStore`]: relational storage (Postgres via `sqlx`, or
//!   [`memory::MemoryRemoteStore`]).
//! - [`local::LocalStore`]: on-device key-value storage.
//! - [`auth::AuthProvider`]: the signed-in user.
//! - [`object_storage::ObjectStorage`]: item images.

use sqlx::postgres::PgPoolOptions;

pub mod auth;
pub mod error;
pub mod local;
pub mod memory;
pub mod models;
pub mod object_storage;
pub mod remote;
pub mod repositories;

pub use error::StoreError;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
}

/// Run a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply pending schema migrations from `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
