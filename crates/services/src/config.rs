use std::path::PathBuf;

use crate::error::ServiceError;

/// Settings for the `lenderoo-migrate` binary, loaded from the environment.
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    /// JSON file holding the on-device key-value data.
    pub local_store_path: PathBuf,
    /// Postgres connection string of the remote store.
    pub database_url: String,
    /// Owner stamped on every migrated row.
    pub user_id: String,
    pub user_email: Option<String>,
}

impl MigrationConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var               | Default               |
    /// |-----------------------|-----------------------|
    /// | `LOCAL_STORE_PATH`    | `lenderoo-local.json` |
    /// | `DATABASE_URL`        | required              |
    /// | `LENDEROO_USER_ID`    | required              |
    /// | `LENDEROO_USER_EMAIL` | unset                 |
    pub fn from_env() -> Result<Self, ServiceError> {
        let local_store_path = std::env::var("LOCAL_STORE_PATH")
            .unwrap_or_else(|_| "lenderoo-local.json".into())
            .into();
        Ok(Self {
            local_store_path,
            database_url: required("DATABASE_URL")?,
            user_id: required("LENDEROO_USER_ID")?,
            user_email: std::env::var("LENDEROO_USER_EMAIL").ok(),
        })
    }
}

fn required(name: &str) -> Result<String, ServiceError> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ServiceError::Config(format!("{name} must be set")))
}
