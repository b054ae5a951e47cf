use lenderoo_core::error::CoreError;
use lenderoo_db::StoreError;

/// Errors raised by service operations.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// A domain-level error from `lenderoo_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A store or provider failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Local data may only be cleared once the migration has completed.
    #[error("Local data cannot be cleared before the migration has completed")]
    MigrationIncomplete,

    /// A required setting is missing or malformed.
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
