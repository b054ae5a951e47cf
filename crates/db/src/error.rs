use lenderoo_core::error::CoreError;
use lenderoo_core::types::EntityId;

/// Failures raised by the store and provider seams.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: EntityId },

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("No signed-in user")]
    Unauthenticated,
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => CoreError::NotFound { entity, id },
            StoreError::InvalidId(id) => CoreError::Validation(format!("invalid id '{id}'")),
            StoreError::Unauthenticated => CoreError::Unauthorized("no signed-in user".into()),
            other => CoreError::Internal(other.to_string()),
        }
    }
}

/// Parse a string identifier into the UUID the remote schema uses.
pub fn parse_uuid(id: &str) -> Result<uuid::Uuid, StoreError> {
    uuid::Uuid::parse_str(id).map_err(|_| StoreError::InvalidId(id.to_string()))
}
