//! Signed-in user lookup.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use lenderoo_core::types::EntityId;

use crate::error::StoreError;

/// The authenticated user that owns created records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: EntityId,
    pub email: Option<String>,
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// The signed-in user, or `None` when signed out.
    async fn current_user(&self) -> Result<Option<CurrentUser>, StoreError>;

    /// Like [`current_user`](Self::current_user) but fails when signed out.
    async fn require_user(&self) -> Result<CurrentUser, StoreError> {
        self.current_user().await?.ok_or(StoreError::Unauthenticated)
    }
}

/// Provider with a fixed session, configured at startup.
#[derive(Debug, Clone, Default)]
pub struct StaticAuthProvider {
    user: Option<CurrentUser>,
}

impl StaticAuthProvider {
    pub fn signed_in(id: impl Into<EntityId>, email: Option<String>) -> Self {
        Self {
            user: Some(CurrentUser {
                id: id.into(),
                email,
            }),
        }
    }

    pub fn signed_out() -> Self {
        Self { user: None }
    }
}

#[async_trait]
impl AuthProvider for StaticAuthProvider {
    async fn current_user(&self) -> Result<Option<CurrentUser>, StoreError> {
        Ok(self.user.clone())
    }
}
