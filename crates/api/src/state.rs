use std::sync::Arc;

use lenderoo_db::DbPool;
use lenderoo_services::lending::LendingService;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the service holds its stores behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Item and friend lifecycle over the configured stores.
    pub lending: LendingService,
    /// Database pool, when the remote store is Postgres. Only used by the
    /// health check.
    pub pool: Option<DbPool>,
    pub config: Arc<ServerConfig>,
}
