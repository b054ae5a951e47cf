//! Route definitions for the `/friends` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::friends;
use crate::state::AppState;

/// Routes mounted at `/friends`.
///
/// ```text
/// GET    /        -> list
/// POST   /        -> create
/// GET    /{id}    -> get_by_id
/// DELETE /{id}    -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(friends::list).post(friends::create))
        .route("/{id}", get(friends::get_by_id).delete(friends::delete))
}
