//! Route definitions for the `/items` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::items;
use crate::state::AppState;

/// Routes mounted at `/items`.
///
/// ```text
/// GET    /                          -> list
/// POST   /                          -> create
/// GET    /overdue                   -> list_overdue
/// GET    /due-soon                  -> list_due_soon
/// GET    /{id}                      -> get_by_id
/// DELETE /{id}                      -> delete
/// POST   /{id}/lend                 -> lend
/// POST   /{id}/return               -> return_item
/// PUT    /{id}/due-date             -> set_due_date
/// GET    /{id}/history              -> history
/// POST   /{id}/images/{file_name}   -> upload_image
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(items::list).post(items::create))
        .route("/overdue", get(items::list_overdue))
        .route("/due-soon", get(items::list_due_soon))
        .route("/{id}", get(items::get_by_id).delete(items::delete))
        .route("/{id}/lend", post(items::lend))
        .route("/{id}/return", post(items::return_item))
        .route("/{id}/due-date", put(items::set_due_date))
        .route("/{id}/history", get(items::history))
        .route("/{id}/images/{file_name}", post(items::upload_image))
}
