//! Handlers for the `/items` resource.
//!
//! Every item response carries the derived status fields (`status`,
//! `daysUntilDue`, `daysBorrowed`, `isDueSoon`) computed at request time.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use lenderoo_core::history::BorrowHistory;
use lenderoo_core::item::NewItem;
use lenderoo_core::types::Timestamp;
use lenderoo_services::lending::{ItemView, LendItem};

use crate::error::{AppError, AppResult};
use crate::response::{Created, Data};
use crate::state::AppState;

/// Request body for `POST /items/{id}/return`. Defaults to now.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnItem {
    pub returned_date: Option<Timestamp>,
}

/// Request body for `PUT /items/{id}/due-date`. `null` clears the due date.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetDueDate {
    pub due_date: Option<Timestamp>,
}

/// POST /api/v1/items
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<NewItem>,
) -> AppResult<Created<ItemView>> {
    let item = state.lending.create_item(input).await?;
    let view = state.lending.view(item, Utc::now());
    Ok(Created(view))
}

/// GET /api/v1/items
pub async fn list(State(state): State<AppState>) -> AppResult<Data<Vec<ItemView>>> {
    let items = state.lending.list_items_with_status(Utc::now()).await?;
    Ok(Data(items))
}

/// GET /api/v1/items/overdue
pub async fn list_overdue(
    State(state): State<AppState>,
) -> AppResult<Data<Vec<ItemView>>> {
    let items = state.lending.overdue_items(Utc::now()).await?;
    Ok(Data(items))
}

/// GET /api/v1/items/due-soon
pub async fn list_due_soon(
    State(state): State<AppState>,
) -> AppResult<Data<Vec<ItemView>>> {
    let items = state.lending.due_soon_items(Utc::now()).await?;
    Ok(Data(items))
}

/// GET /api/v1/items/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Data<ItemView>> {
    let item = state.lending.get_item(&id).await?;
    Ok(Data(state.lending.view(item, Utc::now())))
}

/// DELETE /api/v1/items/{id}
///
/// Refused with 409 while the item is lent out.
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<StatusCode> {
    state.lending.delete_item(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/items/{id}/lend
pub async fn lend(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<LendItem>,
) -> AppResult<Data<ItemView>> {
    let item = state.lending.lend_item(&id, input).await?;
    Ok(Data(state.lending.view(item, Utc::now())))
}

/// POST /api/v1/items/{id}/return
pub async fn return_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<ReturnItem>,
) -> AppResult<Data<ItemView>> {
    let item = state.lending.return_item(&id, input.returned_date).await?;
    Ok(Data(state.lending.view(item, Utc::now())))
}

/// PUT /api/v1/items/{id}/due-date
pub async fn set_due_date(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<SetDueDate>,
) -> AppResult<Data<ItemView>> {
    let item = state.lending.set_due_date(&id, input.due_date).await?;
    Ok(Data(state.lending.view(item, Utc::now())))
}

/// GET /api/v1/items/{id}/history
pub async fn history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Data<Vec<BorrowHistory>>> {
    let entries = state.lending.item_history(&id).await?;
    Ok(Data(entries))
}

/// POST /api/v1/items/{id}/images/{file_name}
///
/// The request body is the raw image.
pub async fn upload_image(
    State(state): State<AppState>,
    Path((id, file_name)): Path<(String, String)>,
    body: Bytes,
) -> AppResult<Created<ItemView>> {
    if file_name.contains(['/', '\\']) || file_name.starts_with('.') {
        return Err(AppError::BadRequest(format!(
            "invalid image file name '{file_name}'"
        )));
    }
    if body.is_empty() {
        return Err(AppError::BadRequest("image body is empty".into()));
    }
    let item = state
        .lending
        .attach_image(&id, &file_name, body.to_vec())
        .await?;
    Ok(Created(state.lending.view(item, Utc::now())))
}
