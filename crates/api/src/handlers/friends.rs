//! Handlers for the `/friends` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use lenderoo_core::friend::{Friend, NewFriend};

use crate::error::AppResult;
use crate::response::{Created, Data};
use crate::state::AppState;

/// POST /api/v1/friends
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<NewFriend>,
) -> AppResult<Created<Friend>> {
    let friend = state.lending.create_friend(input).await?;
    Ok(Created(friend))
}

/// GET /api/v1/friends
pub async fn list(State(state): State<AppState>) -> AppResult<Data<Vec<Friend>>> {
    let friends = state.lending.list_friends().await?;
    Ok(Data(friends))
}

/// GET /api/v1/friends/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Data<Friend>> {
    let friend = state.lending.get_friend(&id).await?;
    Ok(Data(friend))
}

/// DELETE /api/v1/friends/{id}
///
/// Refused with 409 while anything is lent to the friend.
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<StatusCode> {
    state.lending.delete_friend(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
