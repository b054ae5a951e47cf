//! Success responses. Every body is wrapped as `{ "data": ... }`; errors use
//! the separate shape in [`crate::error`].

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct Envelope<T> {
    data: T,
}

/// `200 OK` with `{ "data": T }`.
#[derive(Debug)]
pub struct Data<T>(pub T);

/// `201 Created` with `{ "data": T }`, for inserts and image uploads.
#[derive(Debug)]
pub struct Created<T>(pub T);

impl<T: Serialize> IntoResponse for Data<T> {
    fn into_response(self) -> Response {
        Json(Envelope { data: self.0 }).into_response()
    }
}

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, Json(Envelope { data: self.0 })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn parts(response: Response) -> (StatusCode, serde_json::Value) {
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn data_wraps_payload() {
        let (status, json) = parts(Data(vec!["Drill", "Tent"]).into_response()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!({ "data": ["Drill", "Tent"] }));
    }

    #[tokio::test]
    async fn created_sets_201() {
        let (status, json) = parts(Created("i1").into_response()).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["data"], "i1");
    }
}
