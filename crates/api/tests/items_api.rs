//! Integration tests for the `/api/v1/items` and `/api/v1/friends` routes.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use serde_json::json;

use common::{body_json, delete, get, post_json, put_json, send};
use lenderoo_db::auth::StaticAuthProvider;

async fn create_item(app: axum::Router, name: &str) -> String {
    let response = post_json(app, "/api/v1/items", json!({ "name": name, "category": "tool" })).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string()
}

async fn create_friend(app: axum::Router, name: &str) -> String {
    let response = post_json(app, "/api/v1/friends", json!({ "name": name })).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string()
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

#[tokio::test]
async fn created_item_is_available() {
    let (app, _) = common::build_test_app();
    let id = create_item(app.clone(), "Drill").await;

    let response = get(app, &format!("/api/v1/items/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "Drill");
    assert_eq!(json["data"]["status"], "available");
    assert_eq!(json["data"]["isDueSoon"], false);
    assert!(json["data"]["daysUntilDue"].is_null());
}

#[tokio::test]
async fn blank_item_name_is_rejected() {
    let (app, remote) = common::build_test_app();
    let response = post_json(app, "/api/v1/items", json!({ "name": "", "category": "tool" })).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(remote.counts().await.items, 0);
}

#[tokio::test]
async fn unknown_item_returns_404() {
    let (app, _) = common::build_test_app();
    let response = get(app, "/api/v1/items/does-not-exist").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

#[tokio::test]
async fn lend_and_return_round_trip() {
    let (app, _) = common::build_test_app();
    let item_id = create_item(app.clone(), "Drill").await;
    let friend_id = create_friend(app.clone(), "Ana").await;

    let due = Utc::now() + Duration::days(10);
    let response = post_json(
        app.clone(),
        &format!("/api/v1/items/{item_id}/lend"),
        json!({ "friendId": friend_id, "dueDate": due }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "borrowed");
    assert_eq!(json["data"]["borrowedBy"], friend_id.as_str());

    let again = post_json(
        app.clone(),
        &format!("/api/v1/items/{item_id}/lend"),
        json!({ "friendId": friend_id }),
    )
    .await;
    assert_eq!(again.status(), StatusCode::CONFLICT);

    let response = post_json(app.clone(), &format!("/api/v1/items/{item_id}/return"), json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "returned");
    assert!(json["data"]["borrowedBy"].is_null());

    let history = get(app, &format!("/api/v1/items/{item_id}/history")).await;
    let json = body_json(history).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn overdue_and_due_soon_endpoints() {
    let (app, _) = common::build_test_app();
    let late = create_item(app.clone(), "Ladder").await;
    let soon = create_item(app.clone(), "Tent").await;
    let friend_id = create_friend(app.clone(), "Ana").await;

    post_json(
        app.clone(),
        &format!("/api/v1/items/{late}/lend"),
        json!({
            "friendId": friend_id,
            "borrowedDate": "2020-01-01T00:00:00Z",
            "dueDate": "2020-01-05T00:00:00Z"
        }),
    )
    .await;
    post_json(
        app.clone(),
        &format!("/api/v1/items/{soon}/lend"),
        json!({ "friendId": friend_id, "dueDate": Utc::now() + Duration::days(1) }),
    )
    .await;

    let overdue = body_json(get(app.clone(), "/api/v1/items/overdue").await).await;
    let overdue = overdue["data"].as_array().unwrap().clone();
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0]["id"], late.as_str());
    assert_eq!(overdue[0]["status"], "overdue");
    assert!(overdue[0]["daysUntilDue"].as_i64().unwrap() < 0);

    let due_soon = body_json(get(app, "/api/v1/items/due-soon").await).await;
    let due_soon = due_soon["data"].as_array().unwrap().clone();
    assert_eq!(due_soon.len(), 1);
    assert_eq!(due_soon[0]["id"], soon.as_str());
    assert_eq!(due_soon[0]["isDueSoon"], true);
}

#[tokio::test]
async fn due_date_can_be_moved_while_lent() {
    let (app, _) = common::build_test_app();
    let item_id = create_item(app.clone(), "Drill").await;
    let friend_id = create_friend(app.clone(), "Ana").await;

    let before = put_json(
        app.clone(),
        &format!("/api/v1/items/{item_id}/due-date"),
        json!({ "dueDate": null }),
    )
    .await;
    assert_eq!(before.status(), StatusCode::CONFLICT);

    post_json(
        app.clone(),
        &format!("/api/v1/items/{item_id}/lend"),
        json!({ "friendId": friend_id }),
    )
    .await;
    let due = Utc::now() + Duration::days(30);
    let response = put_json(
        app,
        &format!("/api/v1/items/{item_id}/due-date"),
        json!({ "dueDate": due }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["isDueSoon"], false);
    assert!(json["data"]["daysUntilDue"].as_i64().unwrap() >= 30);
}

#[tokio::test]
async fn lent_item_cannot_be_deleted() {
    let (app, remote) = common::build_test_app();
    let item_id = create_item(app.clone(), "Drill").await;
    let friend_id = create_friend(app.clone(), "Ana").await;
    post_json(
        app.clone(),
        &format!("/api/v1/items/{item_id}/lend"),
        json!({ "friendId": friend_id }),
    )
    .await;

    let response = delete(app.clone(), &format!("/api/v1/items/{item_id}")).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    post_json(app.clone(), &format!("/api/v1/items/{item_id}/return"), json!({})).await;
    let response = delete(app, &format!("/api/v1/items/{item_id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(remote.counts().await.items, 0);
}

#[tokio::test]
async fn image_upload_appends_url() {
    let (app, _) = common::build_test_app();
    let item_id = create_item(app.clone(), "Drill").await;

    let request = Request::post(format!("/api/v1/items/{item_id}/images/front.jpg"))
        .header("content-type", "image/jpeg")
        .body(Body::from(vec![0xFF, 0xD8, 0xFF]))
        .unwrap();
    let response = send(app, request).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let images = json["data"]["images"].as_array().unwrap();
    assert_eq!(images.len(), 1);
    assert!(images[0].as_str().unwrap().ends_with("/front.jpg"));
}

#[tokio::test]
async fn uploaded_image_is_served_under_files() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = common::build_app_with_files(dir.path());
    let item_id = create_item(app.clone(), "Drill").await;

    let request = Request::post(format!("/api/v1/items/{item_id}/images/front.jpg"))
        .header("content-type", "image/jpeg")
        .body(Body::from(vec![0xFF, 0xD8, 0xFF]))
        .unwrap();
    let json = body_json(send(app.clone(), request).await).await;
    let url = json["data"]["images"][0].as_str().unwrap().to_string();
    let served_at = url
        .strip_prefix("http://files.test")
        .expect("image URL under the files base URL");
    assert!(served_at.starts_with("/files/item-images/"));

    let response = get(app.clone(), served_at).await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(bytes.as_ref(), &[0xFF, 0xD8, 0xFF]);

    let missing = get(app, "/files/item-images/nobody/nothing.jpg").await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_image_body_is_rejected() {
    let (app, _) = common::build_test_app();
    let item_id = create_item(app.clone(), "Drill").await;

    let request = Request::post(format!("/api/v1/items/{item_id}/images/front.jpg"))
        .body(Body::empty())
        .unwrap();
    let response = send(app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Friends
// ---------------------------------------------------------------------------

#[tokio::test]
async fn friends_are_listed_and_deleted() {
    let (app, _) = common::build_test_app();
    let friend_id = create_friend(app.clone(), "Ana").await;

    let list = body_json(get(app.clone(), "/api/v1/friends").await).await;
    assert_eq!(list["data"].as_array().unwrap().len(), 1);
    assert_eq!(list["data"][0]["currentItemsBorrowed"], 0);

    let response = delete(app.clone(), &format!("/api/v1/friends/{friend_id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(app, &format!("/api/v1/friends/{friend_id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_friend_email_is_rejected() {
    let (app, _) = common::build_test_app();
    let response = post_json(
        app,
        "/api/v1/friends",
        json!({ "name": "Ana", "email": "not-an-email" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn signed_out_requests_are_unauthorized() {
    let (app, _) = common::build_app_with_auth(StaticAuthProvider::signed_out());
    let response = get(app, "/api/v1/items").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
}
