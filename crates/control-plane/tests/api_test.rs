// End-to-end tests for the Stamp Rally API
// Run with: cargo test -p stamprally-control-plane --test api_test
// Drives the full router against in-memory storage seeded with demo data

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use stamprally_control_plane::seed::seed_demo_data;
use stamprally_control_plane::storage::StorageBackend;
use stamprally_control_plane::{build_app, AppConfig};
use tower::ServiceExt;

async fn seeded_app() -> Router {
    let db = StorageBackend::in_memory();
    seed_demo_data(&db).await.unwrap();
    build_app(db, &AppConfig::default())
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn login(app: &Router, employee_code: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/v1/auth/login",
        None,
        Some(json!({ "employee_code": employee_code, "password": "99" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["access_token"].as_str().unwrap().to_string()
}

async fn event_id(app: &Router, token: &str, title: &str) -> String {
    let (_, body) = send(app, Method::GET, "/v1/events", Some(token), None).await;
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["title"] == title)
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string()
}

async fn balance(app: &Router, token: &str) -> i64 {
    let (status, body) = send(app, Method::GET, "/v1/me", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    body["user"]["stamps"].as_i64().unwrap()
}

#[tokio::test]
async fn test_join_approve_redeem_flow() {
    let app = seeded_app().await;
    let user = login(&app, "1").await;
    let admin = login(&app, "999").await;

    // Join a two-point event
    let golf = event_id(&app, &user, "Company golf tournament").await;
    let (status, participation) = send(
        &app,
        Method::POST,
        &format!("/v1/events/{golf}/join"),
        Some(&user),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(participation["approval_status"], "pending");

    // Joining twice is a failed precondition
    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/v1/events/{golf}/join"),
        Some(&user),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());

    // Admin approves from the queue
    let (status, pending) = send(
        &app,
        Method::GET,
        "/v1/participations/pending",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let pending = pending["data"].as_array().unwrap().clone();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0]["employee_code"], "1");

    let id = participation["id"].clone();
    let (status, outcome) = send(
        &app,
        Method::POST,
        "/v1/participations/approve",
        Some(&admin),
        Some(json!({ "ids": [id] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["processed"].as_array().unwrap().len(), 1);
    assert_eq!(balance(&app, &user).await, 2);

    // Re-approving is a no-op
    let (_, outcome) = send(
        &app,
        Method::POST,
        "/v1/participations/approve",
        Some(&admin),
        Some(json!({ "ids": [participation["id"]] })),
    )
    .await;
    assert_eq!(outcome["skipped"].as_array().unwrap().len(), 1);
    assert_eq!(balance(&app, &user).await, 2);

    // Create a two-stamp reward and redeem it
    let (status, reward) = send(
        &app,
        Method::POST,
        "/v1/rewards",
        Some(&admin),
        Some(json!({ "name": "Coffee", "required_stamps": "2" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(reward["required_stamps"], 2);

    let reward_id = reward["id"].as_str().unwrap();
    let (status, request) = send(
        &app,
        Method::POST,
        &format!("/v1/rewards/{reward_id}/request"),
        Some(&user),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(request["status"], "pending");
    assert_eq!(balance(&app, &user).await, 0);

    // Not enough stamps for a second one
    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/v1/rewards/{reward_id}/request"),
        Some(&user),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // History: +2 award then -2 redemption, newest first
    let (_, history) = send(&app, Method::GET, "/v1/me/history", Some(&user), None).await;
    let changes: Vec<i64> = history["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["change"].as_i64().unwrap())
        .collect();
    assert_eq!(changes, vec![-2, 2]);

    // Fulfilment does not touch the ledger
    let request_id = request["id"].as_str().unwrap();
    let (status, fulfilled) = send(
        &app,
        Method::POST,
        &format!("/v1/reward-requests/{request_id}/approve"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fulfilled["status"], "approved");
    assert_eq!(balance(&app, &user).await, 0);
}

#[tokio::test]
async fn test_admin_grant_shows_in_dashboard() {
    let app = seeded_app().await;
    let admin = login(&app, "999").await;
    let user = login(&app, "2").await;

    let (_, users) = send(&app, Method::GET, "/v1/users", Some(&admin), None).await;
    let user_id = users["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["employee_code"] == "2")
        .unwrap()["id"]
        .clone();

    let (status, granted) = send(
        &app,
        Method::POST,
        "/v1/stamps/grant",
        Some(&admin),
        Some(json!({ "user_id": user_id, "amount": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(granted["balance"], 3);
    assert_eq!(granted["entry"]["reason"], "Special grant");

    let (status, _) = send(
        &app,
        Method::POST,
        "/v1/stamps/grant",
        Some(&admin),
        Some(json!({ "user_id": user_id, "amount": "lots" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, dashboard) = send(&app, Method::GET, "/v1/me", Some(&user), None).await;
    assert_eq!(dashboard["user"]["stamps"], 3);
    assert_eq!(dashboard["history"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_admin_endpoints_reject_regular_users() {
    let app = seeded_app().await;
    let user = login(&app, "3").await;

    let (status, body) = send(
        &app,
        Method::GET,
        "/v1/participations/pending",
        Some(&user),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].is_string());

    let (status, _) = send(
        &app,
        Method::POST,
        "/v1/events",
        Some(&user),
        Some(json!({ "title": "Unauthorised" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_requests_without_token_are_unauthorized() {
    let app = seeded_app().await;

    let (status, _) = send(&app, Method::GET, "/v1/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/v1/me", Some("not-a-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        Method::POST,
        "/v1/auth/login",
        None,
        Some(json!({ "employee_code": "1", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_event_lifecycle_as_admin() {
    let app = seeded_app().await;
    let admin = login(&app, "999").await;
    let user = login(&app, "1").await;

    let (status, created) = send(
        &app,
        Method::POST,
        "/v1/events",
        Some(&admin),
        Some(json!({
            "title": "Yoga at lunch",
            "date": "2025-12-01",
            "start_time": "12:00",
            "points": "abc",
            "event_type": "single"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["points"], 1);
    let id = created["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        Method::POST,
        "/v1/events",
        Some(&admin),
        Some(json!({ "title": "Bad date", "date": "2025-13-45" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Closed events cannot be joined
    let (status, toggled) = send(
        &app,
        Method::POST,
        &format!("/v1/events/{id}/toggle"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(toggled["is_active"], false);

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/v1/events/{id}/join"),
        Some(&user),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/v1/events/{id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, &format!("/v1/events/{id}"), Some(&user), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
