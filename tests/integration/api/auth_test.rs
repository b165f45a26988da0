//! Authentication API integration tests

use axum::http::{header::AUTHORIZATION, HeaderValue, StatusCode};
use serde_json::{json, Value};

use crate::common::{assert_error, authed, register_user, TestApp, TEST_PASSWORD};

#[tokio::test]
async fn test_register_success() {
    let app = TestApp::new();

    let response = app
        .server
        .post("/api/auth/register")
        .json(&json!({
            "name": "Ada",
            "email": "Ada@Example.com",
            "password": "password123"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["user"]["name"], "Ada");
    assert_eq!(body["user"]["email"], "ada@example.com");
    assert!(body["user"].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_register_duplicate_email_is_conflict() {
    let app = TestApp::new();
    register_user(&app.server, "Ada").await;

    let response = app
        .server
        .post("/api/auth/register")
        .json(&json!({
            "name": "Other Ada",
            "email": "ADA@example.com",
            "password": "password123"
        }))
        .await;

    assert_error(&response, StatusCode::CONFLICT, "User already exists");
}

#[tokio::test]
async fn test_register_validation() {
    let app = TestApp::new();

    let response = app
        .server
        .post("/api/auth/register")
        .json(&json!({ "name": "  ", "email": "a@example.com", "password": "password123" }))
        .await;
    assert_error(&response, StatusCode::BAD_REQUEST, "Name required");

    let response = app
        .server
        .post("/api/auth/register")
        .json(&json!({ "name": "Ada", "email": "not-an-email", "password": "password123" }))
        .await;
    assert_error(&response, StatusCode::BAD_REQUEST, "Valid email required");

    let response = app
        .server
        .post("/api/auth/register")
        .json(&json!({ "name": "Ada", "email": "a@example.com", "password": "short" }))
        .await;
    assert_error(
        &response,
        StatusCode::BAD_REQUEST,
        "Password must be at least 8 characters",
    );
}

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::new();
    let ada = register_user(&app.server, "Ada").await;

    let response = app
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": "ada@example.com", "password": TEST_PASSWORD }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["user"]["id"], ada.id.to_string());
    assert!(body["token"].as_str().is_some());
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    let app = TestApp::new();
    register_user(&app.server, "Ada").await;

    let response = app
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": "ada@example.com", "password": "wrongpassword" }))
        .await;
    assert_error(&response, StatusCode::UNAUTHORIZED, "Invalid credentials");

    let response = app
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": "nobody@example.com", "password": TEST_PASSWORD }))
        .await;
    assert_error(&response, StatusCode::UNAUTHORIZED, "Invalid credentials");
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let app = TestApp::new();

    let response = app.server.get("/api/profile/me").await;
    assert_error(&response, StatusCode::UNAUTHORIZED, "No token, authorization denied");

    let response = app
        .server
        .get("/api/profile/me")
        .add_header(AUTHORIZATION, HeaderValue::from_static("Bearer not.a.token"))
        .await;
    assert_error(&response, StatusCode::UNAUTHORIZED, "Token is not valid");
}

#[tokio::test]
async fn test_token_from_other_server_is_rejected() {
    let first = TestApp::new();
    let ada = register_user(&first.server, "Ada").await;

    // Same secret, but the user does not exist in this store
    let second = TestApp::new();
    let response = authed(second.server.get("/api/profile/me"), &ada).await;
    assert_error(&response, StatusCode::UNAUTHORIZED, "Token is not valid");
}

#[tokio::test]
async fn test_health_reports_online_count() {
    let app = TestApp::new();
    let ada = register_user(&app.server, "Ada").await;

    let body: Value = app.server.get("/health").await.json();
    assert_eq!(body, json!({ "status": "ok", "online": 0 }));

    let (_session, _rx) = app.connect(ada.id).await;
    let body: Value = app.server.get("/health").await.json();
    assert_eq!(body["online"], 1);
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let app = TestApp::new();
    let response = app.server.get("/api/nope").await;
    assert_error(&response, StatusCode::NOT_FOUND, "Route not found");
}
