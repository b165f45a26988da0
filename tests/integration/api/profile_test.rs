//! Profile API integration tests

use axum::http::StatusCode;
use serde_json::{json, Value};

use crate::common::{authed, register_user, TestApp};

#[tokio::test]
async fn test_get_me() {
    let app = TestApp::new();
    let ada = register_user(&app.server, "Ada").await;

    let response = authed(app.server.get("/api/profile/me"), &ada).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["id"], ada.id.to_string());
    assert_eq!(body["email"], ada.email);
    assert_eq!(body["bio"], "");
}

#[tokio::test]
async fn test_update_me_partial() {
    let app = TestApp::new();
    let ada = register_user(&app.server, "Ada").await;

    let response = authed(app.server.put("/api/profile/me"), &ada)
        .json(&json!({ "bio": "Analytical engines", "avatarUrl": "https://img/ada.png" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["name"], "Ada");
    assert_eq!(body["bio"], "Analytical engines");
    assert_eq!(body["avatarUrl"], "https://img/ada.png");
    assert_eq!(body["location"], "");

    // Blank name is ignored
    let body: Value = authed(app.server.put("/api/profile/me"), &ada)
        .json(&json!({ "name": "   ", "location": "London" }))
        .await
        .json();
    assert_eq!(body["name"], "Ada");
    assert_eq!(body["location"], "London");
    assert_eq!(body["bio"], "Analytical engines");
}
