//! Connections API integration tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::Value;
use uuid::Uuid;

use crate::common::{assert_action, assert_error, authed, register_user, TestApp, TestUser};

async fn status_of(app: &TestApp, viewer: &TestUser, other: &TestUser) -> String {
    let people: Vec<Value> = authed(app.server.get("/api/connections/people"), viewer)
        .await
        .json();
    people
        .iter()
        .find(|p| p["id"] == other.id.to_string())
        .map(|p| p["status"].as_str().unwrap_or_default().to_string())
        .expect("person listed")
}

#[tokio::test]
async fn test_people_excludes_caller() {
    let app = TestApp::new();
    let ada = register_user(&app.server, "Ada").await;
    let _bob = register_user(&app.server, "Bob").await;
    let _cy = register_user(&app.server, "Cy").await;

    let people: Vec<Value> = authed(app.server.get("/api/connections/people"), &ada)
        .await
        .json();
    let names: Vec<&str> = people.iter().filter_map(|p| p["name"].as_str()).collect();
    assert_eq!(names, vec!["Bob", "Cy"]);
    assert!(people.iter().all(|p| p["status"] == "none" && p["online"] == false));
}

#[tokio::test]
async fn test_request_accept_flow() {
    let app = TestApp::new();
    let ada = register_user(&app.server, "Ada").await;
    let bob = register_user(&app.server, "Bob").await;

    let response = authed(app.server.post(&format!("/api/connections/request/{}", bob.id)), &ada).await;
    assert_action(&response, "Request sent");
    assert_eq!(status_of(&app, &ada, &bob).await, "request_sent");
    assert_eq!(status_of(&app, &bob, &ada).await, "request_received");

    let response = authed(app.server.post(&format!("/api/connections/accept/{}", ada.id)), &bob).await;
    assert_action(&response, "Request accepted");
    assert_eq!(status_of(&app, &ada, &bob).await, "friends");
    assert_eq!(status_of(&app, &bob, &ada).await, "friends");

    let response = authed(app.server.post(&format!("/api/connections/request/{}", bob.id)), &ada).await;
    assert_error(&response, StatusCode::BAD_REQUEST, "Already friends");
}

#[tokio::test]
async fn test_ignore_clears_request() {
    let app = TestApp::new();
    let ada = register_user(&app.server, "Ada").await;
    let bob = register_user(&app.server, "Bob").await;

    authed(app.server.post(&format!("/api/connections/request/{}", bob.id)), &ada).await;
    let response = authed(app.server.post(&format!("/api/connections/ignore/{}", ada.id)), &bob).await;
    assert_action(&response, "Request ignored");

    assert_eq!(status_of(&app, &ada, &bob).await, "none");
    assert_eq!(status_of(&app, &bob, &ada).await, "none");
}

#[tokio::test]
async fn test_crossed_requests_become_friends() {
    let app = TestApp::new();
    let ada = register_user(&app.server, "Ada").await;
    let bob = register_user(&app.server, "Bob").await;

    authed(app.server.post(&format!("/api/connections/request/{}", bob.id)), &ada).await;
    let response = authed(app.server.post(&format!("/api/connections/request/{}", ada.id)), &bob).await;
    assert_action(&response, "Request accepted");
    assert_eq!(status_of(&app, &ada, &bob).await, "friends");
}

#[tokio::test]
async fn test_request_errors() {
    let app = TestApp::new();
    let ada = register_user(&app.server, "Ada").await;
    let bob = register_user(&app.server, "Bob").await;

    let response = authed(app.server.post(&format!("/api/connections/request/{}", ada.id)), &ada).await;
    assert_error(&response, StatusCode::BAD_REQUEST, "Cannot connect to yourself");

    let response = authed(
        app.server.post(&format!("/api/connections/request/{}", Uuid::new_v4())),
        &ada,
    )
    .await;
    assert_error(&response, StatusCode::NOT_FOUND, "User not found");

    // Nothing to accept
    let response = authed(app.server.post(&format!("/api/connections/accept/{}", bob.id)), &ada).await;
    assert_error(&response, StatusCode::NOT_FOUND, "Request not found");
}

#[tokio::test]
async fn test_people_reports_presence() {
    let app = TestApp::new();
    let ada = register_user(&app.server, "Ada").await;
    let bob = register_user(&app.server, "Bob").await;

    let (_session, _rx) = app.connect(bob.id).await;

    let people: Vec<Value> = authed(app.server.get("/api/connections/people"), &ada)
        .await
        .json();
    assert_eq!(people[0]["id"], bob.id.to_string());
    assert_eq!(people[0]["online"], true);
}
