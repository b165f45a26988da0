//! End-to-end WebSocket tests through `/ws`

use axum::http::StatusCode;
use serde_json::{json, Value};

use crate::common::{authed, open_socket, register_user, TestApp};

#[tokio::test]
async fn test_socket_announce_and_direct_message() {
    let app = TestApp::with_http_transport();
    let ada = register_user(&app.server, "Ada").await;
    let bob = register_user(&app.server, "Bob").await;

    let mut ada_ws = open_socket(&app.server, &ada).await;
    // header auth works as well as the query string
    let mut bob_ws = authed(app.server.get_websocket("/ws"), &bob)
        .await
        .into_websocket()
        .await;

    ada_ws
        .send_json(&json!({ "event": "announce-identity", "data": { "userId": ada.id } }))
        .await;
    let ack: Value = ada_ws.receive_json().await;
    assert_eq!(ack["event"], "identity-announced");
    assert_eq!(ack["data"]["userId"], ada.id.to_string());

    bob_ws
        .send_json(&json!({ "event": "announce-identity", "data": { "userId": bob.id } }))
        .await;
    let _: Value = bob_ws.receive_json().await;

    ada_ws
        .send_json(&json!({
            "event": "send-direct-message",
            "data": { "from": ada.id, "to": bob.id, "content": "over the wire" }
        }))
        .await;

    let delivered: Value = bob_ws.receive_json().await;
    assert_eq!(delivered["event"], "direct-message-delivered");
    assert_eq!(delivered["data"]["content"], "over the wire");
    assert_eq!(delivered["data"]["from"], ada.id.to_string());

    let echoed: Value = ada_ws.receive_json().await;
    assert_eq!(echoed["data"]["id"], delivered["data"]["id"]);

    let history: Vec<Value> = authed(app.server.get(&format!("/api/messages/{}", bob.id)), &ada)
        .await
        .json();
    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn test_socket_rejects_malformed_and_unannounced_frames() {
    let app = TestApp::with_http_transport();
    let ada = register_user(&app.server, "Ada").await;
    let bob = register_user(&app.server, "Bob").await;

    let mut ws = open_socket(&app.server, &ada).await;

    ws.send_text("this is not json").await;
    let rejected: Value = ws.receive_json().await;
    assert_eq!(rejected["event"], "rejected");
    assert_eq!(rejected["data"]["reason"], "validation");

    ws.send_json(&json!({
        "event": "send-direct-message",
        "data": { "from": ada.id, "to": bob.id, "content": "who am i" }
    }))
    .await;
    let rejected: Value = ws.receive_json().await;
    assert_eq!(rejected["data"]["event"], "send-direct-message");
    assert_eq!(rejected["data"]["reason"], "not_announced");
}

#[tokio::test]
async fn test_socket_upgrade_requires_valid_token() {
    let app = TestApp::with_http_transport();

    let response = app.server.get_websocket("/ws").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let response = app
        .server
        .get_websocket("/ws")
        .add_query_param("token", "not.a.token")
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"], "Token is not valid");
}

#[tokio::test]
async fn test_socket_cannot_announce_someone_else() {
    let app = TestApp::with_http_transport();
    let ada = register_user(&app.server, "Ada").await;
    let bob = register_user(&app.server, "Bob").await;
    let mallory = register_user(&app.server, "Mallory").await;

    let mut bob_ws = open_socket(&app.server, &bob).await;
    bob_ws
        .send_json(&json!({ "event": "announce-identity", "data": { "userId": bob.id } }))
        .await;
    let _: Value = bob_ws.receive_json().await;

    let mut mallory_ws = open_socket(&app.server, &mallory).await;
    mallory_ws
        .send_json(&json!({ "event": "announce-identity", "data": { "userId": bob.id } }))
        .await;
    let rejected: Value = mallory_ws.receive_json().await;
    assert_eq!(rejected["event"], "rejected");
    assert_eq!(rejected["data"]["event"], "announce-identity");
    assert_eq!(rejected["data"]["reason"], "unauthorized");

    mallory_ws
        .send_json(&json!({
            "event": "send-direct-message",
            "data": { "from": bob.id, "to": ada.id, "content": "forged" }
        }))
        .await;
    let rejected: Value = mallory_ws.receive_json().await;
    assert_eq!(rejected["data"]["reason"], "not_announced");

    // bob still owns his directory entry
    assert_eq!(app.state.directory.online_count(), 1);
    assert!(app.state.directory.is_online(&bob.id));
    let history: Vec<Value> = authed(app.server.get(&format!("/api/messages/{}", ada.id)), &bob)
        .await
        .json();
    assert!(history.is_empty());
}
