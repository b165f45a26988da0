//! Fan-out scenarios spanning HTTP and live sessions

use assert_matches::assert_matches;
use circle_chat::shared::messaging::GroupId;
use circle_chat::shared::ServerEvent;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tokio::sync::mpsc::error::TryRecvError;

use crate::common::{authed, register_user, test_config, TestApp};

fn frame(event: &str, data: Value) -> String {
    json!({ "event": event, "data": data }).to_string()
}

#[tokio::test]
async fn test_direct_message_reaches_online_recipient() {
    let app = TestApp::new();
    let ada = register_user(&app.server, "Ada").await;
    let bob = register_user(&app.server, "Bob").await;
    let (mut ada_session, mut ada_rx) = app.connect(ada.id).await;
    let (_bob_session, mut bob_rx) = app.connect(bob.id).await;

    app.state
        .fanout
        .dispatch(
            &mut ada_session,
            &frame("send-direct-message", json!({ "from": ada.id, "to": bob.id, "content": " hi " })),
        )
        .await;

    let delivered = assert_matches!(bob_rx.try_recv(), Ok(ServerEvent::DirectMessageDelivered(m)) => m);
    assert_eq!(delivered.content, "hi");
    assert_eq!(delivered.from, ada.id);
    let echoed = assert_matches!(ada_rx.try_recv(), Ok(ServerEvent::DirectMessageDelivered(m)) => m);
    assert_eq!(echoed.id, delivered.id);

    // Persisted before delivery
    let history: Vec<Value> = authed(app.server.get(&format!("/api/messages/{}", ada.id)), &bob)
        .await
        .json();
    assert_eq!(history[0]["id"], delivered.id.to_string());
}

#[tokio::test]
async fn test_direct_message_to_offline_stranger_is_kept_for_history() {
    let app = TestApp::new();
    let ada = register_user(&app.server, "Ada").await;
    let bob = register_user(&app.server, "Bob").await;
    let (mut ada_session, mut ada_rx) = app.connect(ada.id).await;
    assert!(!app.state.directory.is_online(&bob.id));

    app.state
        .fanout
        .dispatch(
            &mut ada_session,
            &frame("send-direct-message", json!({ "from": ada.id, "to": bob.id, "content": "ping" })),
        )
        .await;

    let echoed = assert_matches!(ada_rx.try_recv(), Ok(ServerEvent::DirectMessageDelivered(m)) => m);
    assert_eq!(echoed.from, ada.id);
    assert_eq!(echoed.to, bob.id);
    assert_matches!(ada_rx.try_recv(), Err(TryRecvError::Empty));

    let stored = app.state.store.conversation(ada.id, bob.id).await.expect("conversation");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, echoed.id);
    assert_eq!(stored[0].created_at, echoed.created_at);

    // bob comes online later: nothing replayed live, but history has it
    let (_bob_session, mut bob_rx) = app.connect(bob.id).await;
    assert_matches!(bob_rx.try_recv(), Err(TryRecvError::Empty));
    let history: Vec<Value> = authed(app.server.get(&format!("/api/messages/{}", ada.id)), &bob)
        .await
        .json();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["id"], echoed.id.to_string());
    assert_eq!(history[0]["content"], "ping");
}

#[tokio::test]
async fn test_join_approve_then_post_reaches_subscribers() {
    let app = TestApp::new();
    let ada = register_user(&app.server, "Ada").await;
    let bob = register_user(&app.server, "Bob").await;
    let cy = register_user(&app.server, "Cy").await;

    let group: Value = authed(app.server.post("/api/groups"), &ada)
        .json(&json!({ "name": "Rust" }))
        .await
        .json();
    let group_id: GroupId = group["id"].as_str().and_then(|s| s.parse().ok()).expect("id");

    authed(app.server.post(&format!("/api/groups/{}/join", group_id)), &bob).await;
    let pending = app.state.store.group(group_id).await.expect("store").expect("group");
    assert_eq!(pending.pending_members, vec![bob.id]);

    authed(app.server.post(&format!("/api/groups/{}/approve/{}", group_id, bob.id)), &ada).await;
    let approved = app.state.store.group(group_id).await.expect("store").expect("group");
    assert_eq!(approved.members, vec![ada.id, bob.id]);
    assert!(approved.pending_members.is_empty());

    let (mut ada_session, mut ada_rx) = app.connect(ada.id).await;
    let (mut bob_session, mut bob_rx) = app.connect(bob.id).await;
    // online, but never subscribed
    let (_cy_session, mut cy_rx) = app.connect(cy.id).await;

    let subscribe = frame("subscribe-group-channel", json!({ "groupId": group_id }));
    app.state.fanout.dispatch(&mut ada_session, &subscribe).await;
    app.state.fanout.dispatch(&mut bob_session, &subscribe).await;
    assert_matches!(ada_rx.try_recv(), Ok(ServerEvent::GroupChannelSubscribed(_)));
    assert_matches!(bob_rx.try_recv(), Ok(ServerEvent::GroupChannelSubscribed(_)));

    app.state
        .fanout
        .dispatch(
            &mut bob_session,
            &frame("send-group-message", json!({ "groupId": group_id, "from": bob.id, "content": "hi" })),
        )
        .await;

    let at_ada = assert_matches!(ada_rx.try_recv(), Ok(ServerEvent::GroupMessageDelivered(m)) => m);
    let at_bob = assert_matches!(bob_rx.try_recv(), Ok(ServerEvent::GroupMessageDelivered(m)) => m);
    assert_eq!(at_ada, at_bob);
    assert_eq!(at_ada.sender, bob.id);
    assert_eq!(at_ada.group, group_id);
    assert_matches!(cy_rx.try_recv(), Err(TryRecvError::Empty));

    let stored = app.state.store.group_messages(group_id).await.expect("messages");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].sender, bob.id);
    assert_eq!(stored[0].content, "hi");
}

#[tokio::test]
async fn test_friendship_required_when_configured() {
    let app = TestApp::with_config(test_config().require_friendship(true));
    let ada = register_user(&app.server, "Ada").await;
    let bob = register_user(&app.server, "Bob").await;
    let (mut ada_session, mut ada_rx) = app.connect(ada.id).await;
    let (_bob_session, mut bob_rx) = app.connect(bob.id).await;

    let send = frame("send-direct-message", json!({ "from": ada.id, "to": bob.id, "content": "hi" }));
    app.state.fanout.dispatch(&mut ada_session, &send).await;

    let rejection = assert_matches!(ada_rx.try_recv(), Ok(ServerEvent::Rejected(r)) => r);
    assert_eq!(rejection.reason, "not_friends");
    assert_matches!(bob_rx.try_recv(), Err(TryRecvError::Empty));

    authed(app.server.post(&format!("/api/connections/request/{}", bob.id)), &ada).await;
    authed(app.server.post(&format!("/api/connections/accept/{}", ada.id)), &bob).await;

    app.state.fanout.dispatch(&mut ada_session, &send).await;
    assert_matches!(bob_rx.try_recv(), Ok(ServerEvent::DirectMessageDelivered(_)));
}

#[tokio::test]
async fn test_group_broadcast_reaches_subscribed_members_only() {
    let app = TestApp::new();
    let ada = register_user(&app.server, "Ada").await;
    let bob = register_user(&app.server, "Bob").await;
    let eve = register_user(&app.server, "Eve").await;

    let group: Value = authed(app.server.post("/api/groups"), &ada)
        .json(&json!({ "name": "Rust" }))
        .await
        .json();
    let group_id = group["id"].as_str().expect("id").to_string();
    authed(app.server.post(&format!("/api/groups/{}/add-member/{}", group_id, bob.id)), &ada).await;

    let (mut ada_session, mut ada_rx) = app.connect(ada.id).await;
    let (mut bob_session, mut bob_rx) = app.connect(bob.id).await;
    let (mut eve_session, mut eve_rx) = app.connect(eve.id).await;

    let subscribe = frame("subscribe-group-channel", json!({ "groupId": group_id }));
    app.state.fanout.dispatch(&mut ada_session, &subscribe).await;
    app.state.fanout.dispatch(&mut bob_session, &subscribe).await;
    app.state.fanout.dispatch(&mut eve_session, &subscribe).await;
    assert_matches!(ada_rx.try_recv(), Ok(ServerEvent::GroupChannelSubscribed(_)));
    assert_matches!(bob_rx.try_recv(), Ok(ServerEvent::GroupChannelSubscribed(_)));
    let rejection = assert_matches!(eve_rx.try_recv(), Ok(ServerEvent::Rejected(r)) => r);
    assert_eq!(rejection.reason, "not_member");

    let post = frame(
        "send-group-message",
        json!({ "groupId": group_id, "from": bob.id, "content": "hello group" }),
    );
    app.state.fanout.dispatch(&mut bob_session, &post).await;

    let received = assert_matches!(ada_rx.try_recv(), Ok(ServerEvent::GroupMessageDelivered(m)) => m);
    assert_eq!(received.content, "hello group");
    assert_matches!(bob_rx.try_recv(), Ok(ServerEvent::GroupMessageDelivered(_)));
    assert_matches!(eve_rx.try_recv(), Err(TryRecvError::Empty));

    // Eve cannot post either
    let post = frame(
        "send-group-message",
        json!({ "groupId": group_id, "from": eve.id, "content": "let me in" }),
    );
    app.state.fanout.dispatch(&mut eve_session, &post).await;
    assert_matches!(eve_rx.try_recv(), Ok(ServerEvent::Rejected(_)));
    assert_matches!(ada_rx.try_recv(), Err(TryRecvError::Empty));
}

#[tokio::test]
async fn test_removed_member_stops_receiving() {
    let app = TestApp::new();
    let ada = register_user(&app.server, "Ada").await;
    let bob = register_user(&app.server, "Bob").await;

    let group: Value = authed(app.server.post("/api/groups"), &ada)
        .json(&json!({ "name": "Rust" }))
        .await
        .json();
    let group_id = group["id"].as_str().expect("id").to_string();
    authed(app.server.post(&format!("/api/groups/{}/add-member/{}", group_id, bob.id)), &ada).await;

    let (mut ada_session, mut ada_rx) = app.connect(ada.id).await;
    let (mut bob_session, mut bob_rx) = app.connect(bob.id).await;
    let subscribe = frame("subscribe-group-channel", json!({ "groupId": group_id }));
    app.state.fanout.dispatch(&mut ada_session, &subscribe).await;
    app.state.fanout.dispatch(&mut bob_session, &subscribe).await;
    ada_rx.try_recv().ok();
    bob_rx.try_recv().ok();

    authed(app.server.post(&format!("/api/groups/{}/remove-member/{}", group_id, bob.id)), &ada).await;

    let post = frame(
        "send-group-message",
        json!({ "groupId": group_id, "from": ada.id, "content": "after removal" }),
    );
    app.state.fanout.dispatch(&mut ada_session, &post).await;
    assert_matches!(ada_rx.try_recv(), Ok(ServerEvent::GroupMessageDelivered(_)));
    assert_matches!(bob_rx.try_recv(), Err(TryRecvError::Empty));
}

#[tokio::test]
async fn test_http_deletions_notify_live_connections() {
    let app = TestApp::new();
    let ada = register_user(&app.server, "Ada").await;
    let bob = register_user(&app.server, "Bob").await;
    let (mut ada_session, mut ada_rx) = app.connect(ada.id).await;
    let (_bob_session, mut bob_rx) = app.connect(bob.id).await;

    app.state
        .fanout
        .dispatch(
            &mut ada_session,
            &frame("send-direct-message", json!({ "from": ada.id, "to": bob.id, "content": "oops" })),
        )
        .await;
    let sent = assert_matches!(bob_rx.try_recv(), Ok(ServerEvent::DirectMessageDelivered(m)) => m);
    ada_rx.try_recv().ok();

    authed(app.server.delete(&format!("/api/messages/{}", sent.id)), &ada).await;

    let gone = assert_matches!(bob_rx.try_recv(), Ok(ServerEvent::MessageDeleted(d)) => d);
    assert_eq!(gone.id, sent.id);
    assert_eq!(gone.group, None);
    assert_matches!(ada_rx.try_recv(), Ok(ServerEvent::MessageDeleted(_)));
}

#[tokio::test]
async fn test_group_message_deletion_is_broadcast() {
    let app = TestApp::new();
    let ada = register_user(&app.server, "Ada").await;

    let group: Value = authed(app.server.post("/api/groups"), &ada)
        .json(&json!({ "name": "Rust" }))
        .await
        .json();
    let group_id = group["id"].as_str().expect("id").to_string();

    let (mut session, mut rx) = app.connect(ada.id).await;
    app.state
        .fanout
        .dispatch(&mut session, &frame("subscribe-group-channel", json!({ "groupId": group_id })))
        .await;
    app.state
        .fanout
        .dispatch(
            &mut session,
            &frame(
                "send-group-message",
                json!({ "groupId": group_id, "from": ada.id, "content": "soon gone" }),
            ),
        )
        .await;
    rx.try_recv().ok();
    let posted = assert_matches!(rx.try_recv(), Ok(ServerEvent::GroupMessageDelivered(m)) => m);

    authed(app.server.delete(&format!("/api/group-messages/{}", posted.id)), &ada).await;

    let gone = assert_matches!(rx.try_recv(), Ok(ServerEvent::MessageDeleted(d)) => d);
    assert_eq!(gone.id, posted.id);
    assert_eq!(gone.group.map(|g| g.to_string()), Some(group_id));
}

#[tokio::test]
async fn test_disconnect_marks_user_offline() {
    let app = TestApp::new();
    let ada = register_user(&app.server, "Ada").await;
    let bob = register_user(&app.server, "Bob").await;

    let (session, _rx) = app.connect(bob.id).await;
    let people: Vec<Value> = authed(app.server.get("/api/connections/people"), &ada).await.json();
    assert_eq!(people[0]["online"], true);

    app.state.fanout.disconnect(&session);
    let people: Vec<Value> = authed(app.server.get("/api/connections/people"), &ada).await.json();
    assert_eq!(people[0]["online"], false);
}
