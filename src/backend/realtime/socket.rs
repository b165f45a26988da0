/**
 * WebSocket Transport
 *
 * `GET /ws` upgrades to a WebSocket carrying JSON text frames. The upgrade
 * needs the same JWT as the HTTP API, either as `?token=<jwt>` (browsers
 * cannot set headers on a WebSocket) or as an `Authorization: Bearer` header.
 * The socket may only announce the identity that token belongs to.
 *
 * Each socket is split in two:
 *
 * - a writer task draining the connection's bounded queue into the socket
 * - the reader loop below, which hands frames to the fan-out engine one at a
 *   time, so events from one connection are processed in arrival order
 *
 * When either side ends, the session is released from the directory and
 * every broadcast scope.
 */

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    http::HeaderMap,
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;

use super::fanout::{FanOut, Session};
use crate::backend::error::BackendError;
use crate::backend::middleware::{authenticate, bearer_token};
use crate::backend::server::state::AppState;
use crate::shared::messaging::UserId;

/// Query string accepted on `/ws`
#[derive(Debug, Default, Deserialize)]
pub struct SocketAuth {
    pub token: Option<String>,
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(auth): Query<SocketAuth>,
    headers: HeaderMap,
    State(state): State<AppState>,
) -> Result<Response, BackendError> {
    let token = auth
        .token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .or_else(|| bearer_token(&headers))
        .ok_or_else(|| {
            tracing::warn!("[Realtime] Upgrade without a token");
            BackendError::unauthorized("No token, authorization denied")
        })?;
    let user = authenticate(&state, token).await?;

    let fanout = state.fanout.clone();
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, fanout, user.user_id)))
}

async fn handle_socket(socket: WebSocket, fanout: FanOut, principal: UserId) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (handle, mut rx) = fanout.open_connection();
    let connection_id = handle.id();
    let mut session = Session::new(handle, principal);

    tracing::info!("[Realtime] Connection {} opened for {}", connection_id, principal);

    let mut send_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let text = match event.to_json() {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!("[Realtime] Failed to encode event: {}", e);
                    continue;
                }
            };
            if ws_tx.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    loop {
        tokio::select! {
            frame = ws_rx.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        fanout.dispatch(&mut session, text.as_str()).await;
                    }
                    Some(Ok(Message::Binary(data))) => match std::str::from_utf8(&data) {
                        Ok(text) => fanout.dispatch(&mut session, text).await,
                        Err(_) => tracing::debug!("[Realtime] Ignoring non UTF-8 binary frame on {}", connection_id),
                    },
                    Some(Ok(Message::Close(_))) | None => break,
                    // axum answers pings itself
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::warn!("[Realtime] WebSocket error on {}: {}", connection_id, e);
                        break;
                    }
                }
            }
            _ = &mut send_task => break,
        }
    }

    fanout.disconnect(&session);
    send_task.abort();
    tracing::info!("[Realtime] Connection {} closed", connection_id);
}
