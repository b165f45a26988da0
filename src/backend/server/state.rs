/**
 * Application State Management
 *
 * `AppState` is the one container shared by every handler. It holds:
 *
 * - the `Store` (PostgreSQL or in-memory)
 * - the connection directory and group broadcast scope
 * - the fan-out engine built over those three
 * - the server configuration
 *
 * Everything is behind `Arc` (or is a cheap clone over one), so cloning the
 * state per request is cheap. `FromRef` impls let handlers extract only the
 * piece they need, e.g. `State<FanOut>` in the WebSocket handler.
 */

use std::sync::Arc;

use axum::extract::FromRef;

use crate::backend::realtime::{BroadcastScope, ConnectionDirectory, FanOut};
use crate::backend::server::config::ServerConfig;
use crate::backend::store::Store;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub directory: ConnectionDirectory,
    pub scope: BroadcastScope,
    pub fanout: FanOut,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Wire up the real-time components over `store`
    pub fn new(store: Arc<dyn Store>, config: ServerConfig) -> Self {
        let directory = ConnectionDirectory::new();
        let scope = BroadcastScope::new();
        let fanout = FanOut::new(
            store.clone(),
            directory.clone(),
            scope.clone(),
            config.fanout_policy(),
        );
        Self {
            store,
            directory,
            scope,
            fanout,
            config: Arc::new(config),
        }
    }
}

impl FromRef<AppState> for Arc<dyn Store> {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for FanOut {
    fn from_ref(state: &AppState) -> Self {
        state.fanout.clone()
    }
}

impl FromRef<AppState> for ConnectionDirectory {
    fn from_ref(state: &AppState) -> Self {
        state.directory.clone()
    }
}

impl FromRef<AppState> for Arc<ServerConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
