/**
 * Server Initialization
 *
 * Builds the application from a `ServerConfig`:
 *
 * 1. Open the store (`load_store`): PostgreSQL when `DATABASE_URL` is set,
 *    in-memory otherwise
 * 2. Create `AppState`, which wires the connection directory, broadcast
 *    scope and fan-out engine over the store
 * 3. Start the periodic prune of closed connections
 * 4. Create the router
 *
 * A store that cannot be opened is returned as an error; the binary turns
 * that into a non-zero exit.
 */

use std::time::Duration;

use axum::Router;

use crate::backend::realtime::ConnectionDirectory;
use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_store, ServerConfig};
use crate::backend::server::state::AppState;
use crate::backend::store::StoreError;

/// How often the directory drops entries whose socket has closed
pub const PRUNE_INTERVAL: Duration = Duration::from_secs(60);

/// Create and configure the Axum application
pub async fn create_app(config: ServerConfig) -> Result<Router<()>, StoreError> {
    tracing::info!("Initializing circle-chat backend server");

    let store = load_store(&config).await?;
    let state = AppState::new(store, config);
    tracing::info!(
        "[Realtime] Fan-out ready (require_friendship={}, connection_buffer={})",
        state.config.require_friendship,
        state.config.connection_buffer
    );

    spawn_prune_task(state.directory.clone(), PRUNE_INTERVAL);

    let app = create_router(state);
    tracing::info!("Router configured with periodic connection prune task");
    Ok(app)
}

/// Periodically remove directory entries whose socket has gone away
pub fn spawn_prune_task(directory: ConnectionDirectory, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            let pruned = directory.prune_closed();
            if pruned > 0 {
                tracing::debug!("[Realtime] Pruned {} closed connection(s)", pruned);
            }
        }
    })
}
