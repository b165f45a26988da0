/**
 * Router Configuration
 *
 * Assembles the API routes, the WebSocket endpoint and the health check into
 * one router, then applies the request tracing and CORS layers.
 *
 * # Routes
 *
 * - `/api/...` - JSON API (see `api_routes`)
 * - `GET /ws` - real-time channel
 * - `GET /health` - liveness plus the number of online users
 * - anything else - 404 with the standard error body
 */

use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::backend::error::BackendError;
use crate::backend::realtime::{ws_handler, ConnectionDirectory};
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = Router::new()
        .route("/health", get(health))
        .route("/ws", get(ws_handler));

    let router = configure_api_routes(router);

    router
        .fallback(|| async { BackendError::not_found("Route not found") })
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(app_state)
}

async fn health(State(directory): State<ConnectionDirectory>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "online": directory.online_count(),
    }))
}
