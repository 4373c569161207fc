//! Axum router construction for the queue server.
//!
//! Assembles all routes (REST + `WebSocket` + static assets) into a single
//! [`Router`] with CORS middleware enabled for cross-origin clients.

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the queue server.
///
/// The router includes:
/// - `GET /ws` -- `WebSocket` observer session
/// - `GET /api/state` -- current snapshot
/// - `POST /api/operations` -- submit one operation over HTTP
/// - `GET /health` -- liveness
/// - everything else -- files from `static_dir` (the client UI)
///
/// CORS is configured to allow any origin, matching a kiosk-style UI
/// that may be opened from another host on the LAN.
pub fn build_router(state: Arc<AppState>, static_dir: &Path) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_queue))
        // REST API
        .route("/api/state", get(handlers::get_state))
        .route("/api/operations", post(handlers::submit_operation))
        .route("/health", get(handlers::health))
        // Client UI
        .fallback_service(ServeDir::new(static_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
