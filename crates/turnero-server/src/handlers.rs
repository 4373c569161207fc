//! REST endpoint handlers for the queue server.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/state` | Current queue, stats, and last action |
//! | `POST` | `/api/operations` | Submit one operation and get an explicit answer |
//! | `GET` | `/health` | Liveness plus connected observer count |

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use turnero_core::Outcome;

use crate::error::ObserverError;
use crate::state::AppState;

/// Response body for `GET /health`.
#[derive(Debug, serde::Serialize)]
struct HealthResponse {
    /// Always `"ok"` while the server is serving.
    status: &'static str,
    /// Open `WebSocket` observers.
    observers: usize,
}

/// Response body for an accepted `POST /api/operations`.
#[derive(Debug, serde::Serialize)]
struct OperationResponse {
    /// Whether the operation was valid.
    ok: bool,
    /// Kind of the applied mutation, `null` for read-only operations.
    applied: Option<turnero_types::OperationKind>,
}

// ---------------------------------------------------------------------------
// GET /api/state
// ---------------------------------------------------------------------------

/// Return the current state snapshot (the `payload` of a `STATE` frame).
pub async fn get_state(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.snapshot().await)
}

// ---------------------------------------------------------------------------
// POST /api/operations
// ---------------------------------------------------------------------------

/// Apply an operation envelope sent over HTTP.
///
/// The body is the same `{"type": ..., "payload": {...}}` message a
/// `WebSocket` client would send. Accepted mutations are broadcast to every
/// observer just as if they arrived over a socket.
pub async fn submit_operation(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<impl IntoResponse, ObserverError> {
    let outcome = state.submit(&body).await?;
    let applied = match outcome {
        Outcome::Applied(kind) => Some(kind),
        Outcome::Unchanged => None,
    };
    Ok(Json(OperationResponse { ok: true, applied }))
}

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

/// Liveness check.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        observers: state.hub().observer_count(),
    })
}
