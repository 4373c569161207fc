//! Queue server for Turnero.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws`) where each observer submits
//!   operations and receives a full state snapshot after every accepted
//!   mutation, fanned out via [`tokio::sync::broadcast`]
//! - **REST endpoints** for reading the current state, submitting an
//!   operation with an explicit answer, and health checks
//! - **Static assets** for the client UI, served from a directory
//!
//! # Architecture
//!
//! One [`StateStore`](turnero_core::StateStore) lives behind a mutex in
//! [`AppState`]. Every operation, from any socket or HTTP request, takes
//! that lock, is applied, and (if accepted) has its snapshot encoded and
//! published to the [`BroadcastHub`] before the lock is released. Frames
//! therefore reach observers in commit order, and a new observer's first
//! frame is always the state just before the next broadcast it will see.
//! Delivery to each socket runs on that socket's own task, so a slow
//! client only ever delays itself.
//!
//! [`BroadcastHub`]: hub::BroadcastHub

pub mod error;
pub mod handlers;
pub mod hub;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use router::build_router;
pub use server::{ServerError, start_server};
pub use state::{AppState, Observer};
