//! Shared application state for the queue server.
//!
//! [`AppState`] owns the [`StateStore`] behind a mutex (the single writer)
//! and the [`BroadcastHub`]. It is created once per running service and
//! injected into handlers via Axum's `State` extractor; there is no
//! process-wide static state.

use axum::extract::ws::Utf8Bytes;
use tokio::sync::{Mutex, broadcast};
use tracing::warn;
use turnero_core::processor::{self, Outcome};
use turnero_core::{Command, StateStore};
use turnero_types::QueueState;

use crate::error::ObserverError;
use crate::hub::{BroadcastHub, encode_snapshot};

/// A freshly registered observer.
#[derive(Debug)]
pub struct Observer {
    /// Snapshot to send before anything else.
    pub initial: Utf8Bytes,
    /// Frames for every mutation committed after `initial` was taken.
    pub updates: broadcast::Receiver<Utf8Bytes>,
}

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`](std::sync::Arc) by the caller.
#[derive(Debug)]
pub struct AppState {
    store: Mutex<StateStore>,
    hub: BroadcastHub,
}

impl AppState {
    /// Wrap `store` and create a hub buffering `broadcast_capacity` frames.
    pub fn new(store: StateStore, broadcast_capacity: usize) -> Self {
        Self {
            store: Mutex::new(store),
            hub: BroadcastHub::new(broadcast_capacity),
        }
    }

    /// The snapshot fan-out.
    pub const fn hub(&self) -> &BroadcastHub {
        &self.hub
    }

    /// Register an observer.
    ///
    /// The subscription is taken while the store is locked, so no mutation
    /// can commit between the initial snapshot and the first update.
    ///
    /// # Errors
    ///
    /// Returns [`ObserverError::Serialization`] if the snapshot cannot be
    /// encoded.
    pub async fn connect(&self) -> Result<Observer, ObserverError> {
        let mut store = self.store.lock().await;
        let initial = encode_snapshot(store.snapshot())?;
        let updates = self.hub.subscribe();
        Ok(Observer { initial, updates })
    }

    /// Decode and apply one raw client message.
    ///
    /// When the operation is accepted the new snapshot is published to
    /// every observer before the store is unlocked.
    ///
    /// # Errors
    ///
    /// Returns [`ObserverError::Decode`] or [`ObserverError::Rejected`] when
    /// nothing changed, and [`ObserverError::Serialization`] if the
    /// mutation committed but its snapshot could not be encoded.
    pub async fn submit(&self, raw: &str) -> Result<Outcome, ObserverError> {
        let command = Command::decode(raw)?;

        let mut store = self.store.lock().await;
        let outcome = processor::apply(&mut store, command)?;
        if let Outcome::Applied(kind) = outcome {
            let frame = encode_snapshot(store.snapshot()).inspect_err(|e| {
                warn!(%kind, error = %e, "Failed to serialize snapshot, broadcast skipped");
            })?;
            self.hub.publish(frame);
        }
        Ok(outcome)
    }

    /// A copy of the current state, after any pending rollover.
    pub async fn snapshot(&self) -> QueueState {
        self.store.lock().await.snapshot().clone()
    }
}
