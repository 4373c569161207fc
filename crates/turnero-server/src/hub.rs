//! Fan-out of encoded snapshots to every connected observer.
//!
//! Each accepted mutation is serialized once into a text frame and sent
//! through a [`broadcast`] channel; every observer task holds a receiver
//! and forwards frames to its socket. Frames are cheap to clone, so the
//! per-observer cost is a reference count bump.
//!
//! If an observer falls behind by more than the channel capacity it gets
//! [`broadcast::error::RecvError::Lagged`] and skips to the newest frame.
//! Since every frame is a full snapshot, skipping loses nothing.

use axum::extract::ws::Utf8Bytes;
use tokio::sync::broadcast;
use turnero_types::{QueueState, ServerMessage};

/// Broadcast channel of pre-encoded `STATE` frames.
#[derive(Debug, Clone)]
pub struct BroadcastHub {
    tx: broadcast::Sender<Utf8Bytes>,
}

impl BroadcastHub {
    /// Create a hub that buffers up to `capacity` frames per observer.
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Register a new observer.
    pub fn subscribe(&self) -> broadcast::Receiver<Utf8Bytes> {
        self.tx.subscribe()
    }

    /// Deliver `frame` to every registered observer.
    ///
    /// Returns the number of observers that will receive it. Returns 0 if
    /// nobody is connected (this is not an error).
    pub fn publish(&self, frame: Utf8Bytes) -> usize {
        // send returns Err only when there are zero receivers.
        self.tx.send(frame).unwrap_or(0)
    }

    /// Number of currently registered observers.
    pub fn observer_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Encode a snapshot as the `{"type":"STATE","payload":...}` frame.
///
/// # Errors
///
/// Returns the serializer error if encoding fails.
pub fn encode_snapshot(state: &QueueState) -> Result<Utf8Bytes, serde_json::Error> {
    let json = serde_json::to_string(&ServerMessage::State(state.clone()))?;
    Ok(json.into())
}
