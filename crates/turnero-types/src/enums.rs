//! Enumeration types for the queue protocol.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// The kind of operation a client can submit.
///
/// Serialized in `SCREAMING_SNAKE_CASE` (`ENQUEUE`, `BULK_ADD`, ...), which
/// is also the `type` field of an inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum OperationKind {
    /// Append one named entry to the tail.
    Enqueue,
    /// Append several named entries to the tail, in order.
    BulkAdd,
    /// Serve the head entry.
    Dequeue,
    /// Read-only request; never mutates.
    Peek,
    /// Empty the queue, keeping stats.
    ClearQueue,
    /// Replace the whole state with a fresh one.
    ResetAll,
    /// Swap an entry with its neighbour.
    Move,
    /// Rename an entry.
    Edit,
    /// Remove an entry from any position.
    Delete,
    /// Replace queue and stats from an exported snapshot.
    ImportState,
}

impl OperationKind {
    /// Every supported kind, in protocol order.
    pub const ALL: [Self; 10] = [
        Self::Enqueue,
        Self::BulkAdd,
        Self::Dequeue,
        Self::Peek,
        Self::ClearQueue,
        Self::ResetAll,
        Self::Move,
        Self::Edit,
        Self::Delete,
        Self::ImportState,
    ];

    /// The wire name of this kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Enqueue => "ENQUEUE",
            Self::BulkAdd => "BULK_ADD",
            Self::Dequeue => "DEQUEUE",
            Self::Peek => "PEEK",
            Self::ClearQueue => "CLEAR_QUEUE",
            Self::ResetAll => "RESET_ALL",
            Self::Move => "MOVE",
            Self::Edit => "EDIT",
            Self::Delete => "DELETE",
            Self::ImportState => "IMPORT_STATE",
        }
    }
}

impl core::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a supported operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOperation(pub String);

impl core::fmt::Display for UnknownOperation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "unknown operation type: {}", self.0)
    }
}

impl std::error::Error for UnknownOperation {}

impl FromStr for OperationKind {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownOperation(s.to_owned()))
    }
}
