//! Queue entries, daily stats, and the full state snapshot.
//!
//! Field names on the wire are fixed by the client UI (`createdAt`,
//! `atendidosHoy`, `ultimoAtendido`, `diaISO`, `lastAction`), so every
//! struct carries explicit serde renames while the Rust side keeps
//! descriptive names.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::OperationKind;
use crate::ids::EntryId;

/// Placeholder for [`Stats::last_served`] before anyone has been served.
pub const NONE_SERVED: &str = "—";

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

/// One named item waiting in the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Entry {
    /// Server-minted (or imported) identifier, immutable.
    pub id: EntryId,
    /// Normalized display name, never empty.
    pub name: String,
    /// When the entry joined the queue.
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Daily service statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Stats {
    /// Entries served on [`Stats::day`].
    #[serde(rename = "atendidosHoy")]
    pub served_today: u64,
    /// Name of the most recently served entry, or [`NONE_SERVED`].
    #[serde(rename = "ultimoAtendido")]
    pub last_served: String,
    /// Civil date (`YYYY-MM-DD`) the counter belongs to.
    #[serde(rename = "diaISO")]
    pub day: NaiveDate,
}

impl Stats {
    /// Zeroed stats for `day`.
    pub fn fresh(day: NaiveDate) -> Self {
        Self {
            served_today: 0,
            last_served: NONE_SERVED.to_owned(),
            day,
        }
    }
}

// ---------------------------------------------------------------------------
// LastAction
// ---------------------------------------------------------------------------

/// Audit record of the most recently accepted mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LastAction {
    /// Which operation was applied.
    #[serde(rename = "type")]
    pub kind: OperationKind,
    /// Caller-supplied client id (unauthenticated, may be empty).
    pub by: String,
    /// Server time of the mutation, as Unix epoch milliseconds.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[ts(type = "number")]
    pub ts: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// QueueState
// ---------------------------------------------------------------------------

/// The complete shared state: the unit broadcast to every observer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct QueueState {
    /// Waiting entries, front first.
    pub queue: Vec<Entry>,
    /// Daily statistics.
    pub stats: Stats,
    /// Most recent accepted mutation, `null` until the first one.
    #[serde(rename = "lastAction")]
    pub last_action: Option<LastAction>,
}

impl QueueState {
    /// An empty queue with zeroed stats dated `day`.
    pub fn fresh(day: NaiveDate) -> Self {
        Self {
            queue: Vec::new(),
            stats: Stats::fresh(day),
            last_action: None,
        }
    }
}

// ---------------------------------------------------------------------------
// ServerMessage
// ---------------------------------------------------------------------------

/// Frames pushed from the server to observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload")]
#[ts(export, export_to = "bindings/")]
pub enum ServerMessage {
    /// Full state snapshot.
    #[serde(rename = "STATE")]
    State(QueueState),
}
