//! Opaque identifiers for queue entries.
//!
//! Ids are plain strings on the wire because imported snapshots may carry
//! ids minted by other tools. Fresh ids are UUID v7 (time-ordered), which
//! keeps them unique for the life of the process.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Unique identifier for an entry in the queue.
///
/// The default (empty) id never matches a queued entry.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub struct EntryId(pub String);

impl EntryId {
    /// Mint a new identifier using UUID v7.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for EntryId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for EntryId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for EntryId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_distinct() {
        let a = EntryId::generate();
        let b = EntryId::generate();
        assert_ne!(a, b);
        assert!(!a.as_str().is_empty());
    }

    #[test]
    fn serializes_as_bare_string() {
        let id = EntryId::from("abc-123");
        let json = serde_json::to_string(&id).ok();
        assert_eq!(json.as_deref(), Some("\"abc-123\""));
    }
}
