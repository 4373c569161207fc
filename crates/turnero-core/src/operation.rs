//! Decoding inbound client messages into typed operations.
//!
//! Clients send `{"type": <kind>, "payload": {...}}` text frames. Decoding
//! happens in two steps: the envelope is parsed first, then the payload is
//! interpreted according to the [`OperationKind`]. The result is a closed
//! [`Operation`] enum, so dispatch in the processor is an exhaustive match
//! and an unrecognized type is an explicit [`DecodeError::UnknownType`].

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use turnero_types::{EntryId, OperationKind};

/// Errors that can occur while decoding an inbound message.
///
/// None of these reach the wire: the connection layer logs and drops them.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The frame is not valid JSON or not an object envelope.
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The envelope has no string `type`.
    #[error("message has no operation type")]
    MissingType,

    /// The `type` is not a supported operation.
    #[error("unknown operation type: {0}")]
    UnknownType(String),

    /// The payload does not fit the operation's shape.
    #[error("invalid {kind} payload: {source}")]
    InvalidPayload {
        /// The operation whose payload was rejected.
        kind: OperationKind,
        /// The underlying deserialization error.
        source: serde_json::Error,
    },
}

/// A decoded operation with its typed payload.
///
/// Names are carried raw; normalization and validation belong to the
/// processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Append one entry.
    Enqueue {
        /// Raw name, `None` when absent or not a string.
        name: Option<String>,
    },
    /// Append several entries in order.
    BulkAdd {
        /// Raw names; non-string items are already dropped.
        names: Vec<String>,
    },
    /// Serve the head entry.
    Dequeue,
    /// Read-only request.
    Peek,
    /// Empty the queue.
    ClearQueue,
    /// Start over with a fresh state.
    ResetAll,
    /// Swap an entry with the one `dir` positions away.
    Move {
        /// Entry to move.
        id: EntryId,
        /// Signed offset, canonically -1 or +1.
        dir: i64,
    },
    /// Rename an entry.
    Edit {
        /// Entry to rename.
        id: EntryId,
        /// Raw new name.
        name: Option<String>,
    },
    /// Remove an entry.
    Delete {
        /// Entry to remove.
        id: EntryId,
    },
    /// Replace queue and stats wholesale.
    ImportState(StateImport),
}

impl Operation {
    /// The kind recorded in `lastAction` when this operation is accepted.
    pub const fn kind(&self) -> OperationKind {
        match self {
            Self::Enqueue { .. } => OperationKind::Enqueue,
            Self::BulkAdd { .. } => OperationKind::BulkAdd,
            Self::Dequeue => OperationKind::Dequeue,
            Self::Peek => OperationKind::Peek,
            Self::ClearQueue => OperationKind::ClearQueue,
            Self::ResetAll => OperationKind::ResetAll,
            Self::Move { .. } => OperationKind::Move,
            Self::Edit { .. } => OperationKind::Edit,
            Self::Delete { .. } => OperationKind::Delete,
            Self::ImportState(_) => OperationKind::ImportState,
        }
    }
}

/// An exported snapshot submitted through `IMPORT_STATE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateImport {
    /// Entries in queue order, before normalization.
    pub queue: Vec<ImportedEntry>,
    /// Stats fields that could be read; anything unusable is `None`.
    pub stats: ImportedStats,
}

/// One entry of an imported queue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportedEntry {
    /// Id to keep, if the export carried a usable one.
    pub id: Option<EntryId>,
    /// Raw name, `None` when absent or not a string.
    pub name: Option<String>,
    /// Original creation time, when it is an RFC 3339 timestamp.
    pub created_at: Option<DateTime<Utc>>,
}

/// Stats fields of an imported snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportedStats {
    /// Served count, when it is a non-negative integer.
    pub served_today: Option<u64>,
    /// Raw last-served name, when it is a string.
    pub last_served: Option<String>,
    /// The civil date the export was taken on, as written.
    pub day: Option<String>,
}

/// An operation together with the caller that submitted it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// What to do.
    pub operation: Operation,
    /// Caller-supplied `clientId`, empty when absent.
    pub client_id: String,
}

impl Command {
    /// Decode one inbound text frame.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] describing why the frame was unusable.
    pub fn decode(raw: &str) -> Result<Self, DecodeError> {
        let envelope: Envelope = serde_json::from_str(raw)?;
        let kind_name = match envelope.kind {
            Some(Value::String(s)) => s,
            _ => return Err(DecodeError::MissingType),
        };
        let kind: OperationKind = kind_name
            .parse()
            .map_err(|_unknown| DecodeError::UnknownType(kind_name.clone()))?;

        let payload = match envelope.payload {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };
        let client_id = client_id_of(&payload);
        let operation = decode_operation(kind, payload)
            .map_err(|source| DecodeError::InvalidPayload { kind, source })?;

        Ok(Self {
            operation,
            client_id,
        })
    }
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type", default)]
    kind: Option<Value>,
    #[serde(default)]
    payload: Option<Value>,
}

#[derive(Deserialize)]
struct NamePayload {
    #[serde(default)]
    name: Option<Value>,
}

#[derive(Deserialize)]
struct BulkPayload {
    #[serde(default)]
    names: Option<Value>,
}

#[derive(Deserialize)]
struct IdPayload {
    #[serde(default)]
    id: Option<Value>,
}

#[derive(Deserialize)]
struct MovePayload {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    dir: Option<Value>,
}

#[derive(Deserialize)]
struct EditPayload {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    name: Option<Value>,
}

#[derive(Deserialize)]
struct ImportPayload {
    data: ImportData,
}

#[derive(Deserialize)]
struct ImportData {
    queue: Vec<Value>,
    #[serde(default)]
    stats: Option<Value>,
}

fn decode_operation(
    kind: OperationKind,
    payload: Map<String, Value>,
) -> Result<Operation, serde_json::Error> {
    let payload = Value::Object(payload);
    let operation = match kind {
        OperationKind::Enqueue => {
            let p: NamePayload = serde_json::from_value(payload)?;
            Operation::Enqueue {
                name: string_of(p.name),
            }
        }
        OperationKind::BulkAdd => {
            let p: BulkPayload = serde_json::from_value(payload)?;
            let names = match p.names {
                Some(Value::Array(items)) => items
                    .into_iter()
                    .filter_map(|v| string_of(Some(v)))
                    .collect(),
                _ => Vec::new(),
            };
            Operation::BulkAdd { names }
        }
        OperationKind::Dequeue => Operation::Dequeue,
        OperationKind::Peek => Operation::Peek,
        OperationKind::ClearQueue => Operation::ClearQueue,
        OperationKind::ResetAll => Operation::ResetAll,
        OperationKind::Move => {
            let p: MovePayload = serde_json::from_value(payload)?;
            let dir = p
                .dir
                .as_ref()
                .and_then(direction_of)
                .ok_or_else(|| invalid("dir must be an integer offset"))?;
            Operation::Move {
                id: id_of(p.id).unwrap_or_default(),
                dir,
            }
        }
        OperationKind::Edit => {
            let p: EditPayload = serde_json::from_value(payload)?;
            Operation::Edit {
                id: id_of(p.id).unwrap_or_default(),
                name: string_of(p.name),
            }
        }
        OperationKind::Delete => {
            let p: IdPayload = serde_json::from_value(payload)?;
            Operation::Delete {
                id: id_of(p.id).unwrap_or_default(),
            }
        }
        OperationKind::ImportState => {
            let p: ImportPayload = serde_json::from_value(payload)?;
            Operation::ImportState(p.data.try_into()?)
        }
    };
    Ok(operation)
}

impl TryFrom<ImportData> for StateImport {
    type Error = serde_json::Error;

    fn try_from(data: ImportData) -> Result<Self, Self::Error> {
        let queue = data
            .queue
            .into_iter()
            .map(imported_entry)
            .collect::<Result<Vec<_>, _>>()?;

        let stats = match data.stats {
            Some(Value::Object(map)) => ImportedStats {
                served_today: map.get("atendidosHoy").and_then(Value::as_u64),
                last_served: map.get("ultimoAtendido").and_then(Value::as_str).map(str::to_owned),
                day: map.get("diaISO").and_then(Value::as_str).map(str::to_owned),
            },
            _ => ImportedStats::default(),
        };

        Ok(Self { queue, stats })
    }
}

/// Objects are read field by field; a `null` entry spoils the whole import,
/// while any other scalar is an entry without a name and gets filtered.
fn imported_entry(value: Value) -> Result<ImportedEntry, serde_json::Error> {
    match value {
        Value::Object(mut map) => Ok(ImportedEntry {
            id: id_of(map.remove("id")),
            name: string_of(map.remove("name")),
            created_at: map.get("createdAt").and_then(timestamp_of),
        }),
        Value::Null => Err(invalid("queue entries must not be null")),
        _ => Ok(ImportedEntry::default()),
    }
}

fn timestamp_of(value: &Value) -> Option<DateTime<Utc>> {
    let raw = value.as_str()?;
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Accepts integers, integral floats, and strings holding either.
fn direction_of(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(integral))
        }
        _ => None,
    }
}

/// `1.0` displays as `1`, so only whole values that fit in an `i64` parse back.
fn integral(value: f64) -> Option<i64> {
    value.to_string().parse().ok()
}

fn invalid(reason: &str) -> serde_json::Error {
    <serde_json::Error as serde::de::Error>::custom(reason)
}

fn string_of(value: Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}

/// Ids are opaque: strings are taken as-is, numbers are stringified, and
/// empty or other values count as absent.
fn id_of(value: Option<Value>) -> Option<EntryId> {
    let id = match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => return None,
    };
    if id.is_empty() { None } else { Some(EntryId(id)) }
}

fn client_id_of(payload: &Map<String, Value>) -> String {
    match payload.get("clientId") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    fn decode(raw: &str) -> Command {
        Command::decode(raw).unwrap()
    }

    #[test]
    fn enqueue_carries_raw_name_and_client_id() {
        let cmd = decode(r#"{"type":"ENQUEUE","payload":{"name":"  Ana ","clientId":"tab-1"}}"#);
        assert_eq!(
            cmd.operation,
            Operation::Enqueue {
                name: Some(String::from("  Ana "))
            }
        );
        assert_eq!(cmd.client_id, "tab-1");
    }

    #[test]
    fn missing_payload_is_an_empty_object() {
        let cmd = decode(r#"{"type":"DEQUEUE"}"#);
        assert_eq!(cmd.operation, Operation::Dequeue);
        assert_eq!(cmd.client_id, "");

        let cmd = decode(r#"{"type":"CLEAR_QUEUE","payload":null}"#);
        assert_eq!(cmd.operation, Operation::ClearQueue);
    }

    #[test]
    fn numeric_client_id_is_stringified() {
        let cmd = decode(r#"{"type":"PEEK","payload":{"clientId":42}}"#);
        assert_eq!(cmd.client_id, "42");
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(matches!(
            Command::decode("{not json"),
            Err(DecodeError::Malformed(_))
        ));
        assert!(Command::decode("\"ENQUEUE\"").is_err());
    }

    #[test]
    fn missing_or_unknown_type_is_rejected() {
        assert!(matches!(
            Command::decode(r#"{"payload":{}}"#),
            Err(DecodeError::MissingType)
        ));
        assert!(matches!(
            Command::decode(r#"{"type":7}"#),
            Err(DecodeError::MissingType)
        ));
        match Command::decode(r#"{"type":"SHUFFLE"}"#) {
            Err(DecodeError::UnknownType(t)) => assert_eq!(t, "SHUFFLE"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn bulk_add_drops_non_string_names() {
        let cmd = decode(r#"{"type":"BULK_ADD","payload":{"names":["Ana",3,null,"Bob"]}}"#);
        assert_eq!(
            cmd.operation,
            Operation::BulkAdd {
                names: vec![String::from("Ana"), String::from("Bob")]
            }
        );

        let cmd = decode(r#"{"type":"BULK_ADD","payload":{"names":"Ana"}}"#);
        assert_eq!(cmd.operation, Operation::BulkAdd { names: Vec::new() });
    }

    #[test]
    fn move_accepts_integral_directions() {
        let cmd = decode(r#"{"type":"MOVE","payload":{"id":"e1","dir":-1}}"#);
        assert_eq!(
            cmd.operation,
            Operation::Move {
                id: EntryId::from("e1"),
                dir: -1
            }
        );

        assert!(matches!(
            Command::decode(r#"{"type":"MOVE","payload":{"id":"e1"}}"#),
            Err(DecodeError::InvalidPayload {
                kind: OperationKind::Move,
                ..
            })
        ));
        for raw in [
            r#"{"type":"MOVE","payload":{"id":"e1","dir":"up"}}"#,
            r#"{"type":"MOVE","payload":{"id":"e1","dir":1.5}}"#,
            r#"{"type":"MOVE","payload":{"id":"e1","dir":null}}"#,
            r#"{"type":"MOVE","payload":{"id":"e1","dir":""}}"#,
        ] {
            assert!(Command::decode(raw).is_err(), "{raw}");
        }

        for raw in [
            r#"{"type":"MOVE","payload":{"id":"e1","dir":"1"}}"#,
            r#"{"type":"MOVE","payload":{"id":"e1","dir":1.0}}"#,
            r#"{"type":"MOVE","payload":{"id":"e1","dir":" 1 "}}"#,
            r#"{"type":"MOVE","payload":{"id":"e1","dir":"1.0"}}"#,
        ] {
            assert_eq!(
                decode(raw).operation,
                Operation::Move {
                    id: EntryId::from("e1"),
                    dir: 1
                },
                "{raw}"
            );
        }
    }

    #[test]
    fn missing_id_decodes_to_an_id_that_matches_nothing() {
        let cmd = decode(r#"{"type":"DELETE","payload":{}}"#);
        assert_eq!(cmd.operation, Operation::Delete { id: EntryId::default() });
    }

    #[test]
    fn import_reads_queue_and_lenient_stats() {
        let cmd = decode(
            r#"{"type":"IMPORT_STATE","payload":{"data":{
                "queue":[{"id":"x1","name":"Ana","createdAt":"2025-01-02T10:00:00Z"},{"name":5},{"id":9}],
                "stats":{"atendidosHoy":4,"ultimoAtendido":"Bob","diaISO":"2025-01-02"}
            }}}"#,
        );
        let Operation::ImportState(import) = cmd.operation else {
            panic!("expected import");
        };
        assert_eq!(import.queue.len(), 3);
        assert_eq!(import.queue.first().unwrap().id, Some(EntryId::from("x1")));
        assert!(import.queue.first().unwrap().created_at.is_some());
        assert_eq!(import.queue.get(1).unwrap().name, None);
        assert_eq!(import.queue.get(2).unwrap().id, Some(EntryId::from("9")));
        assert_eq!(import.stats.served_today, Some(4));
        assert_eq!(import.stats.last_served.as_deref(), Some("Bob"));
        assert_eq!(import.stats.day.as_deref(), Some("2025-01-02"));
    }

    #[test]
    fn import_with_odd_stats_keeps_the_queue() {
        let cmd = decode(
            r#"{"type":"IMPORT_STATE","payload":{"data":{"queue":[],"stats":{"atendidosHoy":-2,"ultimoAtendido":1}}}}"#,
        );
        let Operation::ImportState(import) = cmd.operation else {
            panic!("expected import");
        };
        assert_eq!(import.stats, ImportedStats::default());
    }

    #[test]
    fn import_without_queue_list_is_rejected() {
        for raw in [
            r#"{"type":"IMPORT_STATE","payload":{}}"#,
            r#"{"type":"IMPORT_STATE","payload":{"data":{}}}"#,
            r#"{"type":"IMPORT_STATE","payload":{"data":{"queue":"Ana"}}}"#,
            r#"{"type":"IMPORT_STATE","payload":{"data":{"queue":[null]}}}"#,
            r#"{"type":"IMPORT_STATE","payload":{"data":{"queue":[{"name":"Ana"},null]}}}"#,
        ] {
            assert!(
                matches!(
                    Command::decode(raw),
                    Err(DecodeError::InvalidPayload {
                        kind: OperationKind::ImportState,
                        ..
                    })
                ),
                "{raw}"
            );
        }
    }

    #[test]
    fn import_tolerates_odd_timestamps_and_scalar_entries() {
        let cmd = decode(
            r#"{"type":"IMPORT_STATE","payload":{"data":{"queue":[
                {"name":"Ana","createdAt":1700000000000},
                {"name":"Bob","createdAt":"2025-01-02"},
                {"name":"Cata","createdAt":"yesterday"},
                "Dani",
                7
            ]}}}"#,
        );
        let Operation::ImportState(import) = cmd.operation else {
            panic!("expected import");
        };
        assert_eq!(import.queue.len(), 5);
        assert!(import.queue.iter().all(|e| e.created_at.is_none()));
        assert_eq!(import.queue.first().unwrap().name.as_deref(), Some("Ana"));
        assert_eq!(import.queue.get(3).unwrap(), &ImportedEntry::default());
        assert_eq!(import.queue.get(4).unwrap(), &ImportedEntry::default());
    }
}
