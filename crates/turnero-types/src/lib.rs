//! Shared type definitions for the Turnero queue service.
//!
//! This crate is the single source of truth for the shapes exchanged
//! between the server and every connected client. Types defined here flow
//! downstream to `TypeScript` via `ts-rs` for the client UI.
//!
//! # Modules
//!
//! - [`ids`] -- Opaque entry identifiers
//! - [`enums`] -- Operation kinds
//! - [`structs`] -- Queue entries, daily stats, and the full state snapshot

pub mod enums;
pub mod ids;
pub mod structs;

pub use enums::OperationKind;
pub use ids::EntryId;
pub use structs::{Entry, LastAction, QueueState, ServerMessage, Stats, NONE_SERVED};
