//! Shared-state synchronization engine for the Turnero queue service.
//!
//! This crate owns the single authoritative queue and its daily stats. It
//! performs no I/O: the server crate feeds it decoded client messages and
//! broadcasts whatever snapshot it produces.
//!
//! # Modules
//!
//! - [`clock`] -- Wall clock abstraction and civil-calendar resolution
//! - [`names`] -- Display-name normalization
//! - [`store`] -- The [`StateStore`](store::StateStore) and daily rollover
//! - [`operation`] -- Decoding inbound messages into typed operations
//! - [`processor`] -- Validating and applying operations to the store
//! - [`config`] -- YAML configuration with environment overrides

pub mod clock;
pub mod config;
pub mod names;
pub mod operation;
pub mod processor;
pub mod store;

pub use clock::{CivilCalendar, Clock, ManualClock, SystemClock};
pub use operation::{Command, DecodeError, Operation};
pub use processor::{Outcome, Rejection};
pub use store::StateStore;
