//! Anchorcast Core - anchor relay hub and dynamic object mapping.
//!
//! This crate holds everything that coordinates AR clients: the connection
//! registry, the anchor store, the model catalog, the mapping engine and the
//! protocol dispatcher. It performs no network or disk I/O; transports feed
//! it text frames and drain per-connection outbound channels.

pub mod anchors;
pub mod catalog;
pub mod dispatcher;
pub mod errors;
pub mod hub;
pub mod mapping;
pub mod protocol;
pub mod registry;

pub use dispatcher::{DispatchOutcome, ProtocolDispatcher};
pub use hub::{HubSettings, HubStatus, RelayHub};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
