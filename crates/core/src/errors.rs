//! Core error types for the anchor relay.
//!
//! None of these are fatal to the hub. Per-connection problems are reported
//! back to the transport, which logs them and keeps the connection open.

use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the relay core.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Malformed message: {0}")]
    Malformed(#[from] MessageError),

    #[error("Invalid catalog seed: {0}")]
    InvalidCatalog(String),
}

/// Reasons an inbound frame is rejected before any state is touched.
#[derive(Error, Debug)]
pub enum MessageError {
    #[error("frame is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("frame is not a JSON object")]
    NotAnObject,

    #[error("frame has no string `type` field")]
    MissingType,

    #[error("`{kind}` payload is invalid: {source}")]
    InvalidPayload {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
