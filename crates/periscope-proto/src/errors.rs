//! Protocol error types.

use thiserror::Error;

/// Errors raised while interpreting wire payloads.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// An event payload could not be parsed into a node record.
    #[error("malformed node record: {0}")]
    MalformedRecord(#[source] serde_json::Error),
}
