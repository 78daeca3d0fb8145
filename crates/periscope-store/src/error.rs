//! Store errors.

use periscope_codec::CodecError;
use periscope_proto::errors::ProtocolError;
use periscope_proto::node::NodeId;
use thiserror::Error;

/// Errors surfaced by store operations.
///
/// Tree-shape violations are producer bugs, not user errors; the store
/// reports them and keeps its own invariants intact rather than panicking.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An operation referenced a node the store does not hold.
    #[error("unknown node {id} in {operation}")]
    UnknownNode {
        /// The missing id.
        id: NodeId,
        /// The operation that referenced it.
        operation: &'static str,
    },

    /// A mount arrived for an id that is already live.
    #[error("node {id} mounted twice")]
    DoubleMount {
        /// The duplicated id.
        id: NodeId,
    },

    /// A snapshot merge failed.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// An event payload could not be parsed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
