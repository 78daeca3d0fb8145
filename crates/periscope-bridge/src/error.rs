//! Bridge error types.

use thiserror::Error;

use crate::session::SessionState;

/// Errors raised by the bridge and session layer.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// A second RPC handler was registered under an already-taken name.
    /// This is a programming error in the caller, not a runtime fault.
    #[error("call handler `{name}` is already registered")]
    HandlerAlreadyRegistered {
        /// The contested handler name.
        name: String,
    },

    /// The transport refused or lost the connection.
    #[error("wall transport failed: {reason}")]
    Wall {
        /// Transport-specific description.
        reason: String,
    },

    /// A session operation was invoked in a state that does not allow it.
    #[error("invalid session operation `{operation}` in state {state:?}")]
    InvalidSessionState {
        /// State the session was in.
        state: SessionState,
        /// The refused operation.
        operation: &'static str,
    },
}
