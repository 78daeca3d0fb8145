//! Codec error types.

use thiserror::Error;

/// Errors raised while hydrating or merging snapshots.
///
/// Dehydration itself cannot fail: values it refuses to serialize are
/// handled by design via placeholders, not errors.
#[derive(Debug, Error)]
pub enum CodecError {
    /// A recorded path does not resolve inside the snapshot it was
    /// recorded against. Sender and receiver have diverged.
    #[error("path {path} does not resolve in snapshot")]
    PathUnresolvable {
        /// Rendered form of the offending path.
        path: String,
    },

    /// The value at a cleaned path is not placeholder-shaped.
    #[error("value at {path} is not a placeholder record")]
    NotAPlaceholder {
        /// Rendered form of the offending path.
        path: String,
    },
}
