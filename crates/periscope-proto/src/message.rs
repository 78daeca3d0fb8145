//! Protocol messages.
//!
//! Everything crossing the wall is one [`Message`]. Fire-and-forget events
//! travel singly or batched; RPC-style traffic (`inspect`, `call`) is
//! matched to its reply by a per-bridge correlation id; `pause`/`resume`
//! carry no payload and only adjust the peer's flush cadence.
//!
//! Payloads are JSON-compatible plain data by contract, so any transport
//! that can move such records (in-process queues, sockets with JSON or
//! CBOR framing, message ports) can carry them unchanged.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::node::NodeId;
use crate::path::Path;

/// Well-known event names.
pub mod events {
    /// A node was mounted (payload: node record).
    pub const MOUNT: &str = "mount";
    /// A node was updated (payload: node record).
    pub const UPDATE: &str = "update";
    /// A node was unmounted (payload: node id).
    pub const UNMOUNT: &str = "unmount";
    /// A new root was registered (payload: node id).
    pub const ROOT: &str = "root";
    /// The consumer changed its inspection target (payload: node id or null).
    pub const SELECTED: &str = "selected";
    /// Ask the producer to highlight a node (payload: node id).
    pub const HIGHLIGHT: &str = "highlight";
    /// Ask the producer to clear any highlight (payload: null).
    pub const HIDE_HIGHLIGHT: &str = "hide-highlight";
    /// Mutate a prop at a path (payload: `{id, path, value}`).
    pub const SET_PROP: &str = "set-prop";
    /// Mutate state at a path (payload: `{id, path, value}`).
    pub const SET_STATE: &str = "set-state";
    /// Mutate context at a path (payload: `{id, path, value}`).
    pub const SET_CONTEXT: &str = "set-context";
    /// Capability-handshake probe (payload: null).
    pub const PROBE: &str = "probe";
    /// Capability-handshake reply (payload: capability map).
    pub const CAPABILITIES: &str = "capabilities";
}

/// One fire-and-forget event: name, dehydrated payload, and the paths the
/// codec cleaned while dehydrating it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Event name, one of [`events`] or an application-defined name.
    pub evt: String,
    /// Dehydrated payload.
    pub data: JsonValue,
    /// Paths inside `data` where placeholders were substituted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cleaned: Vec<Path>,
}

impl EventEnvelope {
    /// Build an envelope with no cleaned paths.
    pub fn plain(evt: impl Into<String>, data: JsonValue) -> Self {
        Self { evt: evt.into(), data, cleaned: Vec::new() }
    }
}

/// A wire message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Message {
    /// Single fire-and-forget event.
    Event(EventEnvelope),

    /// Batched delivery; relative order inside the batch is preserved.
    ManyEvents {
        /// The batched events, oldest first.
        events: Vec<EventEnvelope>,
    },

    /// Request one more dehydration level at `path` inside node `id`.
    Inspect {
        /// Target node.
        id: NodeId,
        /// Path inside the node's cached raw value, section key first.
        path: Path,
        /// Correlation id the reply must echo.
        callback: u64,
    },

    /// RPC invocation of a named remote handler.
    Call {
        /// Handler name.
        name: String,
        /// Plain-data arguments.
        args: Vec<JsonValue>,
        /// Correlation id the reply must echo.
        callback: u64,
    },

    /// Reply to either `inspect` or `call`, matched by correlation id.
    Callback {
        /// Echoed correlation id.
        id: u64,
        /// Result values; by convention the dehydrated result is first.
        #[serde(default)]
        args: Vec<JsonValue>,
        /// Cleaned paths for the first result value.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        cleaned: Vec<Path>,
        /// Optional dehydrated prototype snapshot.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        proto: Option<JsonValue>,
        /// Cleaned paths for the prototype snapshot.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        proto_cleaned: Vec<Path>,
        /// Set when the remote handler failed; `args` is empty then.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    /// Ask the peer to coalesce sends more aggressively.
    Pause,

    /// Ask the peer to flush promptly again.
    Resume,
}

impl Message {
    /// A success callback carrying one dehydrated result.
    pub fn callback_ok(id: u64, data: JsonValue, cleaned: Vec<Path>) -> Self {
        Self::Callback { id, args: vec![data], cleaned, proto: None, proto_cleaned: Vec::new(), error: None }
    }

    /// An error callback; the pending entry on the caller side still
    /// resolves, carrying the failure.
    pub fn callback_err(id: u64, error: impl Into<String>) -> Self {
        Self::Callback {
            id,
            args: Vec::new(),
            cleaned: Vec::new(),
            proto: None,
            proto_cleaned: Vec::new(),
            error: Some(error.into()),
        }
    }
}
