//! Intended effects returned by store mutators.
//!
//! The store never talks to a bridge directly. Mutators return
//! [`Command`]s; the driver lowers each into a bridge call (an event send
//! or an inspect request). Change notifications to the store's own
//! subscribers travel separately as [`Notice`]s.

use periscope_proto::message::events;
use periscope_proto::node::NodeId;
use periscope_proto::path::{Path, PathSeg};
use periscope_proto::value::Value;
use serde_json::Value as JsonValue;

/// An effect the driver should execute against the producer.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Announce the selection, or its absence.
    Select {
        /// Selected node, `None` for deselection.
        id: Option<NodeId>,
    },

    /// Ask the producer to visually highlight a node.
    Highlight {
        /// Node to highlight.
        id: NodeId,
    },

    /// Remove any producer-side highlight.
    HideHighlight,

    /// Request a one-level-deeper snapshot at a path inside a node.
    Inspect {
        /// Node whose snapshot to deepen.
        id: NodeId,
        /// Section-qualified path into the raw value.
        path: Path,
    },

    /// Write a value at a path inside a node's props.
    SetProp {
        /// Target node.
        id: NodeId,
        /// Path within the props snapshot.
        path: Path,
        /// Replacement value.
        value: JsonValue,
    },

    /// Write a value at a path inside a node's state.
    SetState {
        /// Target node.
        id: NodeId,
        /// Path within the state snapshot.
        path: Path,
        /// Replacement value.
        value: JsonValue,
    },

    /// Write a value at a path inside a node's context.
    SetContext {
        /// Target node.
        id: NodeId,
        /// Path within the context snapshot.
        path: Path,
        /// Replacement value.
        value: JsonValue,
    },
}

impl Command {
    /// Lower the command into an event name and payload.
    ///
    /// Returns `None` for [`Command::Inspect`], which is a correlated
    /// request-reply rather than a fire-and-forget event; the driver routes
    /// it through the bridge's inspect call instead.
    pub fn into_event(self) -> Option<(&'static str, Value)> {
        match self {
            Self::Select { id } => {
                let payload = match id {
                    Some(id) => Value::text(id.as_str()),
                    None => Value::Null,
                };
                Some((events::SELECTED, payload))
            },
            Self::Highlight { id } => Some((events::HIGHLIGHT, Value::text(id.as_str()))),
            Self::HideHighlight => Some((events::HIDE_HIGHLIGHT, Value::Null)),
            Self::Inspect { .. } => None,
            Self::SetProp { id, path, value } => {
                Some((events::SET_PROP, write_payload(&id, &path, &value)))
            },
            Self::SetState { id, path, value } => {
                Some((events::SET_STATE, write_payload(&id, &path, &value)))
            },
            Self::SetContext { id, path, value } => {
                Some((events::SET_CONTEXT, write_payload(&id, &path, &value)))
            },
        }
    }
}

fn write_payload(id: &NodeId, path: &Path, value: &JsonValue) -> Value {
    Value::map([
        ("id", Value::text(id.as_str())),
        ("path", path_value(path)),
        ("value", Value::from_json(value)),
    ])
}

/// Lower a path into the dynamic-value domain for transmission.
pub fn path_value(path: &Path) -> Value {
    Value::List(
        path.iter()
            .map(|seg| match seg {
                PathSeg::Key(key) => Value::text(key.clone()),
                #[allow(clippy::cast_possible_wrap)]
                PathSeg::Index(index) => Value::Int(*index as i64),
            })
            .collect(),
    )
}

/// A change notification to store subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// One node's record or UI state changed.
    Node(NodeId),
    /// The root list changed.
    Roots,
    /// The selection changed.
    Selection,
    /// The hovered node changed.
    Hover,
    /// The search needle or result list changed.
    Search,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn selection_events_carry_the_id_or_null() {
        let (evt, payload) = Command::Select { id: Some(NodeId::from("n1")) }.into_event().unwrap();
        assert_eq!(evt, events::SELECTED);
        assert_eq!(payload, Value::text("n1"));

        let (_, payload) = Command::Select { id: None }.into_event().unwrap();
        assert_eq!(payload, Value::Null);
    }

    #[test]
    fn write_commands_carry_id_path_and_value() {
        let cmd = Command::SetProp {
            id: NodeId::from("n1"),
            path: vec![PathSeg::key("style"), PathSeg::Index(0)],
            value: serde_json::json!("red"),
        };
        let (evt, payload) = cmd.into_event().unwrap();
        assert_eq!(evt, events::SET_PROP);
        assert_eq!(payload.get("id"), Some(&Value::text("n1")));
        assert_eq!(
            payload.get("path"),
            Some(&Value::List(vec![Value::text("style"), Value::Int(0)]))
        );
        assert_eq!(payload.get("value"), Some(&Value::text("red")));
    }

    #[test]
    fn inspect_is_not_an_event() {
        let cmd = Command::Inspect { id: NodeId::from("n1"), path: vec![PathSeg::key("props")] };
        assert!(cmd.into_event().is_none());
    }
}
