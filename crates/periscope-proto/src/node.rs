//! Node records.
//!
//! One [`NodeRecord`] mirrors one live component instance. The producer
//! shim emits a record per mount and update; the consumer store keeps the
//! latest merged record per id, together with UI-only state it owns itself
//! (collapse flags, render counters).
//!
//! # Protocol flow
//!
//! 1. The shim extracts `{id, nodeType, name, props, state, children,
//!    text}` from the live instance and hands it to the bridge as a
//!    dynamic value.
//! 2. The bridge dehydrates the record; `props`/`state`/`context` become
//!    JSON snapshots with placeholder stand-ins.
//! 3. The consumer bridge hydrates the payload and the store parses it
//!    back into a [`NodeRecord`].

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::errors::ProtocolError;
use crate::value::Value;

/// Opaque node identifier, stable for the node's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Build an id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Structural classification of a mirrored node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// Host-platform element (e.g. a DOM node).
    Native,
    /// User-defined composite component.
    Composite,
    /// Structural-only grouping node, transparent to navigation.
    Wrapper,
    /// Text leaf; carries `text`, never structural children.
    Text,
    /// Rendered-to-nothing node.
    Empty,
    /// Subtree rendered into a foreign container.
    Portal,
}

impl NodeType {
    /// Wire tag for this node type.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Composite => "composite",
            Self::Wrapper => "wrapper",
            Self::Text => "text",
            Self::Empty => "empty",
            Self::Portal => "portal",
        }
    }
}

/// The children slot of a node record.
///
/// Either an ordered list of child ids, a literal string ("this node's
/// only child is text"), or nothing. Mutually exclusive with `text` per
/// node-type semantics.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Children {
    /// Ordered child ids; every id must be live or about to mount within
    /// the same event batch.
    Ids(Vec<NodeId>),
    /// A single literal text child.
    Text(String),
    /// No children.
    #[default]
    None,
}

impl Children {
    /// The child id list, empty for text/none children.
    pub fn ids(&self) -> &[NodeId] {
        match self {
            Self::Ids(ids) => ids,
            _ => &[],
        }
    }
}

/// Which snapshot of a node a path addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    /// The `props` snapshot.
    Props,
    /// The `state` snapshot.
    State,
    /// The `context` snapshot.
    Context,
}

impl Section {
    /// Wire key for this section.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Props => "props",
            Self::State => "state",
            Self::Context => "context",
        }
    }
}

/// The mirrored representation of one live component instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    /// Stable opaque id.
    pub id: NodeId,
    /// Structural classification.
    pub node_type: NodeType,
    /// Display label, absent for anonymous nodes.
    #[serde(default)]
    pub name: Option<String>,
    /// Dehydrated props snapshot.
    #[serde(default)]
    pub props: Option<JsonValue>,
    /// Dehydrated state snapshot.
    #[serde(default)]
    pub state: Option<JsonValue>,
    /// Dehydrated context snapshot.
    #[serde(default)]
    pub context: Option<JsonValue>,
    /// Children slot.
    #[serde(default)]
    pub children: Children,
    /// Literal text for [`NodeType::Text`] nodes.
    #[serde(default)]
    pub text: Option<String>,
}

impl NodeRecord {
    /// A minimal record with everything but id and type left empty.
    pub fn new(id: impl Into<NodeId>, node_type: NodeType) -> Self {
        Self {
            id: id.into(),
            node_type,
            name: None,
            props: None,
            state: None,
            context: None,
            children: Children::None,
            text: None,
        }
    }

    /// Parse a record out of a hydrated event payload.
    pub fn from_event_value(data: &JsonValue) -> Result<Self, ProtocolError> {
        serde_json::from_value(data.clone()).map_err(ProtocolError::MalformedRecord)
    }

    /// Lower the record into the dynamic-value domain for sending.
    ///
    /// Snapshot fields re-enter as plain JSON; the bridge's dehydration
    /// pass applies the depth cap and placeholder substitution on top.
    pub fn to_value(&self) -> Value {
        let mut map = std::collections::BTreeMap::new();
        map.insert("id".to_string(), Value::text(self.id.as_str()));
        map.insert("nodeType".to_string(), Value::text(self.node_type.as_str()));
        if let Some(name) = &self.name {
            map.insert("name".to_string(), Value::text(name.clone()));
        }
        for (key, snapshot) in [
            ("props", &self.props),
            ("state", &self.state),
            ("context", &self.context),
        ] {
            if let Some(snapshot) = snapshot {
                map.insert(key.to_string(), Value::from_json(snapshot));
            }
        }
        match &self.children {
            Children::Ids(ids) => {
                map.insert(
                    "children".to_string(),
                    Value::List(ids.iter().map(|id| Value::text(id.as_str())).collect()),
                );
            },
            Children::Text(text) => {
                map.insert("children".to_string(), Value::text(text.clone()));
            },
            Children::None => {},
        }
        if let Some(text) = &self.text {
            map.insert("text".to_string(), Value::text(text.clone()));
        }
        Value::Map(map)
    }
}
