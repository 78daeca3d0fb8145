//! Placeholder records.
//!
//! A placeholder is a small tagged map standing in for a value the codec
//! chose not to inline: an opaque value (function, symbol, foreign
//! instance) or a subtree beyond the depth cap. On the wire it is a plain
//! JSON object `{type, name?, meta?}`; the cleaned-path list attached to
//! each message tells the receiver which objects are placeholders, and
//! hydration stamps them with `inspected: false` so the UI knows a deeper
//! snapshot can still be requested.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Key holding the placeholder kind tag.
pub const KIND_KEY: &str = "type";
/// Key holding the display name.
pub const NAME_KEY: &str = "name";
/// Key holding preview metadata (length, timestamp, ...).
pub const META_KEY: &str = "meta";
/// Key holding the receiver-side expansion marker.
pub const INSPECTED_KEY: &str = "inspected";
/// Reserved key a hydrated prototype snapshot is merged under.
pub const PROTO_KEY: &str = "__proto__";

/// The kind of value a placeholder stands in for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderKind {
    /// A function value.
    Function,
    /// A foreign-constructed object, or a map beyond the depth cap.
    Object,
    /// A sequence beyond the depth cap.
    Array,
    /// A raw byte buffer.
    TypedArray,
    /// A symbol.
    Symbol,
    /// A lazy iterator.
    Iterator,
    /// A calendar timestamp.
    Date,
}

impl PlaceholderKind {
    /// Wire tag for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::Object => "object",
            Self::Array => "array",
            Self::TypedArray => "typed_array",
            Self::Symbol => "symbol",
            Self::Iterator => "iterator",
            Self::Date => "date",
        }
    }

    /// Parse a wire tag.
    pub fn from_str(tag: &str) -> Option<Self> {
        match tag {
            "function" => Some(Self::Function),
            "object" => Some(Self::Object),
            "array" => Some(Self::Array),
            "typed_array" => Some(Self::TypedArray),
            "symbol" => Some(Self::Symbol),
            "iterator" => Some(Self::Iterator),
            "date" => Some(Self::Date),
            _ => None,
        }
    }
}

/// Build the transmissible placeholder map.
///
/// Carries enough metadata for a one-line preview without further round
/// trips; `name` and `meta` are omitted when absent rather than sent null.
pub fn make(kind: PlaceholderKind, name: Option<&str>, meta: Option<JsonValue>) -> JsonValue {
    let mut map = Map::new();
    map.insert(KIND_KEY.to_string(), JsonValue::String(kind.as_str().to_string()));
    if let Some(name) = name {
        map.insert(NAME_KEY.to_string(), JsonValue::String(name.to_string()));
    }
    if let Some(meta) = meta {
        map.insert(META_KEY.to_string(), meta);
    }
    JsonValue::Object(map)
}

/// The placeholder kind of `value`, if it is placeholder-shaped.
pub fn kind_of(value: &JsonValue) -> Option<PlaceholderKind> {
    value
        .as_object()
        .and_then(|map| map.get(KIND_KEY))
        .and_then(JsonValue::as_str)
        .and_then(PlaceholderKind::from_str)
}

/// Stamp the expansion marker onto a placeholder-shaped map.
///
/// Returns `false` when `value` is not an object and cannot carry the
/// marker.
pub fn set_inspected(value: &mut JsonValue, inspected: bool) -> bool {
    match value.as_object_mut() {
        Some(map) => {
            map.insert(INSPECTED_KEY.to_string(), JsonValue::Bool(inspected));
            true
        },
        None => false,
    }
}

/// The expansion marker of a hydrated placeholder, if present.
pub fn is_inspected(value: &JsonValue) -> Option<bool> {
    value.as_object().and_then(|map| map.get(INSPECTED_KEY)).and_then(JsonValue::as_bool)
}
