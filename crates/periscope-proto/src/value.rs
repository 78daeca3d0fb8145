//! Producer-side dynamic values.
//!
//! The renderer shim hands the bridge arbitrarily shaped data: plain maps
//! and lists, but also functions, symbols, dates, byte buffers, and
//! instances of foreign constructors. [`Value`] is the normalized in-memory
//! form of that data before dehydration. It is never sent raw; the codec
//! turns it into a JSON-compatible snapshot plus placeholder paths.

use std::collections::BTreeMap;

use serde_json::Value as JsonValue;

/// A dynamic value as observed inside the producer context.
///
/// The first eight variants are "plain data" and survive dehydration
/// unchanged (up to string truncation and depth capping). The remaining
/// variants are opaque: the codec replaces them with placeholders because
/// they cannot cross the context boundary by value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent / null.
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer number.
    Int(i64),
    /// Floating-point number.
    Float(f64),
    /// String.
    Text(String),
    /// Ordered sequence.
    List(Vec<Value>),
    /// Plain mapping built by the default constructor.
    Map(BTreeMap<String, Value>),
    /// Raw byte buffer (typed array).
    Bytes(Vec<u8>),
    /// Calendar timestamp, milliseconds since the Unix epoch.
    Date {
        /// Milliseconds since the Unix epoch.
        epoch_ms: i64,
    },
    /// A function; only its display name travels.
    Function {
        /// Display name of the function, possibly empty for anonymous ones.
        name: String,
    },
    /// A symbol; only its rendered form travels.
    Symbol {
        /// `toString()`-style rendering of the symbol.
        name: String,
    },
    /// A lazy iterator; never enumerated by the codec.
    Iterator {
        /// Display name of the iterator's source, if known.
        name: String,
    },
    /// An object built from a non-default constructor.
    ///
    /// This is the main opacity boundary: foreign instances are never
    /// serialized field-by-field at their own level, only previewed by
    /// class name and expanded on demand.
    Foreign {
        /// Constructor / class name.
        class: String,
        /// Observable fields, available to on-demand re-inspection.
        fields: BTreeMap<String, Value>,
    },
}

impl Value {
    /// Build a [`Value::Map`] from key/value pairs.
    pub fn map<K: Into<String>>(pairs: impl IntoIterator<Item = (K, Value)>) -> Self {
        Self::Map(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Build a [`Value::Text`] from anything string-like.
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Lift plain JSON back into the dynamic-value domain.
    ///
    /// Used for values that originate on the consumer side (user-entered
    /// mutation payloads) where no opaque variants can occur.
    pub fn from_json(json: &JsonValue) -> Self {
        match json {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(b) => Self::Bool(*b),
            JsonValue::Number(n) => n
                .as_i64()
                .map_or_else(|| Self::Float(n.as_f64().unwrap_or(f64::NAN)), Self::Int),
            JsonValue::String(s) => Self::Text(s.clone()),
            JsonValue::Array(items) => Self::List(items.iter().map(Self::from_json).collect()),
            JsonValue::Object(fields) => Self::Map(
                fields.iter().map(|(k, v)| (k.clone(), Self::from_json(v))).collect(),
            ),
        }
    }

    /// The map entry under `key`, for [`Value::Map`] and the fields of
    /// [`Value::Foreign`].
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Map(fields) | Self::Foreign { fields, .. } => fields.get(key),
            _ => None,
        }
    }

    /// The sequence element at `index`, for [`Value::List`].
    pub fn at(&self, index: usize) -> Option<&Value> {
        match self {
            Self::List(items) => items.get(index),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_json_round_trips_plain_shapes() {
        let json = serde_json::json!({
            "name": "root",
            "count": 3,
            "ratio": 0.5,
            "tags": ["a", "b"],
            "nested": { "on": true, "missing": null }
        });

        let value = Value::from_json(&json);
        assert_eq!(value.get("count"), Some(&Value::Int(3)));
        assert_eq!(value.get("ratio"), Some(&Value::Float(0.5)));
        assert_eq!(
            value.get("tags").and_then(|t| t.at(1)),
            Some(&Value::text("b"))
        );
        assert_eq!(
            value.get("nested").and_then(|n| n.get("missing")),
            Some(&Value::Null)
        );
    }

    #[test]
    fn get_reaches_foreign_fields() {
        let foreign = Value::Foreign {
            class: "Vector2".into(),
            fields: [("x".to_string(), Value::Int(1))].into_iter().collect(),
        };
        assert_eq!(foreign.get("x"), Some(&Value::Int(1)));
        assert_eq!(foreign.get("y"), None);
    }
}
