//! Sender-side snapshotting.

use periscope_proto::path::{Path, PathSeg};
use periscope_proto::placeholder::{self, PlaceholderKind};
use periscope_proto::value::Value;
use serde_json::{Map, Value as JsonValue, json};

/// Tuning knobs for dehydration.
#[derive(Debug, Clone)]
pub struct DehydrateConfig {
    /// Container nesting depth beyond which whole subtrees become
    /// placeholders. Bounds message size on deeply nested state.
    pub depth_limit: usize,
    /// Strings longer than this many characters are truncated with a
    /// trailing ellipsis. Lossy and intentional: previews, not round trips.
    pub string_limit: usize,
}

impl Default for DehydrateConfig {
    fn default() -> Self {
        Self { depth_limit: 2, string_limit: 500 }
    }
}

/// Dehydrate a root value, collecting cleaned paths.
pub fn dehydrate_root(value: &Value, config: &DehydrateConfig) -> (JsonValue, Vec<Path>) {
    let mut cleaned = Vec::new();
    let mut path = Path::new();
    let data = dehydrate(value, &mut cleaned, &mut path, 0, config);
    (data, cleaned)
}

/// Dehydrate `value` at `depth`, appending the current path to `cleaned`
/// for every placeholder substituted.
///
/// Primitives pass through; plain lists and maps recurse and are never
/// wrapped at their own level unless `depth` exceeds the cap; everything
/// opaque becomes a placeholder carrying preview metadata.
pub fn dehydrate(
    value: &Value,
    cleaned: &mut Vec<Path>,
    path: &mut Path,
    depth: usize,
    config: &DehydrateConfig,
) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => json!(b),
        Value::Int(i) => json!(i),
        Value::Float(f) => {
            // JSON has no non-finite numbers; keep a readable preview.
            serde_json::Number::from_f64(*f)
                .map_or_else(|| json!(f.to_string()), JsonValue::Number)
        },
        Value::Text(s) => json!(truncate(s, config.string_limit)),
        Value::Function { name } => {
            cleaned.push(path.clone());
            placeholder::make(PlaceholderKind::Function, Some(name), None)
        },
        Value::Symbol { name } => {
            cleaned.push(path.clone());
            placeholder::make(PlaceholderKind::Symbol, Some(name), None)
        },
        Value::Iterator { name } => {
            cleaned.push(path.clone());
            placeholder::make(PlaceholderKind::Iterator, Some(name), None)
        },
        Value::Date { epoch_ms } => {
            cleaned.push(path.clone());
            placeholder::make(PlaceholderKind::Date, None, Some(json!({"timestamp": epoch_ms})))
        },
        Value::Bytes(bytes) => {
            cleaned.push(path.clone());
            placeholder::make(
                PlaceholderKind::TypedArray,
                None,
                Some(json!({"length": bytes.len()})),
            )
        },
        Value::Foreign { class, .. } => {
            // The opacity boundary: foreign instances are previewed by
            // class name, never serialized field-by-field at this level.
            cleaned.push(path.clone());
            placeholder::make(PlaceholderKind::Object, Some(class), None)
        },
        Value::List(items) => {
            if depth > config.depth_limit {
                cleaned.push(path.clone());
                return placeholder::make(
                    PlaceholderKind::Array,
                    None,
                    Some(json!({"length": items.len()})),
                );
            }
            let mut out = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                path.push(PathSeg::Index(index));
                out.push(dehydrate(item, cleaned, path, depth + 1, config));
                path.pop();
            }
            JsonValue::Array(out)
        },
        Value::Map(fields) => {
            if depth > config.depth_limit {
                cleaned.push(path.clone());
                return placeholder::make(
                    PlaceholderKind::Object,
                    Some("Object"),
                    Some(json!({"size": fields.len()})),
                );
            }
            let mut out = Map::new();
            for (key, item) in fields {
                path.push(PathSeg::key(key.clone()));
                out.insert(key.clone(), dehydrate(item, cleaned, path, depth + 1, config));
                path.pop();
            }
            JsonValue::Object(out)
        },
    }
}

/// Dehydrate a value in answer to a re-inspection request.
///
/// The depth budget restarts at the requested path, which is what makes
/// "expand more" work without ever transmitting the whole subtree. A
/// foreign instance additionally reveals its fields one level — the whole
/// point of asking — instead of collapsing back into the same placeholder.
pub fn dehydrate_inspection(value: &Value, config: &DehydrateConfig) -> (JsonValue, Vec<Path>) {
    match value {
        Value::Foreign { fields, .. } => {
            let as_map = Value::Map(fields.clone());
            dehydrate_root(&as_map, config)
        },
        other => dehydrate_root(other, config),
    }
}

fn truncate(s: &str, limit: usize) -> String {
    if s.chars().count() <= limit {
        return s.to_string();
    }
    let mut out: String = s.chars().take(limit).collect();
    out.push('…');
    out
}
