//! Receiving-side reconstruction and path navigation.

use periscope_proto::path::{Path, PathSeg, display_path};
use periscope_proto::placeholder;
use periscope_proto::value::Value;
use serde_json::Value as JsonValue;

use crate::error::CodecError;

/// Navigate a JSON snapshot along `path`.
pub fn walk_path<'a>(root: &'a JsonValue, path: &[PathSeg]) -> Option<&'a JsonValue> {
    let mut cursor = root;
    for seg in path {
        cursor = match seg {
            PathSeg::Key(key) => cursor.get(key.as_str())?,
            PathSeg::Index(index) => cursor.get(index)?,
        };
    }
    Some(cursor)
}

/// Navigate a JSON snapshot along `path`, mutably.
pub fn walk_path_mut<'a>(root: &'a mut JsonValue, path: &[PathSeg]) -> Option<&'a mut JsonValue> {
    let mut cursor = root;
    for seg in path {
        cursor = match seg {
            PathSeg::Key(key) => cursor.get_mut(key.as_str())?,
            PathSeg::Index(index) => cursor.get_mut(index)?,
        };
    }
    Some(cursor)
}

/// Navigate a raw dynamic value along `path`.
///
/// Used by the producer side to serve re-inspection requests against its
/// cached raw values; keys reach into both plain maps and the fields of
/// foreign instances.
pub fn walk_value<'a>(root: &'a Value, path: &[PathSeg]) -> Option<&'a Value> {
    let mut cursor = root;
    for seg in path {
        cursor = match seg {
            PathSeg::Key(key) => cursor.get(key)?,
            PathSeg::Index(index) => cursor.at(*index)?,
        };
    }
    Some(cursor)
}

/// Reconstruct placeholder records inside a freshly received snapshot.
///
/// Visits exactly the paths the sender recorded and stamps the
/// placeholder-shaped record there with `inspected: false`. Must mirror
/// the sender so indices line up; a path that fails to resolve means the
/// two sides have diverged.
pub fn hydrate(root: &mut JsonValue, cleaned: &[Path]) -> Result<(), CodecError> {
    for path in cleaned {
        let target = walk_path_mut(root, path)
            .ok_or_else(|| CodecError::PathUnresolvable { path: display_path(path) })?;
        if placeholder::kind_of(target).is_none() {
            return Err(CodecError::NotAPlaceholder { path: display_path(path) });
        }
        placeholder::set_inspected(target, false);
    }
    Ok(())
}

/// Merge a one-level-deeper re-inspection result into an existing
/// snapshot at `path`, flipping the expansion marker to `inspected: true`.
///
/// `fresh` is the raw reply payload; its own nested placeholders are
/// hydrated (and remain expandable) before the merge.
pub fn merge_inspection(
    snapshot: &mut JsonValue,
    path: &[PathSeg],
    mut fresh: JsonValue,
    fresh_cleaned: &[Path],
) -> Result<(), CodecError> {
    hydrate(&mut fresh, fresh_cleaned)?;
    // Non-object replacements carry no marker; the replacement itself is
    // the expansion.
    placeholder::set_inspected(&mut fresh, true);
    let target = walk_path_mut(snapshot, path)
        .ok_or_else(|| CodecError::PathUnresolvable { path: display_path(path) })?;
    *target = fresh;
    Ok(())
}
