//! Inspection paths.
//!
//! A path is an ordered list of property-name tokens locating a value
//! inside a node's `props`/`state`/`context` snapshot. Paths are the
//! addressing scheme for on-demand deep expansion and for mutation
//! commands, so both ends must agree on them token for token.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One token of an inspection path.
///
/// Array positions are numeric indices, everything else addresses a map
/// key. The untagged representation keeps paths JSON-compatible:
/// `["props", "items", 0, "label"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSeg {
    /// Index into a sequence.
    Index(usize),
    /// Key into a mapping.
    Key(String),
}

impl PathSeg {
    /// Build a key segment from anything string-like.
    pub fn key(key: impl Into<String>) -> Self {
        Self::Key(key.into())
    }
}

impl fmt::Display for PathSeg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "[{i}]"),
            Self::Key(k) => write!(f, ".{k}"),
        }
    }
}

impl From<usize> for PathSeg {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for PathSeg {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

/// An ordered list of path segments, root first.
pub type Path = Vec<PathSeg>;

/// Render a path for diagnostics, e.g. `$.props.items[0].label`.
pub fn display_path(path: &[PathSeg]) -> String {
    let mut out = String::from("$");
    for seg in path {
        out.push_str(&seg.to_string());
    }
    out
}
