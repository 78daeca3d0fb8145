//! Lossy-but-faithful structural codec.
//!
//! Component state may be arbitrarily large, cyclic through foreign
//! instances, or plain non-serializable (functions, host handles). The
//! codec never tries to round-trip such values; it snapshots them:
//!
//! - [`dehydrate`] walks a dynamic value to a bounded depth and emits a
//!   JSON-compatible image, replacing every opaque value and every subtree
//!   beyond the cap with a small placeholder map. Each substitution path
//!   is appended to a caller-supplied accumulator.
//! - [`hydrate`] is the receiving-side mirror: it revisits exactly the
//!   recorded paths and stamps the placeholder records there with
//!   `inspected: false`, so the UI can render a one-line preview and
//!   request a deeper snapshot on demand.
//! - [`merge_inspection`] applies such a deeper snapshot in place,
//!   flipping the marker to `inspected: true`.
//!
//! The functions are pure; all state lives in caller-supplied
//! accumulators, matching the sans-IO discipline of the rest of the
//! workspace.

pub mod dehydrate;
pub mod error;
pub mod hydrate;

pub use dehydrate::{DehydrateConfig, dehydrate, dehydrate_inspection, dehydrate_root};
pub use error::CodecError;
pub use hydrate::{hydrate, merge_inspection, walk_path, walk_path_mut, walk_value};
