//! Consumer-side mirror of the inspected component tree.
//!
//! The [`Store`] holds the latest record per live node plus the UI state
//! layered on top: roots, parent index, selection, hover, collapse flags,
//! and the live search. Like the rest of the workspace it is sans-IO:
//! mutators return [`Command`]s for a driver to lower into bridge calls,
//! and local views subscribe to [`Notice`]s.
//!
//! Keyboard movement lives in [`navigation`]: a pure arrow-key resolver
//! plus the store-side grounding that makes wrapper nodes transparent and
//! search results navigable as a flat list.

pub mod command;
pub mod error;
pub mod navigation;
pub mod store;

pub use command::{Command, Notice};
pub use error::StoreError;
pub use navigation::{Destination, Direction, resolve_destination};
pub use store::{Node, Store, SubscriberId};
