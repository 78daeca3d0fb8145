//! Wire format for the Periscope inspection protocol.
//!
//! Periscope mirrors a live tree of component nodes owned by a producer
//! context (a renderer) into an isolated consumer context (an inspection
//! UI). The two contexts share no memory, so everything crossing the
//! boundary is a plain, JSON-compatible record: typed messages, node
//! records, and dehydrated value snapshots with placeholder stand-ins for
//! anything that cannot travel.
//!
//! This crate defines those shapes and nothing else. The codec that
//! produces and consumes snapshots lives in `periscope-codec`; the
//! batching/correlating message layer lives in `periscope-bridge`.

pub mod errors;
pub mod message;
pub mod node;
pub mod path;
pub mod placeholder;
pub mod value;

pub use errors::ProtocolError;
pub use message::{EventEnvelope, Message, events};
pub use node::{Children, NodeId, NodeRecord, NodeType, Section};
pub use path::{Path, PathSeg, display_path};
pub use placeholder::PlaceholderKind;
pub use value::Value;
