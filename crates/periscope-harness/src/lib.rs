//! Deterministic in-process test harness.
//!
//! Wires a producer bridge and a consumer bridge back to back over an
//! in-memory [`loopback`] wall, feeds the consumer's tree events into a
//! [`periscope_store::Store`], and drives the whole stack on a simulated
//! clock. No threads, no real time: tests own every tick.
//!
//! [`model::TreeModel`] is a naive reference implementation of the tree
//! semantics used by the property tests as an oracle.

pub mod clock;
pub mod loopback;
pub mod model;
pub mod world;

pub use clock::SimClock;
pub use loopback::{LoopbackWall, loopback_pair};
pub use model::TreeModel;
pub use world::World;
