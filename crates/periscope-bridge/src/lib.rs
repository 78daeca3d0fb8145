//! Bidirectional message bridge.
//!
//! The bridge owns everything between "a component changed" on one side
//! and "a typed event handler ran" on the other: an outbound queue with
//! adaptive batching, a correlation table for RPC-style traffic, a typed
//! subscription table for fire-and-forget events, and cooperative
//! pause/resume backpressure.
//!
//! # Architecture
//!
//! Everything here is a deterministic state machine isolated from I/O and
//! time. The transport is an injected [`Wall`] (send one message, poll one
//! message); the clock is an `Instant` passed into every method that needs
//! one. A driver loop — production host or test harness — calls
//! [`Bridge::tick`] to flush and [`Bridge::pump`] to dispatch, which keeps
//! the same code running identically in production and under the
//! simulated clock in tests.
//!
//! # Components
//!
//! - [`Bridge`]: queuing, batching, correlation, dispatch
//! - [`Wall`]: the minimal duplex transport contract
//! - [`Session`]: capability-handshake retry state machine

pub mod bridge;
pub mod error;
pub mod session;
pub mod wall;

pub use bridge::{Bridge, BridgeConfig, CallResult, SubscriptionId};
pub use error::BridgeError;
pub use session::{Session, SessionAction, SessionConfig, SessionState};
pub use wall::Wall;
