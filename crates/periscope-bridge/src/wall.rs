//! Transport abstraction.
//!
//! The bridge never talks to a socket, message port, or iframe directly;
//! it talks to a [`Wall`]. Anything that can move one plain-data
//! [`Message`] at a time in each direction satisfies the contract, so
//! host-specific wiring (extension messaging, JSON-framed sockets,
//! in-process queues) plugs in without touching bridge or store.

use periscope_proto::message::Message;

use crate::error::BridgeError;

/// Minimal duplex transport: send one message, poll one message.
///
/// The contract guarantees message-level ordering in each direction;
/// application-event ordering across the session depends on it. Delivery
/// is best effort — a wall that drops a message produces a pending
/// callback that never resolves, never a crash.
pub trait Wall {
    /// Transmit one message to the peer.
    fn send(&mut self, message: Message) -> Result<(), BridgeError>;

    /// Poll one inbound message, if any has arrived.
    fn try_recv(&mut self) -> Option<Message>;
}
