//! In-process wall pair.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use periscope_bridge::{BridgeError, Wall};
use periscope_proto::message::Message;

type Queue = Rc<RefCell<VecDeque<Message>>>;

/// One end of a bidirectional in-memory wall.
///
/// Every message crosses a JSON round trip on send, so anything a real
/// wire would reject fails here too instead of sneaking through as a
/// shared in-memory object.
pub struct LoopbackWall {
    outbound: Queue,
    inbound: Queue,
}

/// Build a connected pair of walls.
#[must_use]
pub fn loopback_pair() -> (LoopbackWall, LoopbackWall) {
    let a_to_b: Queue = Rc::default();
    let b_to_a: Queue = Rc::default();
    (
        LoopbackWall { outbound: Rc::clone(&a_to_b), inbound: Rc::clone(&b_to_a) },
        LoopbackWall { outbound: b_to_a, inbound: a_to_b },
    )
}

impl Wall for LoopbackWall {
    fn send(&mut self, message: Message) -> Result<(), BridgeError> {
        let wire = serde_json::to_string(&message)
            .map_err(|err| BridgeError::Wall { reason: err.to_string() })?;
        let message = serde_json::from_str(&wire)
            .map_err(|err| BridgeError::Wall { reason: err.to_string() })?;
        self.outbound.borrow_mut().push_back(message);
        Ok(())
    }

    fn try_recv(&mut self) -> Option<Message> {
        self.inbound.borrow_mut().pop_front()
    }
}
