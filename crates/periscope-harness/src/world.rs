//! Fully wired producer/consumer pair around a loopback wall.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;
use std::time::Duration;

use periscope_bridge::{Bridge, BridgeConfig, BridgeError};
use periscope_proto::message::events;
use periscope_proto::node::{NodeId, NodeRecord, Section};
use periscope_proto::path::{Path, PathSeg, display_path};
use periscope_proto::value::Value;
use periscope_store::{Command, Store, StoreError};
use tracing::warn;

use crate::clock::SimClock;
use crate::loopback::{LoopbackWall, loopback_pair};

/// Rounds of tick/pump a [`World::settle`] call is willing to spend.
const MAX_SETTLE_ROUNDS: usize = 64;

/// One complete inspection stack: a producer bridge, a consumer bridge,
/// and a store fed by the consumer's tree-event subscriptions, all driven
/// by a simulated clock.
///
/// Tree events flow producer to consumer and land in the store; store
/// commands flow back through [`World::execute`]. Store errors raised
/// inside subscription handlers are collected rather than dropped so tests
/// can assert on protocol violations.
pub struct World {
    clock: SimClock,
    producer: Bridge<LoopbackWall>,
    consumer: Bridge<LoopbackWall>,
    store: Rc<RefCell<Store>>,
    errors: Rc<RefCell<Vec<StoreError>>>,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// A world with default bridge configs on both ends.
    #[must_use]
    pub fn new() -> Self {
        Self::with_configs(BridgeConfig::default(), BridgeConfig::default())
    }

    /// A world with explicit per-end bridge configs.
    #[must_use]
    pub fn with_configs(producer_config: BridgeConfig, consumer_config: BridgeConfig) -> Self {
        let (producer_wall, consumer_wall) = loopback_pair();
        let producer = Bridge::new(producer_wall, producer_config);
        let mut consumer = Bridge::new(consumer_wall, consumer_config);

        let store = Rc::new(RefCell::new(Store::new()));
        let errors = Rc::new(RefCell::new(Vec::new()));
        for evt in [events::MOUNT, events::UPDATE, events::UNMOUNT, events::ROOT] {
            let store = Rc::clone(&store);
            let errors = Rc::clone(&errors);
            consumer.on(evt, move |data| {
                if let Err(err) = store.borrow_mut().apply_event(evt, data) {
                    errors.borrow_mut().push(err);
                }
            });
        }

        Self { clock: SimClock::new(), producer, consumer, store, errors }
    }

    /// Current simulated time.
    #[must_use]
    pub fn now(&self) -> std::time::Instant {
        self.clock.now()
    }

    /// Move simulated time forward.
    pub fn advance(&mut self, by: Duration) {
        self.clock.advance(by);
    }

    // ------------------------------------------------------------------
    // Producer-side traffic

    /// Queue a raw producer event.
    pub fn emit(&mut self, evt: &str, data: &Value) {
        let now = self.clock.now();
        self.producer.send(now, evt, data);
    }

    /// Queue a mount for `record`.
    pub fn mount(&mut self, record: &NodeRecord) {
        self.emit(events::MOUNT, &record.to_value());
    }

    /// Queue an update for `record`.
    pub fn update(&mut self, record: &NodeRecord) {
        self.emit(events::UPDATE, &record.to_value());
    }

    /// Queue an unmount for `id`.
    pub fn unmount(&mut self, id: &NodeId) {
        self.emit(events::UNMOUNT, &Value::text(id.as_str()));
    }

    // ------------------------------------------------------------------
    // Driving

    /// One scheduling round at the current time: flush both buffers, then
    /// drain both inboxes.
    ///
    /// # Errors
    /// Propagates wall failures.
    pub fn tick(&mut self) -> Result<(), BridgeError> {
        let now = self.clock.now();
        self.producer.tick(now)?;
        self.consumer.tick(now)?;
        self.producer.pump(now)?;
        self.consumer.pump(now)
    }

    /// Drain both inboxes without flushing.
    ///
    /// # Errors
    /// Propagates wall failures.
    pub fn pump(&mut self) -> Result<(), BridgeError> {
        let now = self.clock.now();
        self.producer.pump(now)?;
        self.consumer.pump(now)
    }

    /// Advance time in coarse steps until both ends are fully drained.
    ///
    /// # Errors
    /// Propagates wall failures.
    pub fn settle(&mut self) -> Result<(), BridgeError> {
        for _ in 0..MAX_SETTLE_ROUNDS {
            self.clock.advance(Duration::from_secs(2));
            self.tick()?;
            if self.producer.buffered() == 0 && self.consumer.buffered() == 0 {
                // Replies produced while draining still need delivery.
                return self.pump();
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Consumer-side commands

    /// Execute store commands against the consumer bridge.
    ///
    /// # Errors
    /// Propagates wall failures.
    pub fn execute(&mut self, commands: Vec<Command>) -> Result<(), BridgeError> {
        for command in commands {
            match command {
                Command::Inspect { id, path } => self.request_inspection(id, path)?,
                other => {
                    if let Some((evt, value)) = other.into_event() {
                        let now = self.clock.now();
                        self.consumer.send(now, evt, &value);
                    }
                },
            }
        }
        Ok(())
    }

    /// Request a deeper snapshot for one node section and merge the reply
    /// into the store when it arrives.
    ///
    /// # Errors
    /// Propagates wall failures.
    pub fn inspect(&mut self, id: NodeId, section: Section, path: Path) -> Result<(), BridgeError> {
        let command = self.store.borrow().inspect(id, section, path);
        self.execute(vec![command])
    }

    fn request_inspection(&mut self, id: NodeId, path: Path) -> Result<(), BridgeError> {
        let Some((section, rest)) = split_section(&path) else {
            warn!(path = %display_path(&path), "inspect path does not start with a section");
            return Ok(());
        };
        let store = Rc::clone(&self.store);
        let errors = Rc::clone(&self.errors);
        let node = id.clone();
        self.consumer.inspect(id, path, move |result| match result {
            Ok(value) => {
                if let Err(err) =
                    store.borrow_mut().apply_inspection(&node, section, &rest, value)
                {
                    errors.borrow_mut().push(err);
                }
            },
            Err(reason) => warn!(%node, %reason, "inspection request failed"),
        })
    }

    // ------------------------------------------------------------------
    // Access

    /// The mirrored store.
    #[must_use]
    pub fn store(&self) -> Ref<'_, Store> {
        self.store.borrow()
    }

    /// The mirrored store, mutably (selection, search, collapse).
    #[must_use]
    pub fn store_mut(&self) -> RefMut<'_, Store> {
        self.store.borrow_mut()
    }

    /// Store errors collected from subscription handlers.
    #[must_use]
    pub fn errors(&self) -> Ref<'_, Vec<StoreError>> {
        self.errors.borrow()
    }

    /// The producer-side bridge.
    pub fn producer_mut(&mut self) -> &mut Bridge<LoopbackWall> {
        &mut self.producer
    }

    /// The consumer-side bridge.
    pub fn consumer_mut(&mut self) -> &mut Bridge<LoopbackWall> {
        &mut self.consumer
    }
}

fn split_section(path: &[PathSeg]) -> Option<(Section, Vec<PathSeg>)> {
    let (first, rest) = path.split_first()?;
    let PathSeg::Key(key) = first else {
        return None;
    };
    let section = match key.as_str() {
        "props" => Section::Props,
        "state" => Section::State,
        "context" => Section::Context,
        _ => return None,
    };
    Some((section, rest.to_vec()))
}
