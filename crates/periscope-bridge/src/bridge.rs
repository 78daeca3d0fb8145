//! The bridge proper: queuing, batching, correlation, dispatch.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use periscope_codec::dehydrate::{DehydrateConfig, dehydrate_inspection, dehydrate_root};
use periscope_codec::hydrate::{hydrate, walk_value};
use periscope_proto::message::{EventEnvelope, Message, events};
use periscope_proto::node::NodeId;
use periscope_proto::path::{Path, display_path};
use periscope_proto::placeholder::PROTO_KEY;
use periscope_proto::value::Value;
use serde_json::Value as JsonValue;
use tracing::{debug, trace, warn};

use crate::error::BridgeError;
use crate::wall::Wall;

/// Flush-policy knobs.
///
/// Renderer mutations can fire many times per frame; batching amortizes
/// per-message overhead. While the peer has sent `pause` (its UI is not
/// visible) the bridge coalesces harder: longer deadline, bigger chunk.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Flush deadline armed by the first queued event while live.
    pub live_flush_delay: Duration,
    /// Flush deadline while paused.
    pub paused_flush_delay: Duration,
    /// Events popped per flush while live.
    pub live_chunk: usize,
    /// Events popped per flush while paused.
    pub paused_chunk: usize,
    /// Codec settings applied to every outbound payload.
    pub codec: DehydrateConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            live_flush_delay: Duration::from_millis(50),
            paused_flush_delay: Duration::from_secs(1),
            live_chunk: 16,
            paused_chunk: 64,
            codec: DehydrateConfig::default(),
        }
    }
}

/// Handle for tearing down one event subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Outcome handed to a pending `inspect`/`call` callback: the hydrated
/// result value, or the remote failure reason.
pub type CallResult = Result<JsonValue, String>;

type EventHandler = Box<dyn FnMut(&JsonValue)>;
type CallHandler = Box<dyn FnMut(&[JsonValue]) -> Result<Value, String>>;
type PendingCallback = Box<dyn FnOnce(CallResult)>;

struct Subscription {
    id: SubscriptionId,
    once: bool,
    handler: EventHandler,
}

/// Reliable, order-preserving, batched delivery of typed events in both
/// directions over an injected [`Wall`], with request/response correlation
/// and cooperative backpressure.
///
/// Single logical thread of control: the buffer, pending table, and
/// subscription table are mutated only inside `send`, `tick`, and
/// `handle_message`.
pub struct Bridge<W: Wall> {
    wall: W,
    config: BridgeConfig,
    buffer: VecDeque<EventEnvelope>,
    next_flush_at: Option<Instant>,
    paused: bool,
    next_callback_id: u64,
    pending: HashMap<u64, PendingCallback>,
    call_handlers: HashMap<String, CallHandler>,
    subscriptions: HashMap<String, Vec<Subscription>>,
    next_subscription_id: u64,
    inspectables: HashMap<NodeId, Value>,
}

impl<W: Wall> Bridge<W> {
    /// Build a bridge over `wall`.
    pub fn new(wall: W, config: BridgeConfig) -> Self {
        Self {
            wall,
            config,
            buffer: VecDeque::new(),
            next_flush_at: None,
            paused: false,
            next_callback_id: 1,
            pending: HashMap::new(),
            call_handlers: HashMap::new(),
            subscriptions: HashMap::new(),
            next_subscription_id: 1,
            inspectables: HashMap::new(),
        }
    }

    /// Queue a fire-and-forget event. Never transmits on the caller's hot
    /// path; the first queued event arms the flush deadline and
    /// [`Bridge::tick`] does the sending.
    ///
    /// Payloads that produced placeholders and carry an `id` field are
    /// cached raw so later `inspect` requests can be served one level
    /// deeper.
    pub fn send(&mut self, now: Instant, evt: &str, data: &Value) {
        let (json, cleaned) = dehydrate_root(data, &self.config.codec);
        if !cleaned.is_empty() {
            if let Some(id) = record_id(data) {
                self.inspectables.insert(id, data.clone());
            }
        }
        if evt == events::UNMOUNT {
            if let Value::Text(id) = data {
                self.inspectables.remove(&NodeId::from(id.as_str()));
            }
        }
        self.buffer.push_back(EventEnvelope { evt: evt.to_string(), data: json, cleaned });
        if self.next_flush_at.is_none() {
            self.next_flush_at = Some(now + self.flush_delay());
        }
    }

    /// Flush driver. Once the deadline has passed, pops one bounded chunk
    /// and transmits it; a non-empty remainder re-arms the deadline.
    /// Relative order across flushes is preserved.
    pub fn tick(&mut self, now: Instant) -> Result<(), BridgeError> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        if let Some(deadline) = self.next_flush_at {
            if now < deadline {
                return Ok(());
            }
        }
        let chunk = if self.paused { self.config.paused_chunk } else { self.config.live_chunk };
        let take = chunk.min(self.buffer.len());
        let mut batch: Vec<EventEnvelope> = self.buffer.drain(..take).collect();
        trace!(flushed = batch.len(), remaining = self.buffer.len(), "flushing event chunk");
        let message = if batch.len() == 1 {
            Message::Event(batch.remove(0))
        } else {
            Message::ManyEvents { events: batch }
        };
        self.wall.send(message)?;
        self.next_flush_at =
            if self.buffer.is_empty() { None } else { Some(now + self.flush_delay()) };
        Ok(())
    }

    /// Drain the wall and dispatch every inbound message.
    pub fn pump(&mut self, now: Instant) -> Result<(), BridgeError> {
        while let Some(message) = self.wall.try_recv() {
            self.handle_message(now, message)?;
        }
        Ok(())
    }

    /// Request one more dehydration level at `path` inside node `id`.
    ///
    /// Exactly-once per request, no retry: a reply that never arrives
    /// leaves `callback` unresolved, and shutdown clears the whole table.
    pub fn inspect(
        &mut self,
        id: NodeId,
        path: Path,
        callback: impl FnOnce(CallResult) + 'static,
    ) -> Result<(), BridgeError> {
        let correlation = self.allocate_callback(Box::new(callback));
        self.wall.send(Message::Inspect { id, path, callback: correlation })
    }

    /// Invoke the named remote handler with plain-data arguments.
    pub fn call(
        &mut self,
        name: impl Into<String>,
        args: Vec<JsonValue>,
        callback: impl FnOnce(CallResult) + 'static,
    ) -> Result<(), BridgeError> {
        let correlation = self.allocate_callback(Box::new(callback));
        self.wall.send(Message::Call { name: name.into(), args, callback: correlation })
    }

    /// Register the handler answering remote [`Bridge::call`]s for `name`.
    /// At most one handler per name; a second registration is a
    /// programming error.
    pub fn on_call(
        &mut self,
        name: impl Into<String>,
        handler: impl FnMut(&[JsonValue]) -> Result<Value, String> + 'static,
    ) -> Result<(), BridgeError> {
        let name = name.into();
        if self.call_handlers.contains_key(&name) {
            return Err(BridgeError::HandlerAlreadyRegistered { name });
        }
        self.call_handlers.insert(name, Box::new(handler));
        Ok(())
    }

    /// Subscribe to a fire-and-forget event. The handler sees the hydrated
    /// payload.
    pub fn on(&mut self, evt: impl Into<String>, handler: impl FnMut(&JsonValue) + 'static) -> SubscriptionId {
        self.subscribe(evt.into(), Box::new(handler), false)
    }

    /// Subscribe for exactly one delivery.
    pub fn once(
        &mut self,
        evt: impl Into<String>,
        handler: impl FnMut(&JsonValue) + 'static,
    ) -> SubscriptionId {
        self.subscribe(evt.into(), Box::new(handler), true)
    }

    /// Tear down one subscription. Returns `false` if it was already gone.
    pub fn off(&mut self, id: SubscriptionId) -> bool {
        let mut found = false;
        for subs in self.subscriptions.values_mut() {
            subs.retain(|sub| {
                let keep = sub.id != id;
                found |= !keep;
                keep
            });
        }
        found
    }

    /// Tell the peer to coalesce sends more aggressively. Control messages
    /// bypass the event buffer; reordering ahead of queued application
    /// events only changes flush cadence, which is harmless.
    pub fn pause(&mut self) -> Result<(), BridgeError> {
        self.wall.send(Message::Pause)
    }

    /// Tell the peer to flush promptly again.
    pub fn resume(&mut self) -> Result<(), BridgeError> {
        self.wall.send(Message::Resume)
    }

    /// Best-effort local cleanup on disconnect: abandon pending callbacks,
    /// drop queued events and subscriptions.
    pub fn shutdown(&mut self) {
        debug!(
            pending = self.pending.len(),
            buffered = self.buffer.len(),
            "bridge shutting down"
        );
        self.pending.clear();
        self.buffer.clear();
        self.subscriptions.clear();
        self.inspectables.clear();
        self.next_flush_at = None;
    }

    /// Number of events queued but not yet flushed.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Number of requests awaiting a reply.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Dispatch one inbound message.
    pub fn handle_message(&mut self, now: Instant, message: Message) -> Result<(), BridgeError> {
        match message {
            Message::Event(envelope) => {
                self.dispatch_event(envelope);
                Ok(())
            },
            Message::ManyEvents { events } => {
                for envelope in events {
                    self.dispatch_event(envelope);
                }
                Ok(())
            },
            Message::Callback { id, args, cleaned, proto, proto_cleaned, error } => {
                self.resolve_callback(id, args, &cleaned, proto, &proto_cleaned, error);
                Ok(())
            },
            Message::Call { name, args, callback } => {
                let reply = self.answer_call(&name, &args, callback);
                self.wall.send(reply)
            },
            Message::Inspect { id, path, callback } => {
                let reply = self.answer_inspect(&id, &path, callback);
                self.wall.send(reply)
            },
            Message::Pause => {
                debug!("peer paused; coalescing flushes");
                self.paused = true;
                Ok(())
            },
            Message::Resume => {
                debug!("peer resumed; flushing promptly");
                self.paused = false;
                if !self.buffer.is_empty() {
                    self.next_flush_at = Some(now);
                }
                Ok(())
            },
        }
    }

    fn subscribe(&mut self, evt: String, handler: EventHandler, once: bool) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription_id);
        self.next_subscription_id += 1;
        self.subscriptions.entry(evt).or_default().push(Subscription { id, once, handler });
        id
    }

    fn flush_delay(&self) -> Duration {
        if self.paused { self.config.paused_flush_delay } else { self.config.live_flush_delay }
    }

    fn allocate_callback(&mut self, callback: PendingCallback) -> u64 {
        // Monotonic; ids are never reused while an entry is outstanding.
        let id = self.next_callback_id;
        self.next_callback_id += 1;
        self.pending.insert(id, callback);
        id
    }

    fn dispatch_event(&mut self, envelope: EventEnvelope) {
        let EventEnvelope { evt, mut data, cleaned } = envelope;
        if let Err(err) = hydrate(&mut data, &cleaned) {
            warn!(%evt, %err, "dropping event whose cleaned paths do not resolve");
            return;
        }
        let Some(mut subs) = self.subscriptions.remove(&evt) else {
            trace!(%evt, "event with no subscribers");
            return;
        };
        for sub in &mut subs {
            (sub.handler)(&data);
        }
        subs.retain(|sub| !sub.once);
        if !subs.is_empty() {
            self.subscriptions.insert(evt, subs);
        }
    }

    fn resolve_callback(
        &mut self,
        id: u64,
        mut args: Vec<JsonValue>,
        cleaned: &[Path],
        proto: Option<JsonValue>,
        proto_cleaned: &[Path],
        error: Option<String>,
    ) {
        let Some(callback) = self.pending.remove(&id) else {
            // Expected after shutdown cleared the table; tolerate it.
            warn!(id, "reply with unknown correlation id");
            return;
        };
        if let Some(reason) = error {
            callback(Err(reason));
            return;
        }
        let mut data = if args.is_empty() { JsonValue::Null } else { args.remove(0) };
        if let Err(err) = hydrate(&mut data, cleaned) {
            callback(Err(err.to_string()));
            return;
        }
        if let Some(mut proto) = proto {
            if let Err(err) = hydrate(&mut proto, proto_cleaned) {
                warn!(id, %err, "dropping unhydratable prototype snapshot");
            } else if let Some(map) = data.as_object_mut() {
                map.insert(PROTO_KEY.to_string(), proto);
            }
        }
        callback(Ok(data));
    }

    fn answer_call(&mut self, name: &str, args: &[JsonValue], callback: u64) -> Message {
        let Some(handler) = self.call_handlers.get_mut(name) else {
            warn!(%name, "call for unregistered handler");
            return Message::callback_err(callback, format!("no handler registered for `{name}`"));
        };
        match handler(args) {
            Ok(value) => {
                let (data, cleaned) = dehydrate_root(&value, &self.config.codec);
                Message::callback_ok(callback, data, cleaned)
            },
            Err(reason) => {
                // Always reply, even on failure, so the caller's pending
                // entry is never orphaned.
                warn!(%name, %reason, "call handler failed");
                Message::callback_err(callback, reason)
            },
        }
    }

    fn answer_inspect(&mut self, id: &NodeId, path: &Path, callback: u64) -> Message {
        let target = self.inspectables.get(id).and_then(|raw| walk_value(raw, path));
        match target {
            Some(value) => {
                let (data, cleaned) = dehydrate_inspection(value, &self.config.codec);
                Message::callback_ok(callback, data, cleaned)
            },
            None => Message::callback_err(
                callback,
                format!("no inspectable value for node {id} at {}", display_path(path)),
            ),
        }
    }
}

fn record_id(data: &Value) -> Option<NodeId> {
    match data.get("id") {
        Some(Value::Text(id)) => Some(NodeId::from(id.as_str())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]

    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::rc::Rc;

    use serde_json::json;

    use super::*;

    /// Test wall capturing outbound traffic and replaying staged inbound
    /// messages.
    struct CaptureWall {
        sent: Rc<RefCell<Vec<Message>>>,
        inbox: VecDeque<Message>,
    }

    impl CaptureWall {
        fn new() -> (Self, Rc<RefCell<Vec<Message>>>) {
            let sent = Rc::new(RefCell::new(Vec::new()));
            (Self { sent: Rc::clone(&sent), inbox: VecDeque::new() }, sent)
        }
    }

    impl Wall for CaptureWall {
        fn send(&mut self, message: Message) -> Result<(), BridgeError> {
            self.sent.borrow_mut().push(message);
            Ok(())
        }

        fn try_recv(&mut self) -> Option<Message> {
            self.inbox.pop_front()
        }
    }

    fn bridge() -> (Bridge<CaptureWall>, Rc<RefCell<Vec<Message>>>) {
        let (wall, sent) = CaptureWall::new();
        (Bridge::new(wall, BridgeConfig::default()), sent)
    }

    fn evt_names(message: &Message) -> Vec<String> {
        match message {
            Message::Event(env) => vec![env.evt.clone()],
            Message::ManyEvents { events } => events.iter().map(|e| e.evt.clone()).collect(),
            other => panic!("expected events, got {other:?}"),
        }
    }

    #[test]
    fn send_does_not_transmit_before_deadline() {
        let (mut bridge, sent) = bridge();
        let t0 = Instant::now();

        bridge.send(t0, "a", &Value::Int(1));
        bridge.tick(t0).unwrap();
        assert!(sent.borrow().is_empty());
        assert_eq!(bridge.buffered(), 1);
    }

    #[test]
    fn batching_preserves_order_across_flushes() {
        let (mut bridge, sent) = bridge();
        let t0 = Instant::now();

        bridge.send(t0, "a", &Value::Int(1));
        bridge.send(t0, "b", &Value::Int(2));
        bridge.send(t0, "c", &Value::Int(3));
        let t1 = t0 + Duration::from_millis(60);
        bridge.tick(t1).unwrap();

        // A later send must never interleave with the first batch.
        bridge.send(t1, "d", &Value::Int(4));
        let t2 = t1 + Duration::from_millis(60);
        bridge.tick(t2).unwrap();

        let sent = sent.borrow();
        assert_eq!(sent.len(), 2);
        assert_eq!(evt_names(&sent[0]), vec!["a", "b", "c"]);
        assert_eq!(evt_names(&sent[1]), vec!["d"]);
    }

    #[test]
    fn chunking_flushes_bounded_batches() {
        let (wall, sent) = CaptureWall::new();
        let config = BridgeConfig { live_chunk: 2, ..BridgeConfig::default() };
        let mut bridge = Bridge::new(wall, config);
        let t0 = Instant::now();

        for evt in ["a", "b", "c"] {
            bridge.send(t0, evt, &Value::Null);
        }
        let t1 = t0 + Duration::from_millis(60);
        bridge.tick(t1).unwrap();
        assert_eq!(bridge.buffered(), 1);

        // Remainder re-armed the deadline; it flushes on a later tick.
        let t2 = t1 + Duration::from_millis(60);
        bridge.tick(t2).unwrap();

        let sent = sent.borrow();
        assert_eq!(evt_names(&sent[0]), vec!["a", "b"]);
        assert_eq!(evt_names(&sent[1]), vec!["c"]);
    }

    #[test]
    fn pause_coalesces_and_resume_flushes_promptly() {
        let (mut bridge, sent) = bridge();
        let t0 = Instant::now();

        bridge.handle_message(t0, Message::Pause).unwrap();
        bridge.send(t0, "a", &Value::Null);
        // The live deadline passes, but the paused one has not.
        let t1 = t0 + Duration::from_millis(100);
        bridge.tick(t1).unwrap();
        assert!(sent.borrow().is_empty());

        bridge.handle_message(t1, Message::Resume).unwrap();
        bridge.tick(t1).unwrap();
        assert_eq!(sent.borrow().len(), 1);
    }

    #[test]
    fn correlated_replies_resolve_independently() {
        let (mut bridge, _sent) = bridge();
        let first = Rc::new(RefCell::new(None));
        let second = Rc::new(RefCell::new(None));

        let sink = Rc::clone(&first);
        bridge.call("alpha", vec![], move |result| *sink.borrow_mut() = Some(result)).unwrap();
        let sink = Rc::clone(&second);
        bridge.call("beta", vec![], move |result| *sink.borrow_mut() = Some(result)).unwrap();
        assert_eq!(bridge.pending(), 2);

        let t0 = Instant::now();
        bridge.handle_message(t0, Message::callback_ok(2, json!("two"), vec![])).unwrap();
        assert!(first.borrow().is_none());
        assert_eq!(bridge.pending(), 1);

        bridge.handle_message(t0, Message::callback_ok(1, json!("one"), vec![])).unwrap();
        assert_eq!(*first.borrow(), Some(Ok(json!("one"))));
        assert_eq!(*second.borrow(), Some(Ok(json!("two"))));
        assert_eq!(bridge.pending(), 0);
    }

    #[test]
    fn unknown_correlation_id_is_tolerated() {
        let (mut bridge, _sent) = bridge();
        let t0 = Instant::now();
        bridge.handle_message(t0, Message::callback_ok(99, json!(null), vec![])).unwrap();
    }

    #[test]
    fn duplicate_call_handler_is_a_programming_error() {
        let (mut bridge, _sent) = bridge();
        bridge.on_call("style", |_| Ok(Value::Null)).unwrap();
        let err = bridge.on_call("style", |_| Ok(Value::Null));
        assert!(matches!(err, Err(BridgeError::HandlerAlreadyRegistered { .. })));
    }

    #[test]
    fn failed_call_handler_still_replies() {
        let (mut bridge, sent) = bridge();
        bridge.on_call("style", |_| Err("no style".to_string())).unwrap();

        let t0 = Instant::now();
        bridge
            .handle_message(t0, Message::Call { name: "style".into(), args: vec![], callback: 7 })
            .unwrap();

        match &sent.borrow()[0] {
            Message::Callback { id, error, .. } => {
                assert_eq!(*id, 7);
                assert_eq!(error.as_deref(), Some("no style"));
            },
            other => panic!("expected callback, got {other:?}"),
        }
    }

    #[test]
    fn inspect_serves_one_more_level_from_the_cached_raw_value() {
        let (mut bridge, sent) = bridge();
        let t0 = Instant::now();

        let record = Value::map([
            ("id", Value::text("n1")),
            (
                "props",
                Value::map([(
                    "vec",
                    Value::Foreign {
                        class: "Vector2".into(),
                        fields: BTreeMap::from([
                            ("x".to_string(), Value::Int(1)),
                            ("y".to_string(), Value::Int(2)),
                        ]),
                    },
                )]),
            ),
        ]);
        bridge.send(t0, events::MOUNT, &record);

        let path: Path = vec!["props".into(), "vec".into()];
        bridge
            .handle_message(t0, Message::Inspect { id: NodeId::from("n1"), path, callback: 3 })
            .unwrap();

        match sent.borrow().last() {
            Some(Message::Callback { id, args, error, .. }) => {
                assert_eq!(*id, 3);
                assert!(error.is_none());
                assert_eq!(args[0], json!({"x": 1, "y": 2}));
            },
            other => panic!("expected callback, got {other:?}"),
        }
    }

    #[test]
    fn inspect_of_unknown_node_replies_with_error() {
        let (mut bridge, sent) = bridge();
        let t0 = Instant::now();
        bridge
            .handle_message(
                t0,
                Message::Inspect { id: NodeId::from("ghost"), path: vec![], callback: 4 },
            )
            .unwrap();
        match sent.borrow().last() {
            Some(Message::Callback { id, error, .. }) => {
                assert_eq!(*id, 4);
                assert!(error.is_some());
            },
            other => panic!("expected callback, got {other:?}"),
        }
    }

    #[test]
    fn callback_reply_merges_prototype_under_reserved_key() {
        let (mut bridge, _sent) = bridge();
        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        bridge
            .inspect(NodeId::from("n1"), vec!["props".into()], move |result| {
                *sink.borrow_mut() = Some(result);
            })
            .unwrap();

        let t0 = Instant::now();
        bridge
            .handle_message(
                t0,
                Message::Callback {
                    id: 1,
                    args: vec![json!({"x": 1})],
                    cleaned: vec![],
                    proto: Some(json!({"toFixed": {"type": "function", "name": "toFixed"}})),
                    proto_cleaned: vec![vec!["toFixed".into()]],
                    error: None,
                },
            )
            .unwrap();

        let seen = seen.borrow();
        let data = seen.as_ref().unwrap().as_ref().unwrap();
        assert_eq!(data["x"], json!(1));
        assert_eq!(data[PROTO_KEY]["toFixed"]["inspected"], json!(false));
    }

    #[test]
    fn events_fan_out_in_order_and_once_unsubscribes() {
        let (mut bridge, _sent) = bridge();
        let log = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&log);
        bridge.on("mount", move |data| sink.borrow_mut().push(data.clone()));
        let sink = Rc::clone(&log);
        bridge.once("mount", move |data| sink.borrow_mut().push(json!([data])));

        let t0 = Instant::now();
        let batch = Message::ManyEvents {
            events: vec![
                EventEnvelope::plain("mount", json!("a")),
                EventEnvelope::plain("mount", json!("b")),
            ],
        };
        bridge.handle_message(t0, batch).unwrap();

        let log = log.borrow();
        // First envelope hits both handlers, second only the durable one.
        assert_eq!(*log, vec![json!("a"), json!(["a"]), json!("b")]);
    }

    #[test]
    fn off_tears_down_a_subscription() {
        let (mut bridge, _sent) = bridge();
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        let sub = bridge.on("update", move |_| *sink.borrow_mut() += 1);

        let t0 = Instant::now();
        bridge
            .handle_message(t0, Message::Event(EventEnvelope::plain("update", json!(1))))
            .unwrap();
        assert!(bridge.off(sub));
        assert!(!bridge.off(sub));
        bridge
            .handle_message(t0, Message::Event(EventEnvelope::plain("update", json!(2))))
            .unwrap();
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn shutdown_abandons_pending_callbacks() {
        let (mut bridge, _sent) = bridge();
        bridge.call("alpha", vec![], |_| {}).unwrap();
        bridge.send(Instant::now(), "a", &Value::Null);
        bridge.shutdown();
        assert_eq!(bridge.pending(), 0);
        assert_eq!(bridge.buffered(), 0);
    }
}
