//! Capability-handshake session state machine.
//!
//! The consumer cannot tell "producer not injected yet" from "producer
//! gone" without asking. On startup it probes for capabilities on a fixed
//! interval; a reply at any point connects the session, and exhausting the
//! retry budget reports a connection failure so the UI can show a neutral
//! "disconnected / waiting" state instead of crashing on missing data.
//!
//! # State machine
//!
//! ```text
//! ┌──────┐  start   ┌─────────┐  capabilities  ┌───────────┐
//! │ Idle │─────────>│ Probing │───────────────>│ Connected │
//! └──────┘          └─────────┘                └───────────┘
//!                        │ retry budget exhausted
//!                        ↓
//!                   ┌────────┐
//!                   │ Failed │
//!                   └────────┘
//! ```
//!
//! Pure state machine: no I/O, no stored clock. Time is passed as
//! parameters and intended effects come back as [`SessionAction`]s for the
//! driver to execute.

use std::time::{Duration, Instant};

use periscope_proto::message::{EventEnvelope, Message, events};
use serde_json::Value as JsonValue;

use crate::error::BridgeError;

/// Actions returned by the session state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    /// Transmit this message over the wall.
    Send(Message),

    /// Report the session as unconnectable.
    Fail {
        /// Reason for giving up.
        reason: String,
    },
}

/// Session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created, no probe sent yet.
    Idle,
    /// Probes in flight, waiting for a capabilities reply.
    Probing,
    /// Capabilities received; the mirror is live.
    Connected,
    /// Retry budget exhausted without a reply.
    Failed,
}

/// Session configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Fixed interval between probes.
    pub probe_interval: Duration,
    /// Probes sent before giving up.
    pub max_probes: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { probe_interval: Duration::from_secs(2), max_probes: 5 }
    }
}

/// Capability-handshake retry machine for one consumer session.
#[derive(Debug, Clone)]
pub struct Session {
    state: SessionState,
    config: SessionConfig,
    probes_sent: u32,
    last_probe: Option<Instant>,
    capabilities: Option<JsonValue>,
}

impl Session {
    /// Create a new session in Idle state.
    pub fn new(config: SessionConfig) -> Self {
        Self { state: SessionState::Idle, config, probes_sent: 0, last_probe: None, capabilities: None }
    }

    /// Get current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Capabilities reported by the producer, once connected.
    #[must_use]
    pub fn capabilities(&self) -> Option<&JsonValue> {
        self.capabilities.as_ref()
    }

    /// Send the first probe and start the retry clock.
    ///
    /// # Errors
    /// Returns `InvalidSessionState` if not in Idle state.
    pub fn start(&mut self, now: Instant) -> Result<Vec<SessionAction>, BridgeError> {
        if self.state != SessionState::Idle {
            return Err(BridgeError::InvalidSessionState {
                state: self.state,
                operation: "start",
            });
        }
        self.state = SessionState::Probing;
        self.probes_sent = 1;
        self.last_probe = Some(now);
        Ok(vec![SessionAction::Send(probe())])
    }

    /// Tick the state machine: re-probe on the fixed interval, fail once
    /// the budget is exhausted.
    pub fn tick(&mut self, now: Instant) -> Vec<SessionAction> {
        if self.state != SessionState::Probing {
            return Vec::new();
        }
        let due = match self.last_probe {
            None => true,
            Some(last) => now.duration_since(last) >= self.config.probe_interval,
        };
        if !due {
            return Vec::new();
        }
        if self.probes_sent >= self.config.max_probes {
            self.state = SessionState::Failed;
            return vec![SessionAction::Fail {
                reason: format!("no capabilities reply after {} probes", self.probes_sent),
            }];
        }
        self.probes_sent += 1;
        self.last_probe = Some(now);
        vec![SessionAction::Send(probe())]
    }

    /// Handle a capabilities reply. Connects from any probing point;
    /// replies after connection are ignored.
    pub fn on_capabilities(&mut self, capabilities: JsonValue) {
        if matches!(self.state, SessionState::Idle | SessionState::Probing) {
            self.state = SessionState::Connected;
            self.capabilities = Some(capabilities);
        }
    }
}

fn probe() -> Message {
    Message::Event(EventEnvelope::plain(events::PROBE, JsonValue::Null))
}
