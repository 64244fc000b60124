//! Ring Link relay.
//!
//! Ring Link is a cross-game effect channel: clients sharing the `RingLink`
//! tag bounce ring gains and losses to each other through the server. This
//! client only sends; inbound Ring Link packets are ignored.

use std::collections::BTreeSet;

use chrono::Utc;
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::session::{ClientMessage, tags};
use crate::watcher::{Action, StageCleared};

/// Optional capability plugged into the watcher's action path
///
/// Relays see every action the watcher emits, including clears that produced
/// no hint, so they work independently of the hint cache.
pub trait Relay {
    /// Extra packet to send alongside an emitted watcher action
    fn relay(&mut self, action: &Action) -> Option<ClientMessage>;

    /// Inbound `Bounced` packet
    fn on_bounced(&mut self, _tags: &[String], _data: &Value) {}
}

/// Ring Link participation for this client
#[derive(Debug, Clone)]
pub struct RingLink {
    enabled: bool,
    /// Identifies this instance so receivers can drop their own echoes
    source: Option<u32>,
    /// Rings sent after a perfect clear
    perfect_share: i32,
}

impl RingLink {
    /// Create a relay; the source id is drawn on the first send
    pub fn new(enabled: bool, perfect_share: i32) -> Self {
        Self {
            enabled,
            source: None,
            perfect_share,
        }
    }

    /// Check if the `RingLink` tag is currently announced
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Source id used in sent packets, `None` until something was sent
    pub fn source_id(&self) -> Option<u32> {
        self.source
    }

    /// Add or remove the `RingLink` tag according to the current setting
    pub fn apply_tag(&self, session_tags: &mut BTreeSet<String>) {
        if self.enabled {
            session_tags.insert(tags::RING_LINK.to_string());
        } else {
            session_tags.remove(tags::RING_LINK);
        }
    }

    /// Flip participation and build the `ConnectUpdate` carrying the full tag set
    pub fn toggle(&mut self, session_tags: &mut BTreeSet<String>) -> ClientMessage {
        self.enabled = !self.enabled;
        self.apply_tag(session_tags);
        info!(
            "Ring Link {}",
            if self.enabled { "enabled" } else { "disabled" }
        );

        ClientMessage::ConnectUpdate {
            tags: session_tags.iter().cloned().collect(),
        }
    }

    /// Build a Ring Link broadcast, or `None` while disabled
    pub fn send_ring_link(&mut self, amount: i32) -> Option<ClientMessage> {
        if !self.enabled {
            return None;
        }

        let source = *self.source.get_or_insert_with(rand::random::<u32>);
        let time = Utc::now().timestamp_millis() as f64 / 1000.0;
        debug!("Sending Ring Link: {} rings", amount);

        Some(ClientMessage::Bounce {
            tags: vec![tags::RING_LINK.to_string()],
            data: json!({
                "time": time,
                "source": source,
                "amount": amount,
            }),
        })
    }
}

impl Relay for RingLink {
    fn relay(&mut self, action: &Action) -> Option<ClientMessage> {
        match action.outcome() {
            StageCleared::Perfect => self.send_ring_link(self.perfect_share),
            _ => None,
        }
    }

    fn on_bounced(&mut self, bounce_tags: &[String], _data: &Value) {
        if bounce_tags.iter().any(|t| t == tags::RING_LINK) {
            debug!("Ignoring inbound Ring Link");
        }
    }
}
