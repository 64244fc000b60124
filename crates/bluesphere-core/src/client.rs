//! Session glue between the emulator, the stage watcher and the server.
//!
//! [`BlueSphereClient`] owns everything that lives for one server session:
//! the watcher state, the hint cache, the scouted items and the Ring Link
//! relay. Transports are passed in per call, so the same client can be
//! driven by the CLI or by tests.

use std::collections::HashMap;

use rand::Rng;
use rand::rngs::StdRng;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::memory::{MemorySample, MemorySource};
use crate::ring_link::{Relay, RingLink};
use crate::session::{
    ClientMessage, NetworkItem, PROTOCOL_VERSION, ServerMessage, SessionChannel, SessionConfig,
    plain_text, read_hints_key,
};
use crate::validation::{RomValidation, validate_rom};
use crate::watcher::{Action, StageWatcher, parse_hint_value};

/// Team and slot assigned by the server on `Connected`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotInfo {
    pub team: u32,
    pub slot: u32,
}

impl SlotInfo {
    /// Data storage key holding the hints created for this slot
    pub fn hints_key(&self) -> String {
        read_hints_key(self.team, self.slot)
    }
}

/// Archipelago client for the Blue Sphere hint game
///
/// Generic over the watcher's RNG so tests can seed the hint pick.
pub struct BlueSphereClient<R = StdRng> {
    watcher: StageWatcher<R>,
    ring_link: RingLink,
    session: SessionConfig,
    slot: Option<SlotInfo>,
    scouted: HashMap<i64, NetworkItem>,
}

impl BlueSphereClient<StdRng> {
    /// Build a client from the loaded config.
    ///
    /// Ring Link participation and the poll interval come from `config`; the
    /// session starts disconnected until a `Connected` packet is handled.
    pub fn new(config: &Config) -> Self {
        let ring_link = RingLink::new(config.ring_link.enabled, config.ring_link.perfect_share);
        let mut client = Self::with_watcher(StageWatcher::new(), ring_link);
        client.session.watcher_interval = config.poll_interval();
        client
    }
}

impl<R: Rng> BlueSphereClient<R> {
    /// Build a client around an existing watcher and relay
    pub fn with_watcher(watcher: StageWatcher<R>, ring_link: RingLink) -> Self {
        let mut session = SessionConfig::default();
        ring_link.apply_tag(&mut session.tags);

        Self {
            watcher,
            ring_link,
            session,
            slot: None,
            scouted: HashMap::new(),
        }
    }

    /// Stage watcher for the current session
    pub fn watcher(&self) -> &StageWatcher<R> {
        &self.watcher
    }

    /// Game name, items mask, poll interval and tags announced to the server
    pub fn session_config(&self) -> &SessionConfig {
        &self.session
    }

    /// Slot assigned by the server, or `None` before `Connected`
    pub fn slot(&self) -> Option<SlotInfo> {
        self.slot
    }

    /// Check if the server has accepted this client.
    ///
    /// Memory is not polled until this is true.
    pub fn is_connected(&self) -> bool {
        self.slot.is_some()
    }

    pub fn ring_link(&self) -> &RingLink {
        &self.ring_link
    }

    /// Item scouted at `location`, if the server reported one
    pub fn scouted(&self, location: i64) -> Option<&NetworkItem> {
        self.scouted.get(&location)
    }

    /// Forget everything tied to the previous server session.
    ///
    /// Resets the watcher and hint cache, drops the slot and scouted items.
    /// Ring Link participation and its source id survive the reconnect.
    pub fn reset_session(&mut self) {
        self.watcher.reset();
        self.slot = None;
        self.scouted.clear();
    }

    /// Check the loaded cartridge before talking to the server
    pub fn validate<S: MemorySource + ?Sized>(&self, source: &mut S) -> RomValidation {
        let result = validate_rom(source);
        if result.is_valid() {
            info!("Blue Sphere ROM detected");
        } else {
            debug!("ROM validation failed: {:?}", result);
        }
        result
    }

    /// Build the `Connect` packet for the handshake.
    ///
    /// - `name`: slot name to play as
    /// - `password`: room password, empty when the room has none
    /// - `uuid`: unique id of this client instance
    pub fn connect_message(&self, name: &str, password: &str, uuid: &str) -> ClientMessage {
        ClientMessage::Connect {
            password: password.to_string(),
            game: self.session.game.clone(),
            name: name.to_string(),
            uuid: uuid.to_string(),
            version: PROTOCOL_VERSION,
            items_handling: self.session.items_handling,
            tags: self.session.tag_list(),
            slot_data: false,
        }
    }

    /// React to one server packet, returning the packets to send in reply
    pub fn handle_message(&mut self, message: &ServerMessage) -> Result<Vec<ClientMessage>> {
        match message {
            ServerMessage::Connected {
                team,
                slot,
                missing_locations,
                checked_locations,
            } => {
                let info = SlotInfo {
                    team: *team,
                    slot: *slot,
                };
                info!(
                    "Connected as team {} slot {} ({} missing, {} checked locations)",
                    team,
                    slot,
                    missing_locations.len(),
                    checked_locations.len()
                );
                self.slot = Some(info);
                self.watcher
                    .hints_mut()
                    .set_missing(missing_locations.iter().copied());

                let key = info.hints_key();
                Ok(vec![
                    ClientMessage::Get {
                        keys: vec![key.clone()],
                    },
                    ClientMessage::SetNotify { keys: vec![key] },
                    ClientMessage::LocationScouts {
                        locations: missing_locations.clone(),
                        create_as_hint: 0,
                    },
                ])
            }
            ServerMessage::ConnectionRefused { errors } => {
                Err(Error::ConnectionRefused(errors.clone()))
            }
            ServerMessage::Retrieved { keys } => {
                if let Some(key) = self.slot.map(|s| s.hints_key())
                    && let Some(value) = keys.get(&key)
                {
                    self.update_hints(value);
                }
                Ok(Vec::new())
            }
            ServerMessage::SetReply { key, value } => {
                if self.slot.is_some_and(|s| s.hints_key() == *key) {
                    self.update_hints(value);
                }
                Ok(Vec::new())
            }
            ServerMessage::LocationInfo { locations } => {
                self.scouted = locations.iter().map(|item| (item.location, *item)).collect();
                debug!("Scouted {} locations", self.scouted.len());
                Ok(Vec::new())
            }
            ServerMessage::Bounced { tags, data } => {
                self.ring_link.on_bounced(tags, data);
                Ok(Vec::new())
            }
            ServerMessage::PrintJson { data } => {
                let text = plain_text(data);
                if !text.is_empty() {
                    info!("{}", text);
                }
                Ok(Vec::new())
            }
            ServerMessage::RoomInfo { seed_name, .. } => {
                debug!("Room info received (seed {})", seed_name);
                Ok(Vec::new())
            }
            ServerMessage::Other => Ok(Vec::new()),
        }
    }

    fn update_hints(&mut self, value: &Value) {
        match parse_hint_value(value) {
            Ok(hints) => {
                debug!(
                    "Hint cache updated ({} hinted locations)",
                    hints.as_ref().map_or(0, |h| h.len())
                );
                self.watcher.hints_mut().set_hinted(hints);
            }
            Err(e) => warn!("Ignoring malformed hint list: {}", e),
        }
    }

    /// Sample emulator memory once and advance the watcher.
    ///
    /// A transient read failure skips this poll without touching any state.
    pub fn poll<S: MemorySource + ?Sized>(&mut self, source: &mut S) -> Result<Vec<ClientMessage>> {
        if !self.is_connected() {
            return Ok(Vec::new());
        }

        let sample = match MemorySample::read(source) {
            Ok(sample) => sample,
            Err(e) if e.is_transient() => {
                debug!("Skipping poll: {}", e);
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let Some(action) = self.watcher.poll(&sample) else {
            return Ok(Vec::new());
        };

        self.log_action(&action);
        let mut messages: Vec<ClientMessage> = action.to_message().into_iter().collect();
        messages.extend(self.ring_link.relay(&action));
        Ok(messages)
    }

    fn log_action(&self, action: &Action) {
        let Action::CreateHint { location, outcome } = *action else {
            return;
        };
        match self.scouted.get(&location) {
            Some(item) => info!(
                "Stage {}: hinting location {} ({} item for player {})",
                outcome,
                location,
                item.classification(),
                item.player
            ),
            None => info!("Stage {}: hinting location {}", outcome, location),
        }
    }

    /// Flip Ring Link participation, returning the `ConnectUpdate` to send
    pub fn toggle_ring_link(&mut self) -> ClientMessage {
        self.ring_link.toggle(&mut self.session.tags)
    }

    /// One scheduler tick: drain server packets, then poll memory
    pub fn tick<S, C>(&mut self, source: &mut S, channel: &mut C) -> Result<()>
    where
        S: MemorySource + ?Sized,
        C: SessionChannel + ?Sized,
    {
        for message in channel.receive()? {
            let replies = self.handle_message(&message)?;
            if !replies.is_empty() {
                channel.send(&replies)?;
            }
        }

        let outbound = self.poll(source)?;
        if !outbound.is_empty() {
            channel.send(&outbound)?;
        }
        Ok(())
    }
}
