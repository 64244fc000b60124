use std::collections::BTreeSet;
use std::time::Duration;

use crate::error::Result;
use crate::memory::layout::timing;
use crate::session::{ClientMessage, ServerMessage};

/// Session tag names advertised to the server
pub mod tags {
    pub const AP: &str = "AP";
    pub const HINT_GAME: &str = "HintGame";
    pub const RING_LINK: &str = "RingLink";
}

/// Send/receive abstraction over the connection to the coordination server
pub trait SessionChannel {
    fn send(&mut self, messages: &[ClientMessage]) -> Result<()>;

    /// Drain every packet that arrived since the last call, without blocking
    fn receive(&mut self) -> Result<Vec<ServerMessage>>;
}

/// Connection parameters applied once the cartridge has been validated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Empty: a hint game does not claim a slot's game
    pub game: String,
    /// Bitmask of item sources this client wants to receive (none)
    pub items_handling: u8,
    /// Delay between memory polls
    pub watcher_interval: Duration,
    pub tags: BTreeSet<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            game: String::new(),
            items_handling: 0b000,
            watcher_interval: Duration::from_millis(timing::MAX_POLL_INTERVAL_MS),
            tags: [tags::AP, tags::HINT_GAME]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl SessionConfig {
    /// Tags in the stable order sent in `Connect` and `ConnectUpdate`
    pub fn tag_list(&self) -> Vec<String> {
        self.tags.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_session_config() {
        let config = SessionConfig::default();
        assert_eq!(config.game, "");
        assert_eq!(config.items_handling, 0);
        assert_eq!(config.watcher_interval, Duration::from_millis(125));
        assert_eq!(config.tag_list(), vec!["AP".to_string(), "HintGame".to_string()]);
    }
}
