//! Client configuration loaded from `bluesphere.toml`.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::memory::layout::timing;

/// Default config file name
pub const CONFIG_FILE: &str = "bluesphere.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Archipelago server address
    pub server: String,
    /// Slot name to connect as
    pub slot: Option<String>,
    pub password: Option<String>,
    pub poll_interval_ms: u64,
    pub bizhawk: BizHawkConfig,
    pub ring_link: RingLinkConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BizHawkConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RingLinkConfig {
    pub enabled: bool,
    /// Rings shared with linked games after a perfect clear
    pub perfect_share: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: "ws://localhost:38281".to_string(),
            slot: None,
            password: None,
            poll_interval_ms: timing::MAX_POLL_INTERVAL_MS,
            bizhawk: BizHawkConfig::default(),
            ring_link: RingLinkConfig::default(),
        }
    }
}

impl Default for BizHawkConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 43055,
        }
    }
}

impl Default for RingLinkConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            perfect_share: 50,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Poll interval, capped so the watcher never samples less often than every 125ms
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.clamp(1, timing::MAX_POLL_INTERVAL_MS))
    }

    pub fn bizhawk_address(&self) -> String {
        format!("{}:{}", self.bizhawk.host, self.bizhawk.port)
    }
}
