use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::Display;

use crate::error::{Error, Result};

/// Protocol version advertised in `Connect`
pub const PROTOCOL_VERSION: NetworkVersion = NetworkVersion {
    major: 0,
    minor: 6,
    build: 0,
    class: VersionClass::Version,
};

/// Data storage key holding the hints already revealed to a slot
pub fn read_hints_key(team: u32, slot: u32) -> String {
    format!("_read_hints_{}_{}", team, slot)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VersionClass {
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkVersion {
    pub major: u32,
    pub minor: u32,
    pub build: u32,
    pub class: VersionClass,
}

/// Packets sent to the server
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "cmd")]
pub enum ClientMessage {
    Connect {
        password: String,
        game: String,
        name: String,
        uuid: String,
        version: NetworkVersion,
        items_handling: u8,
        tags: Vec<String>,
        slot_data: bool,
    },
    ConnectUpdate {
        tags: Vec<String>,
    },
    Get {
        keys: Vec<String>,
    },
    SetNotify {
        keys: Vec<String>,
    },
    LocationScouts {
        locations: Vec<i64>,
        create_as_hint: u8,
    },
    CreateHints {
        locations: Vec<i64>,
    },
    Bounce {
        tags: Vec<String>,
        data: Value,
    },
}

/// Packets received from the server.
///
/// Only the packets this client reacts to are modelled; everything else
/// deserializes to [`ServerMessage::Other`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "cmd")]
pub enum ServerMessage {
    RoomInfo {
        #[serde(default)]
        seed_name: String,
        #[serde(default)]
        password: bool,
    },
    Connected {
        team: u32,
        slot: u32,
        #[serde(default)]
        missing_locations: Vec<i64>,
        #[serde(default)]
        checked_locations: Vec<i64>,
    },
    ConnectionRefused {
        #[serde(default)]
        errors: Vec<String>,
    },
    Retrieved {
        keys: HashMap<String, Value>,
    },
    SetReply {
        key: String,
        #[serde(default)]
        value: Value,
    },
    LocationInfo {
        #[serde(default)]
        locations: Vec<NetworkItem>,
    },
    Bounced {
        #[serde(default)]
        tags: Vec<String>,
        #[serde(default)]
        data: Value,
    },
    #[serde(rename = "PrintJSON")]
    PrintJson {
        #[serde(default)]
        data: Vec<TextPart>,
    },
    #[serde(other)]
    Other,
}

/// An item placed at a location, as reported by `LocationInfo`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkItem {
    pub item: i64,
    pub location: i64,
    pub player: u32,
    #[serde(default)]
    pub flags: u8,
}

impl NetworkItem {
    pub fn classification(&self) -> ItemClassification {
        ItemClassification::from_flags(self.flags)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ItemClassification {
    #[strum(serialize = "progression")]
    Progression,
    #[strum(serialize = "useful")]
    Useful,
    #[strum(serialize = "trap")]
    Trap,
    #[strum(serialize = "filler")]
    Filler,
}

impl ItemClassification {
    const PROGRESSION: u8 = 0b001;
    const USEFUL: u8 = 0b010;
    const TRAP: u8 = 0b100;

    /// Most significant classification wins when several flags are set
    pub fn from_flags(flags: u8) -> Self {
        if flags & Self::PROGRESSION != 0 {
            Self::Progression
        } else if flags & Self::USEFUL != 0 {
            Self::Useful
        } else if flags & Self::TRAP != 0 {
            Self::Trap
        } else {
            Self::Filler
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct TextPart {
    #[serde(default)]
    pub text: String,
}

/// Concatenate the printable text of a `PrintJSON` packet
pub fn plain_text(parts: &[TextPart]) -> String {
    parts.iter().map(|p| p.text.as_str()).collect()
}

/// Serialize one WebSocket frame (the protocol always sends arrays)
pub fn encode_frame(messages: &[ClientMessage]) -> Result<String> {
    Ok(serde_json::to_string(messages)?)
}

/// Parse one WebSocket frame
pub fn decode_frame(text: &str) -> Result<Vec<ServerMessage>> {
    serde_json::from_str(text).map_err(|e| Error::Protocol(format!("invalid frame: {}", e)))
}
