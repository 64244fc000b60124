//! # bluesphere-core
//!
//! Core library for the Blue Sphere hint client.
//!
//! This crate provides:
//! - Emulator memory layout and sampling behind the [`MemorySource`] trait
//! - Cartridge validation (S&K with Sonic 1 locked on)
//! - The stage state machine that turns memory samples into hint actions
//! - Archipelago packet types and the [`SessionChannel`] trait
//! - The Ring Link relay
//!
//! Transports (the BizHawk connector and the server WebSocket) live in the
//! CLI crate.

pub mod client;
pub mod config;
pub mod error;
pub mod memory;
pub mod ring_link;
pub mod session;
pub mod validation;
pub mod watcher;
pub mod world;

pub use client::{BlueSphereClient, SlotInfo};
pub use config::Config;
pub use error::{Error, Result};
pub use memory::{MemorySample, MemorySource, ReadRequest};
pub use ring_link::{Relay, RingLink};
pub use session::{ClientMessage, ServerMessage, SessionChannel, SessionConfig};
pub use validation::{RomValidation, validate_rom};
pub use watcher::{Action, HintCache, HintSet, StageCleared, StageWatcher, WatcherState};
