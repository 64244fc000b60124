//! Main tracking mode command.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use bluesphere_core::memory::layout::timing;
use bluesphere_core::world::SYSTEM;
use bluesphere_core::{BlueSphereClient, Config, ServerMessage, SessionChannel};
use tracing::{debug, error, info, warn};

use crate::archipelago::ArchipelagoChannel;
use crate::bizhawk::BizHawkConnector;
use crate::controls::Controls;
use crate::input;

/// How long to wait for each step of the server handshake
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Run the main tracking mode
pub fn run(config: &Config) -> Result<()> {
    let slot = config
        .slot
        .clone()
        .context("No slot name given. Use --slot, BLUESPHERE_SLOT or set `slot` in the config file.")?;

    let controls = Arc::new(Controls::new());
    let controls_ctrlc = Arc::clone(&controls);
    ctrlc::set_handler(move || {
        info!("Received shutdown signal, stopping...");
        controls_ctrlc.shutdown();
    })?;

    let _keyboard_handle = input::spawn_keyboard_monitor(Arc::clone(&controls));

    info!("Blue Sphere client {}", env!("CARGO_PKG_VERSION"));
    println!("Waiting for BizHawk... (r: toggle Ring Link, Esc or q: quit)");

    let mut client = BlueSphereClient::new(config);
    let reconnect_delay = Duration::from_secs(timing::RECONNECT_DELAY_SECS);

    while !controls.is_shutdown() {
        match BizHawkConnector::connect(&config.bizhawk.host, config.bizhawk.port) {
            Ok(mut emulator) => {
                debug!("Found BizHawk connector on port {}", emulator.port());

                if let Err(e) = run_session(&mut client, &mut emulator, config, &slot, &controls) {
                    error!("Session error: {}", e);
                }
                client.reset_session();

                debug!("Session ended, waiting for reconnect...");
            }
            Err(e) => {
                debug!("BizHawk not available: {}", e);
            }
        }

        if controls.wait(reconnect_delay) {
            break;
        }
    }

    info!("Shutdown complete");
    Ok(())
}

/// Validate the ROM, connect to the server and poll until something disconnects
fn run_session(
    client: &mut BlueSphereClient,
    emulator: &mut BizHawkConnector,
    config: &Config,
    slot: &str,
    controls: &Controls,
) -> Result<()> {
    emulator.ping().context("BizHawk did not answer")?;

    let system = emulator.system().context("Failed to query emulator system")?;
    if system != SYSTEM {
        warn!("Emulator is running a {} core, expected {}", system, SYSTEM);
        return Ok(());
    }

    let validation = client.validate(emulator);
    if !validation.is_valid() {
        warn!("ROM check failed ({:?}), waiting for a supported ROM", validation);
        return Ok(());
    }

    let mut server = ArchipelagoChannel::connect(&config.server)
        .with_context(|| format!("Failed to connect to {}", config.server))?;
    handshake(client, &mut server, config, slot)?;

    println!("Connected. Get Blue Spheres!");
    let interval = client.session_config().watcher_interval;

    loop {
        if controls.take_ring_link_toggle() {
            let update = client.toggle_ring_link();
            server.send(&[update])?;
        }

        client.tick(emulator, &mut server)?;

        if controls.wait(interval) {
            return Ok(());
        }
    }
}

/// Wait for `RoomInfo`, send `Connect` and process replies up to `Connected`
fn handshake(
    client: &mut BlueSphereClient,
    server: &mut ArchipelagoChannel,
    config: &Config,
    slot: &str,
) -> Result<()> {
    let greeting = server
        .wait_for(HANDSHAKE_TIMEOUT, |m| matches!(m, ServerMessage::RoomInfo { .. }))
        .context("Server did not send room info")?;
    for message in &greeting {
        client.handle_message(message)?;
    }

    let uuid = uuid::Uuid::new_v4().to_string();
    let password = config.password.as_deref().unwrap_or_default();
    server.send(&[client.connect_message(slot, password, &uuid)])?;

    let replies = server
        .wait_for(HANDSHAKE_TIMEOUT, |m| {
            matches!(
                m,
                ServerMessage::Connected { .. } | ServerMessage::ConnectionRefused { .. }
            )
        })
        .context("Server did not answer the connection request")?;

    for message in &replies {
        let outbound = client.handle_message(message)?;
        if !outbound.is_empty() {
            server.send(&outbound)?;
        }
    }
    Ok(())
}
