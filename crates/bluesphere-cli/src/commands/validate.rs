//! One-shot ROM check.

use anyhow::{Context, Result, bail};
use bluesphere_core::world::{GAME_NAME, SYSTEM};
use bluesphere_core::{Config, RomValidation, validate_rom};

use crate::bizhawk::BizHawkConnector;

pub fn run(config: &Config) -> Result<()> {
    let mut emulator = BizHawkConnector::connect(&config.bizhawk.host, config.bizhawk.port)
        .context("Failed to connect to BizHawk")?;
    emulator.ping().context("BizHawk did not answer")?;

    let system = emulator.system().context("Failed to query emulator system")?;
    if system != SYSTEM {
        bail!("Emulator is running a {} core, expected {}", system, SYSTEM);
    }

    match validate_rom(&mut emulator) {
        RomValidation::Valid => {
            println!("{} ROM OK (connector port {})", GAME_NAME, emulator.port());
            Ok(())
        }
        RomValidation::WrongSize(size) => bail!("Unexpected cartridge size: {} bytes", size),
        RomValidation::BaseGameMismatch(name) => bail!("Base ROM is not S&K: {:?}", name.trim_end()),
        RomValidation::LockOnMismatch(name) => {
            bail!("Locked-on ROM is not Sonic 1: {:?}", name.trim_end())
        }
        RomValidation::Undecodable => bail!("ROM header is not valid ASCII"),
        RomValidation::Unreadable(e) => bail!("Could not read cartridge: {}", e),
    }
}
