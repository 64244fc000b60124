//! Cartridge validation run once per emulator connection.

use tracing::{debug, error};

use crate::error::Result;
use crate::memory::MemorySource;
use crate::memory::layout::{domain, rom};

/// Outcome of checking the loaded cartridge
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RomValidation {
    Valid,
    WrongSize(u64),
    BaseGameMismatch(String),
    LockOnMismatch(String),
    /// Header bytes are not ASCII
    Undecodable,
    /// The emulator could not be queried
    Unreadable(String),
}

impl RomValidation {
    pub fn is_valid(&self) -> bool {
        matches!(self, RomValidation::Valid)
    }
}

/// Check that the emulator is running S&K with Sonic 1 locked on.
///
/// Fails closed: every failure is reported as a non-valid result, never as
/// an error, and nothing is retried here.
pub fn validate_rom<S: MemorySource + ?Sized>(source: &mut S) -> RomValidation {
    match check_rom(source) {
        Ok(result) => result,
        Err(e) => {
            debug!("ROM validation could not read memory: {}", e);
            RomValidation::Unreadable(e.to_string())
        }
    }
}

fn check_rom<S: MemorySource + ?Sized>(source: &mut S) -> Result<RomValidation> {
    let size = source.memory_size(domain::CART)?;
    if size != rom::EXPECTED_SIZE {
        debug!(
            "Cartridge size {} does not match expected {}",
            size,
            rom::EXPECTED_SIZE
        );
        return Ok(RomValidation::WrongSize(size));
    }

    let base = source.read_bytes(rom::BASE_NAME_ADDR, rom::BASE_NAME_SIZE, domain::CART)?;
    let Some(base_name) = decode_ascii(&base) else {
        return Ok(RomValidation::Undecodable);
    };
    if !base_name.starts_with(rom::BASE_NAME) {
        error!("This doesn't appear to be a vanilla Blue Sphere ROM (base ROM is not vanilla S&K).");
        return Ok(RomValidation::BaseGameMismatch(base_name));
    }

    let lock_on = source.read_bytes(
        rom::LOCK_ON_NAME_ADDR,
        rom::LOCK_ON_NAME_SIZE,
        domain::CART,
    )?;
    let Some(lock_on_name) = decode_ascii(&lock_on) else {
        return Ok(RomValidation::Undecodable);
    };
    if !lock_on_name.starts_with(rom::LOCK_ON_NAME) {
        error!(
            "You appear to have locked-on an unsupported game, if any. \
             Currently, only Sonic 1 is supported; please lock-on a Sonic 1 ROM."
        );
        return Ok(RomValidation::LockOnMismatch(lock_on_name));
    }

    Ok(RomValidation::Valid)
}

fn decode_ascii(bytes: &[u8]) -> Option<String> {
    if bytes.is_ascii() {
        Some(bytes.iter().map(|&b| b as char).collect())
    } else {
        None
    }
}
