//! Game registration metadata.
//!
//! Blue Sphere is a hint game: it has no items or locations of its own and
//! joins an existing multiworld by connecting to any slot.

use crate::error::{Error, Result};

pub const GAME_NAME: &str = "Blue Sphere";
/// Emulated system identifier
pub const SYSTEM: &str = "GEN";

const GENERATION_UNSUPPORTED: &str = "Blue Sphere is a hint game and cannot be used to generate worlds. \
     Instead, connect to any existing slot to play.";

/// Refuse world generation.
///
/// Always fails: this client structurally cannot produce a generated world.
pub fn assert_generate() -> Result<()> {
    Err(Error::GenerationUnsupported(GENERATION_UNSUPPORTED))
}
