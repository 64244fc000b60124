//! Generation entry point, kept so misuse fails loudly.

use anyhow::Result;

pub fn run() -> Result<()> {
    bluesphere_core::world::assert_generate()?;
    Ok(())
}
