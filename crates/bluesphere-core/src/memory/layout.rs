//! Memory layout constants for Blue Sphere
//!
//! Addresses are offsets into the emulator's memory domains. The Genesis is
//! big-endian, so multi-byte values are decoded most significant byte first.

/// Memory domain names as exposed by the emulator
pub mod domain {
    /// Main 68000 work RAM
    pub const RAM: &str = "68K RAM";
    /// Cartridge image, including the locked-on ROM
    pub const CART: &str = "MD CART";
}

/// Work RAM addresses polled every tick
pub mod ram {
    /// Current character (0 when no stage is running, nonzero player id otherwise)
    pub const CURRENT_CHARACTER: u64 = 0xB00F;
    pub const CURRENT_CHARACTER_SIZE: usize = 1;

    pub const SPHERES_LEFT: u64 = 0xE438;
    pub const SPHERES_LEFT_SIZE: usize = 2;

    pub const RINGS_LEFT: u64 = 0xE442;
    pub const RINGS_LEFT_SIZE: usize = 2;

    /// Counts up to [`STAGE_RESULT_CLEARED`] once the stage is beaten
    pub const STAGE_RESULT: u64 = 0xE44C;
    pub const STAGE_RESULT_SIZE: usize = 1;

    pub const STAGE_RESULT_CLEARED: u32 = 4;
}

/// Cartridge header layout used to identify the game
pub mod rom {
    /// S&K (2 MiB) with a 512 KiB Sonic 1 image locked on
    pub const EXPECTED_SIZE: u64 = 2_621_440;

    pub const BASE_NAME_ADDR: u64 = 0x150;
    pub const BASE_NAME_SIZE: usize = 16;
    pub const BASE_NAME: &str = "SONIC & KNUCKLES";

    pub const LOCK_ON_NAME_ADDR: u64 = 0x200150;
    pub const LOCK_ON_NAME_SIZE: usize = 32;
    pub const LOCK_ON_NAME: &str = "SONIC THE               HEDGEHOG";
}

/// Timing constants for polling
pub mod timing {
    /// Upper bound for the interval between memory polls (ms)
    pub const MAX_POLL_INTERVAL_MS: u64 = 125;

    /// Delay before reconnecting to the emulator or server (s)
    pub const RECONNECT_DELAY_SECS: u64 = 5;
}
