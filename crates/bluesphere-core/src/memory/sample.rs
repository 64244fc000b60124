use crate::error::{Error, Result};
use crate::memory::layout::{domain, ram};
use crate::memory::{MemorySource, ReadRequest};

const SAMPLE_REQUESTS: [ReadRequest; 4] = [
    ReadRequest::new(ram::CURRENT_CHARACTER, ram::CURRENT_CHARACTER_SIZE, domain::RAM),
    ReadRequest::new(ram::SPHERES_LEFT, ram::SPHERES_LEFT_SIZE, domain::RAM),
    ReadRequest::new(ram::RINGS_LEFT, ram::RINGS_LEFT_SIZE, domain::RAM),
    ReadRequest::new(ram::STAGE_RESULT, ram::STAGE_RESULT_SIZE, domain::RAM),
];

/// One poll's worth of game memory
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemorySample {
    /// 0 while no stage is running
    pub current_character: u32,
    pub spheres_left: u32,
    pub rings_left: u32,
    /// Settles at 4 once the stage is cleared
    pub stage_result: u32,
}

impl MemorySample {
    pub fn new(current_character: u32, spheres_left: u32, rings_left: u32, stage_result: u32) -> Self {
        Self {
            current_character,
            spheres_left,
            rings_left,
            stage_result,
        }
    }

    /// Read all four values in a single request batch
    pub fn read<S: MemorySource + ?Sized>(source: &mut S) -> Result<Self> {
        let buffers = source.read(&SAMPLE_REQUESTS)?;
        Self::from_buffers(&buffers)
    }

    /// Decode the buffers returned for the sample requests
    pub fn from_buffers(buffers: &[Vec<u8>]) -> Result<Self> {
        if buffers.len() != SAMPLE_REQUESTS.len() {
            return Err(Error::UnexpectedResponse {
                expected: format!("{} buffers", SAMPLE_REQUESTS.len()),
                actual: format!("{} buffers", buffers.len()),
            });
        }

        for (buffer, request) in buffers.iter().zip(SAMPLE_REQUESTS.iter()) {
            if buffer.len() != request.size {
                return Err(Error::UnexpectedResponse {
                    expected: format!("{} bytes at {:#x}", request.size, request.address),
                    actual: format!("{} bytes", buffer.len()),
                });
            }
        }

        Ok(Self {
            current_character: read_be(&buffers[0]),
            spheres_left: read_be(&buffers[1]),
            rings_left: read_be(&buffers[2]),
            stage_result: read_be(&buffers[3]),
        })
    }

    /// Any nonzero counter means the game has been booted past the menu init
    pub fn has_activity(&self) -> bool {
        self.spheres_left > 0 || self.rings_left > 0 || self.stage_result > 0
    }

    pub fn in_stage(&self) -> bool {
        self.current_character != 0
    }

    pub fn is_result_cleared(&self) -> bool {
        self.stage_result == ram::STAGE_RESULT_CLEARED
    }
}

/// Decode a big-endian unsigned integer of up to four bytes
pub fn read_be(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .fold(0u32, |acc, &b| (acc << 8) | u32::from(b))
}
