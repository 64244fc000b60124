use crate::error::Result;

/// A single fixed-address read from a named memory domain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadRequest {
    pub address: u64,
    pub size: usize,
    pub domain: &'static str,
}

impl ReadRequest {
    pub const fn new(address: u64, size: usize, domain: &'static str) -> Self {
        Self {
            address,
            size,
            domain,
        }
    }
}

/// Read-only access to emulator memory.
///
/// Implementations return [`Error::RequestFailed`](crate::Error::RequestFailed)
/// when the emulator rejects a request but the connection is still usable,
/// so callers can skip the current poll and retry on the next one.
pub trait MemorySource {
    /// Read several ranges in one round trip, returning one buffer per request
    fn read(&mut self, requests: &[ReadRequest]) -> Result<Vec<Vec<u8>>>;

    /// Size in bytes of a memory domain
    fn memory_size(&mut self, domain: &str) -> Result<u64>;

    fn read_bytes(&mut self, address: u64, size: usize, domain: &'static str) -> Result<Vec<u8>> {
        let mut buffers = self.read(&[ReadRequest::new(address, size, domain)])?;
        Ok(buffers.pop().unwrap_or_default())
    }
}
