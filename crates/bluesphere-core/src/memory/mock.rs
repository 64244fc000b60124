//! In-memory [`MemorySource`] for tests

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::memory::layout::domain;
use crate::memory::{MemorySource, ReadRequest};

#[derive(Debug, Default)]
pub struct MockMemory {
    domains: HashMap<&'static str, HashMap<u64, u8>>,
    sizes: HashMap<&'static str, u64>,
    /// Number of upcoming reads that fail with `RequestFailed`
    failing_reads: usize,
}

impl MockMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bytes(mut self, domain: &'static str, address: u64, bytes: &[u8]) -> Self {
        self.write(domain, address, bytes);
        self
    }

    pub fn with_ram(self, address: u64, bytes: &[u8]) -> Self {
        self.with_bytes(domain::RAM, address, bytes)
    }

    pub fn with_size(mut self, domain: &'static str, size: u64) -> Self {
        self.sizes.insert(domain, size);
        self
    }

    pub fn write(&mut self, domain: &'static str, address: u64, bytes: &[u8]) {
        let memory = self.domains.entry(domain).or_default();
        for (i, &b) in bytes.iter().enumerate() {
            memory.insert(address + i as u64, b);
        }
    }

    pub fn fail_next_reads(&mut self, count: usize) {
        self.failing_reads = count;
    }
}

impl MemorySource for MockMemory {
    fn read(&mut self, requests: &[ReadRequest]) -> Result<Vec<Vec<u8>>> {
        if self.failing_reads > 0 {
            self.failing_reads -= 1;
            return Err(Error::RequestFailed("mock read failure".to_string()));
        }

        Ok(requests
            .iter()
            .map(|req| {
                let memory = self.domains.get(req.domain);
                (0..req.size as u64)
                    .map(|i| {
                        memory
                            .and_then(|m| m.get(&(req.address + i)))
                            .copied()
                            .unwrap_or(0)
                    })
                    .collect()
            })
            .collect())
    }

    fn memory_size(&mut self, domain: &str) -> Result<u64> {
        self.sizes
            .get(domain)
            .copied()
            .ok_or_else(|| Error::RequestFailed(format!("unknown domain {}", domain)))
    }
}
