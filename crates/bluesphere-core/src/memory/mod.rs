pub mod layout;
mod sample;
mod source;

#[cfg(test)]
pub mod mock;

pub use sample::*;
pub use source::{MemorySource, ReadRequest};

#[cfg(test)]
pub use mock::MockMemory;
