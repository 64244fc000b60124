//! CLI command implementations.

pub mod generate;
pub mod tracking;
pub mod validate;
