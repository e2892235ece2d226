//! CLI command implementations.

pub mod common;
pub mod devices;
pub mod transpile;
pub mod version;
