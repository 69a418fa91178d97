//! CLI command implementations.

pub mod common;
pub mod settings;
pub mod simulate;
