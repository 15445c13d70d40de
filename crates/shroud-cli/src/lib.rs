//! Library half of the `shroud` binary
//!
//! Command implementations live here so integration tests can drive them
//! without spawning a process.

pub mod commands;
pub mod output;
