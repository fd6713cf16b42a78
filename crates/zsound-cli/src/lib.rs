//! wav2zsound CLI library.
//!
//! Command implementations and configuration loading for the `wav2zsound`
//! binary. The binary itself only parses arguments and dispatches here.

pub mod commands;
pub mod config;
