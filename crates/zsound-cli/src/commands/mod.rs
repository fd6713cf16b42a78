//! CLI command implementations

pub mod bank;
pub mod inspect;
pub mod json_output;
pub mod repair;
