//! Bank options file loading.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use zsound_bank::BankOptions;

/// Loads bank options from a JSON file, or the defaults when `path` is
/// `None`. Keys left out of the file keep their default value; unknown keys
/// are an error.
pub fn load_bank_options(path: Option<&Path>) -> Result<BankOptions> {
    let Some(path) = path else {
        return Ok(BankOptions::default());
    };

    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let options = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    log::debug!("loaded bank options from {}", path.display());
    Ok(options)
}
