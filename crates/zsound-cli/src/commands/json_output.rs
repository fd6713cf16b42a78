//! JSON output types for machine-readable CLI output.
//!
//! Printed instead of coloured text when a command runs with `--json`.

use serde::{Deserialize, Serialize};
use zsound_bank::ZsoundError;

/// Error codes for CLI-level failures. Library failures carry their own
/// `ZSOUND_XXX` codes.
pub mod error_codes {
    /// Config file could not be read or parsed
    pub const CONFIG: &str = "CLI_001";
    /// No sample survived preparation
    pub const NO_SAMPLES: &str = "CLI_002";
    /// Bank file could not be written
    pub const OUTPUT_WRITE: &str = "CLI_003";
    /// JSON serialization error
    pub const JSON_SERIALIZE: &str = "CLI_004";
}

/// A structured error in JSON output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonError {
    /// Stable error code
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// File the error belongs to, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl JsonError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            file: None,
        }
    }

    /// Wraps a library error, keeping its code.
    pub fn from_zsound(err: &ZsoundError, file: &str) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
            file: Some(file.to_string()),
        }
    }
}

/// "fmt " chunk summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FormatInfo {
    pub audio_format: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
}

/// Loop descriptor summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoopInfo {
    pub start: u32,
    pub end: u32,
    pub loop_type: u32,
    pub play_count: u32,
}

/// "smpl" chunk summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SmplInfo {
    pub manufacturer: String,
    pub product: String,
    pub midi_unity_note: u32,
    pub loops: Vec<LoopInfo>,
    pub repaired: bool,
}

/// Output of `inspect --json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InspectOutput {
    pub success: bool,
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<FormatInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smpl: Option<SmplInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_count: Option<u64>,
    pub corrupt_loop: bool,
    pub errors: Vec<JsonError>,
}

/// Output of `repair --json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepairOutput {
    pub success: bool,
    pub file: String,
    pub dry_run: bool,
    pub was_corrupt: bool,
    pub written: bool,
    pub errors: Vec<JsonError>,
}

/// One prepared sample in `bank --json` output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SampleSummary {
    pub name: String,
    pub root_note: u8,
    pub looping: bool,
    pub size: u32,
    pub temp_address: String,
    pub zsound_file: String,
}

/// Output of `bank --json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BankOutput {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
    pub samples: Vec<SampleSummary>,
    pub errors: Vec<JsonError>,
}

/// Prints `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| anyhow::anyhow!("{}: {}", error_codes::JSON_SERIALIZE, e))?;
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_from_zsound_keeps_code() {
        let err = ZsoundError::NotFound {
            what: "codebook",
            path: PathBuf::from("kick.book.bin"),
        };
        let json = JsonError::from_zsound(&err, "kick.wav");
        assert_eq!(json.code, "ZSOUND_002");
        assert_eq!(json.file.as_deref(), Some("kick.wav"));
    }

    #[test]
    fn test_optional_fields_skipped() {
        let output = RepairOutput {
            success: false,
            file: "x.wav".into(),
            dry_run: false,
            was_corrupt: false,
            written: false,
            errors: vec![JsonError::new(error_codes::CONFIG, "bad")],
        };
        let json = serde_json::to_string(&output).unwrap();
        assert!(json.contains("\"code\":\"CLI_001\""));
        assert!(!json.contains("\"file\":null"));
    }
}
