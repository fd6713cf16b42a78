//! Error types for the zsound core.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for zsound operations.
pub type ZsoundResult<T> = Result<T, ZsoundError>;

/// Errors that can occur while reading samples or laying out a bank.
///
/// Every error is scoped to a single unit of work (one file or one sample);
/// callers decide whether to skip the unit or abort the batch.
#[derive(Debug, Error)]
pub enum ZsoundError {
    /// Malformed container: bad magic, missing or truncated chunk.
    #[error("format error at offset {offset}: {message}")]
    Format {
        /// Byte offset where the problem was detected.
        offset: usize,
        /// Error message.
        message: String,
    },

    /// A file that must exist is missing.
    #[error("{what} not found: {}", path.display())]
    NotFound {
        /// Kind of file (e.g. "codebook").
        what: &'static str,
        /// Path that was looked up.
        path: PathBuf,
    },

    /// Frame size computed from the format chunk is zero.
    #[error("cannot derive sample count: {channels} channel(s) at {bits_per_sample} bits")]
    Arithmetic {
        /// Channel count from the format chunk.
        channels: u16,
        /// Bits per sample from the format chunk.
        bits_per_sample: u16,
    },

    /// Sample binary does not fit the 24-bit size field of a sample descriptor.
    #[error("sample '{name}' is {size} bytes, larger than the 24-bit descriptor limit")]
    SampleTooLarge {
        /// Sample name.
        name: String,
        /// Binary size in bytes.
        size: u64,
    },

    /// A bank holds between one and three samples.
    #[error("a bank holds 1 to 3 samples, got {count}")]
    InvalidSampleCount {
        /// Number of samples supplied.
        count: usize,
    },

    /// A sample record breaks one of its invariants.
    #[error("invalid sample '{name}': {message}")]
    InvalidSample {
        /// Sample name.
        name: String,
        /// Error message.
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ZsoundError {
    /// Creates a format error.
    pub fn format(offset: usize, message: impl Into<String>) -> Self {
        Self::Format {
            offset,
            message: message.into(),
        }
    }

    /// Creates an invalid sample error.
    pub fn invalid_sample(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSample {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Stable error code for reporting.
    pub fn code(&self) -> &'static str {
        match self {
            ZsoundError::Format { .. } => "ZSOUND_001",
            ZsoundError::NotFound { .. } => "ZSOUND_002",
            ZsoundError::Arithmetic { .. } => "ZSOUND_003",
            ZsoundError::SampleTooLarge { .. } => "ZSOUND_004",
            ZsoundError::InvalidSampleCount { .. } => "ZSOUND_005",
            ZsoundError::InvalidSample { .. } => "ZSOUND_006",
            ZsoundError::Io(_) => "ZSOUND_007",
        }
    }

    /// Error category for grouping related errors.
    pub fn category(&self) -> &'static str {
        match self {
            ZsoundError::Format { .. } | ZsoundError::Arithmetic { .. } => "wave",
            ZsoundError::NotFound { .. } => "predictor",
            ZsoundError::SampleTooLarge { .. }
            | ZsoundError::InvalidSampleCount { .. }
            | ZsoundError::InvalidSample { .. } => "bank",
            ZsoundError::Io(_) => "io",
        }
    }
}
