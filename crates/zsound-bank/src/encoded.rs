//! Encoder output files and per-sample record assembly.
//!
//! The external encoder is never invoked here. For a sample stem it is
//! expected to have written `{stem}.vadpcm.bin`, `{stem}.book.bin` and, for
//! looping samples, `{stem}.loopbook.bin` into one directory.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::address::TempAddress;
use crate::error::{ZsoundError, ZsoundResult};
use crate::layout::{BankLayout, MAX_SAMPLE_BYTES};
use crate::predictor::{load_predictors, Predictors};
use crate::sample::{SampleMetadata, SampleRecord};
use crate::wave::repair_wave_file;

pub const BINARY_SUFFIX: &str = ".vadpcm.bin";
pub const CODEBOOK_SUFFIX: &str = ".book.bin";
pub const LOOPBOOK_SUFFIX: &str = ".loopbook.bin";

/// Paths of one sample's encoder outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderOutputs {
    pub binary: PathBuf,
    pub codebook: PathBuf,
    pub loopbook: PathBuf,
}

impl EncoderOutputs {
    /// Output paths for `stem` inside `dir`.
    pub fn locate(dir: &Path, stem: &str) -> Self {
        Self {
            binary: dir.join(format!("{}{}", stem, BINARY_SUFFIX)),
            codebook: dir.join(format!("{}{}", stem, CODEBOOK_SUFFIX)),
            loopbook: dir.join(format!("{}{}", stem, LOOPBOOK_SUFFIX)),
        }
    }

    /// Size of the encoded binary, checked against the descriptor's 24-bit
    /// size field.
    pub fn binary_size(&self, name: &str) -> ZsoundResult<u32> {
        let metadata = fs::metadata(&self.binary).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ZsoundError::NotFound {
                what: "encoded binary",
                path: self.binary.clone(),
            },
            _ => ZsoundError::Io(e),
        })?;

        let size = metadata.len();
        if size > u64::from(MAX_SAMPLE_BYTES) {
            return Err(ZsoundError::SampleTooLarge {
                name: name.to_string(),
                size,
            });
        }
        Ok(size as u32)
    }

    /// Decodes the predictor files. The loopbook is only read for looping
    /// samples.
    pub fn load_predictors(&self, looping: bool) -> ZsoundResult<Predictors> {
        let loopbook = looping.then_some(self.loopbook.as_path());
        load_predictors(&self.codebook, loopbook)
    }
}

/// Logical sample name for a WAVE path: the file stem.
pub fn sample_name(wav: &Path) -> String {
    wav.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Builds the record for one sample.
///
/// Repairs a blanked loop in the WAVE file (unless `dry_run`), reads its
/// metadata and the encoder outputs, and attaches `address`. The record is
/// checked against the bank's table limits, so a sample that could never be
/// laid out fails here and not when its bank is built.
pub fn prepare_sample(
    wav: &Path,
    outputs: &EncoderOutputs,
    address: TempAddress,
    dry_run: bool,
) -> ZsoundResult<SampleRecord> {
    let name = sample_name(wav);
    let repaired = repair_wave_file(wav, dry_run)?;
    let metadata = SampleMetadata::from_container(&repaired.container)?;
    log::debug!(
        "{}: {} Hz, root {}, loop {}..{}, {} frames",
        name,
        metadata.sample_rate,
        metadata.root_note,
        metadata.loop_start,
        metadata.loop_end,
        metadata.num_samples
    );

    let size = outputs.binary_size(&name)?;
    let predictors = outputs.load_predictors(metadata.is_looping())?;
    let record = SampleRecord::new(name, size, metadata, address, predictors)?;
    BankLayout::validate_sample(&record)?;
    Ok(record)
}
