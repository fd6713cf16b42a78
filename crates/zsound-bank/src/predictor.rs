//! VADPCM predictor decoding from encoder output files.
//!
//! The encoder writes two raw files per sample:
//!
//! - a codebook: an 8-byte header followed by big-endian `i16` coefficients,
//!   grouped 16 to a predictor;
//! - a loopbook (looping samples only): big-endian `i16` tail values, no
//!   header.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use byteorder::{BigEndian, ByteOrder};

use crate::error::{ZsoundError, ZsoundResult};

/// Bytes skipped at the start of a codebook file.
pub const CODEBOOK_HEADER_SIZE: usize = 8;

/// Coefficients per predictor group.
pub const PREDICTOR_GROUP_LEN: usize = 16;

/// One sealed group of 16 predictor coefficients.
pub type PredictorGroup = [i16; PREDICTOR_GROUP_LEN];

/// Decoded predictor tables for one sample.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predictors {
    /// Codebook groups in file order.
    pub codebook: Vec<PredictorGroup>,
    /// Loopbook values in file order; empty for non-looping samples.
    pub loopbook: Vec<i16>,
}

/// Decodes a codebook buffer into groups of 16 coefficients.
///
/// The first 8 bytes are skipped. A trailing partial group is dropped.
pub fn decode_codebook(bytes: &[u8]) -> Vec<PredictorGroup> {
    let body = bytes.get(CODEBOOK_HEADER_SIZE..).unwrap_or_default();
    let group_bytes = PREDICTOR_GROUP_LEN * 2;

    let remainder = body.len() % group_bytes;
    if remainder != 0 {
        log::warn!(
            "codebook has {} trailing byte(s) outside a full predictor group; dropped",
            remainder
        );
    }

    body.chunks_exact(group_bytes)
        .map(|chunk| {
            let mut group = [0i16; PREDICTOR_GROUP_LEN];
            BigEndian::read_i16_into(chunk, &mut group);
            group
        })
        .collect()
}

/// Decodes a loopbook buffer: every byte pair is one value.
pub fn decode_loopbook(bytes: &[u8]) -> Vec<i16> {
    bytes.chunks_exact(2).map(BigEndian::read_i16).collect()
}

/// Decodes both predictor tables from in-memory buffers.
pub fn decode_predictors(codebook: &[u8], loopbook: Option<&[u8]>) -> Predictors {
    Predictors {
        codebook: decode_codebook(codebook),
        loopbook: loopbook.map(decode_loopbook).unwrap_or_default(),
    }
}

/// Reads and decodes predictor files.
///
/// A missing codebook is fatal. A missing loopbook, when one was expected,
/// decodes as empty; pass `None` for samples that do not loop.
pub fn load_predictors(codebook: &Path, loopbook: Option<&Path>) -> ZsoundResult<Predictors> {
    let codebook_bytes = fs::read(codebook).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ZsoundError::NotFound {
            what: "codebook",
            path: codebook.to_path_buf(),
        },
        _ => ZsoundError::Io(e),
    })?;

    let loopbook_bytes = match loopbook {
        Some(path) => match fs::read(path) {
            Ok(bytes) => Some(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::warn!("loopbook {} not found; using an empty loopbook", path.display());
                None
            }
            Err(e) => return Err(ZsoundError::Io(e)),
        },
        None => None,
    };

    Ok(decode_predictors(&codebook_bytes, loopbook_bytes.as_deref()))
}
