//! Per-sample records passed from the sample pipeline to the bank builder.

use serde::Serialize;

use crate::address::TempAddress;
use crate::error::{ZsoundError, ZsoundResult};
use crate::predictor::{PredictorGroup, Predictors};
use crate::wave::WaveContainer;

/// Root note used when a file has no smpl chunk.
pub const DEFAULT_ROOT_NOTE: u8 = 60;

/// Output rate of the target audio runtime, used as the tuning reference.
pub const RUNTIME_SAMPLE_RATE: u32 = 32000;

/// Tuning and loop metadata extracted from a WAVE file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SampleMetadata {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// MIDI root note.
    pub root_note: u8,
    /// Loop start (sample index), 0 when not looping.
    pub loop_start: u32,
    /// Loop end (sample index).
    pub loop_end: u32,
    /// Total number of sample frames.
    pub num_samples: u32,
}

impl SampleMetadata {
    /// Extracts metadata from a parsed container.
    ///
    /// Without a smpl chunk the root note defaults to 60 and both loop
    /// points to 0.
    pub fn from_container(container: &WaveContainer) -> ZsoundResult<Self> {
        let root_note = match container.smpl() {
            Some(smpl) => u8::try_from(smpl.midi_unity_note)
                .ok()
                .filter(|&note| note <= 127)
                .ok_or_else(|| {
                    ZsoundError::format(
                        container.smpl_header().map_or(0, |h| h.offset),
                        format!("MIDI unity note {} out of range", smpl.midi_unity_note),
                    )
                })?,
            None => DEFAULT_ROOT_NOTE,
        };

        let (loop_start, loop_end) = container
            .first_loop()
            .map_or((0, 0), |l| (l.start, l.end));

        let num_samples = container.sample_count()?;
        let num_samples = u32::try_from(num_samples).map_err(|_| {
            ZsoundError::format(
                container.data_header().offset,
                format!("{} sample frames exceed the 32-bit loop fields", num_samples),
            )
        })?;

        Ok(Self {
            sample_rate: container.fmt().sample_rate,
            root_note,
            loop_start,
            loop_end,
            num_samples,
        })
    }

    /// Whether the sample loops. A loop starting at 0 never does.
    pub fn is_looping(&self) -> bool {
        self.loop_start != 0
    }
}

/// Tuning ratio for an instrument sound slot.
///
/// Above 1 for samples rooted below middle C, scaled by the sample rate
/// against the runtime rate.
pub fn channel_tuning(root_note: u8, sample_rate: u32) -> f32 {
    let semitones = (f64::from(root_note) - 60.0) / -12.0;
    (2f64.powf(semitones) * rate_ratio(sample_rate)) as f32
}

/// Tuning ratio for a drum sound, which plays at its recorded pitch.
pub fn key_tuning(sample_rate: u32) -> f32 {
    rate_ratio(sample_rate) as f32
}

fn rate_ratio(sample_rate: u32) -> f64 {
    f64::from(sample_rate) / f64::from(RUNTIME_SAMPLE_RATE)
}

/// File name for an encoded sample: separators become dashes and the temp
/// address is appended in upper-case hex.
pub fn zsound_file_name(name: &str, address: TempAddress) -> String {
    let stem: String = name
        .chars()
        .map(|c| if c == '_' || c == ' ' { '-' } else { c })
        .collect();
    format!("{}_{}.zsound", stem, address.to_hex())
}

/// Everything the bank builder needs to know about one sample.
///
/// Immutable once built; the loopbook is non-empty exactly when the sample
/// loops.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleRecord {
    name: String,
    size: u32,
    sample_rate: u32,
    root_note: u8,
    chan_tune: f32,
    key_tune: f32,
    temp_addr: TempAddress,
    loop_start: u32,
    loop_end: u32,
    num_samples: u32,
    codebook: Vec<PredictorGroup>,
    loopbook: Vec<i16>,
}

impl SampleRecord {
    /// Builds a record, deriving both tuning ratios from the metadata.
    ///
    /// Fails if the loopbook presence does not match the loop start.
    pub fn new(
        name: impl Into<String>,
        size: u32,
        metadata: SampleMetadata,
        temp_addr: TempAddress,
        predictors: Predictors,
    ) -> ZsoundResult<Self> {
        let name = name.into();

        if metadata.is_looping() && predictors.loopbook.is_empty() {
            return Err(ZsoundError::invalid_sample(
                name,
                format!("loops from {} but has no loopbook", metadata.loop_start),
            ));
        }
        if !metadata.is_looping() && !predictors.loopbook.is_empty() {
            return Err(ZsoundError::invalid_sample(
                name,
                "has a loopbook but does not loop",
            ));
        }

        Ok(Self {
            chan_tune: channel_tuning(metadata.root_note, metadata.sample_rate),
            key_tune: key_tuning(metadata.sample_rate),
            name,
            size,
            sample_rate: metadata.sample_rate,
            root_note: metadata.root_note,
            temp_addr,
            loop_start: metadata.loop_start,
            loop_end: metadata.loop_end,
            num_samples: metadata.num_samples,
            codebook: predictors.codebook,
            loopbook: predictors.loopbook,
        })
    }

    /// Logical sample name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size of the encoded binary in bytes.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// MIDI root note.
    pub fn root_note(&self) -> u8 {
        self.root_note
    }

    /// Instrument (channel) tuning ratio.
    pub fn chan_tune(&self) -> f32 {
        self.chan_tune
    }

    /// Drum (key) tuning ratio.
    pub fn key_tune(&self) -> f32 {
        self.key_tune
    }

    /// Placeholder address in the sample table.
    pub fn temp_addr(&self) -> TempAddress {
        self.temp_addr
    }

    /// Loop start sample index.
    pub fn loop_start(&self) -> u32 {
        self.loop_start
    }

    /// Loop end sample index.
    pub fn loop_end(&self) -> u32 {
        self.loop_end
    }

    /// Total sample frames.
    pub fn num_samples(&self) -> u32 {
        self.num_samples
    }

    /// Codebook predictor groups.
    pub fn codebook(&self) -> &[PredictorGroup] {
        &self.codebook
    }

    /// Loopbook tail values.
    pub fn loopbook(&self) -> &[i16] {
        &self.loopbook
    }

    /// Whether the sample loops.
    pub fn is_looping(&self) -> bool {
        self.loop_start != 0
    }
}
