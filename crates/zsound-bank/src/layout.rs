//! Bank memory layout.
//!
//! Places one instrument, N drums, one shared envelope and N samples with
//! their predictor tables in a flat address space. Section bases are
//! cumulative fixed-size offsets from the bank start; every pointer in the
//! bank document is derived from them.

use serde::Serialize;

use crate::error::{ZsoundError, ZsoundResult};
use crate::sample::SampleRecord;

/// Most samples one bank can hold.
pub const MAX_SAMPLES: usize = 3;

/// Fixed address of the drum list.
pub const DRUM_LIST_ADDR: u32 = 0x10;

/// Size of one instrument record.
pub const INSTRUMENT_SIZE: u32 = 0x20;
/// Size of one drum record.
pub const DRUM_SIZE: u32 = 0x10;
/// Size of the shared envelope.
pub const ENVELOPE_SIZE: u32 = 0x10;
/// Size of one sample descriptor.
pub const SAMPLE_SIZE: u32 = 0x10;
/// Size of one codebook record: header plus four predictor groups.
pub const CODEBOOK_SIZE: u32 = 0x90;
/// Size of a loop record without a tail.
pub const LOOP_RECORD_SIZE: u32 = 0x10;
/// Extra bytes a looping sample's loop record carries for its tail.
pub const LOOP_TAIL_SIZE: u32 = 0x20;

/// Predictor groups that fit a codebook record.
pub const MAX_CODEBOOK_GROUPS: usize = 4;
/// Tail values that fit a loop record.
pub const MAX_LOOPBOOK_LEN: usize = 16;
/// Largest binary size the 24-bit descriptor field can hold.
pub const MAX_SAMPLE_BYTES: u32 = 0x00FF_FFFF;

/// Offset from a MIDI note to the runtime's key-region scale.
pub const KEY_REGION_OFFSET: u8 = 21;
/// Key-region high bound when there is no high split.
pub const KEY_REGION_MAX: u8 = 127;

/// Codec id for ADPCM in the sample descriptor.
pub const CODEC_ADPCM: u8 = 0;
/// Storage medium id for RAM in the sample descriptor.
pub const MEDIUM_RAM: u8 = 0;

/// Section base addresses and total length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SectionBases {
    /// Drum list, always at 0x10
    pub drumlist: u32,
    /// First instrument record
    pub instrument: u32,
    /// First drum record
    pub drum: u32,
    /// Shared envelope
    pub envelope: u32,
    /// First sample descriptor
    pub sample: u32,
    /// First codebook record
    pub codebook: u32,
    /// First loop record
    pub loopbook: u32,
    /// Total bank size in bytes
    pub bank_length: u32,
}

impl SectionBases {
    /// Computes the bases for `count` samples, `looping` of which loop.
    ///
    /// Order is drum list, instruments, drums, envelope, sample descriptors,
    /// codebooks, loop records.
    pub fn compute(count: u32, looping: u32) -> Self {
        let instrument = INSTRUMENT_SIZE * count;
        let drum = instrument + INSTRUMENT_SIZE;
        let envelope = drum + DRUM_SIZE * count;
        let sample = envelope + ENVELOPE_SIZE;
        let codebook = sample + SAMPLE_SIZE * count;
        let loopbook = codebook + CODEBOOK_SIZE * count;
        let bank_length = loopbook + LOOP_RECORD_SIZE * count + LOOP_TAIL_SIZE * looping;

        Self {
            drumlist: DRUM_LIST_ADDR,
            instrument,
            drum,
            envelope,
            sample,
            codebook,
            loopbook,
            bank_length,
        }
    }
}

/// The packed 32-bit word at the start of a sample descriptor.
///
/// From the most significant bit: 1 reserved bit, 3 bits codec, 2 bits
/// medium, 1 bit cached, 1 bit relocated, 24 bits binary size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SampleDescriptorBits {
    /// Codec id (3 bits)
    pub codec: u8,
    /// Storage medium id (2 bits)
    pub medium: u8,
    /// Cached flag
    pub cached: bool,
    /// Relocated flag
    pub relocated: bool,
    /// Encoded binary size in bytes (24 bits)
    pub size: u32,
}

impl SampleDescriptorBits {
    /// Descriptor for a cached, non-relocated ADPCM sample in RAM.
    ///
    /// Fails if `size` does not fit 24 bits.
    pub fn for_sample(name: &str, size: u32) -> ZsoundResult<Self> {
        if size > MAX_SAMPLE_BYTES {
            return Err(ZsoundError::SampleTooLarge {
                name: name.to_string(),
                size: u64::from(size),
            });
        }
        Ok(Self {
            codec: CODEC_ADPCM,
            medium: MEDIUM_RAM,
            cached: true,
            relocated: false,
            size,
        })
    }

    /// Packs the fields into the descriptor's first word.
    pub fn pack(&self) -> u32 {
        (u32::from(self.codec) & 0x7) << 28
            | (u32::from(self.medium) & 0x3) << 26
            | u32::from(self.cached) << 25
            | u32::from(self.relocated) << 24
            | (self.size & MAX_SAMPLE_BYTES)
    }

    /// Splits a packed word back into its fields.
    pub fn unpack(bits: u32) -> Self {
        Self {
            codec: ((bits >> 28) & 0x7) as u8,
            medium: ((bits >> 26) & 0x3) as u8,
            cached: bits & (1 << 25) != 0,
            relocated: bits & (1 << 24) != 0,
            size: bits & MAX_SAMPLE_BYTES,
        }
    }
}

/// Loop record contents for one sample.
///
/// A sample whose loop starts at 0 never loops: its record plays the whole
/// sample once and has no tail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoopRecord {
    /// Loop start frame
    pub start: u32,
    /// Loop end frame, or the frame count when the sample does not loop
    pub end: u32,
    /// -1 repeats forever.
    pub count: i32,
    /// Sample count for looping records, 0 otherwise.
    pub sample_count: u32,
    /// Loopbook values; empty when the sample does not loop
    pub tail: Vec<i16>,
}

impl LoopRecord {
    /// Builds the record from a sample's loop points and loopbook.
    pub fn for_sample(sample: &SampleRecord) -> Self {
        if sample.is_looping() {
            Self {
                start: sample.loop_start(),
                end: sample.loop_end(),
                count: -1,
                sample_count: sample.num_samples(),
                tail: sample.loopbook().to_vec(),
            }
        } else {
            Self {
                start: sample.loop_start(),
                end: sample.num_samples(),
                count: 0,
                sample_count: 0,
                tail: Vec::new(),
            }
        }
    }

    /// Whether the record carries a loopbook tail.
    pub fn has_tail(&self) -> bool {
        self.count != 0
    }

    /// Bytes this record occupies in the loop section.
    pub fn size(&self) -> u32 {
        if self.has_tail() {
            LOOP_RECORD_SIZE + LOOP_TAIL_SIZE
        } else {
            LOOP_RECORD_SIZE
        }
    }
}

/// How the instrument's three sound slots map onto the bank's samples.
///
/// Indices point into [`BankLayout::samples`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InstrumentSplit {
    /// Sample played below the key region
    pub low: Option<usize>,
    /// Sample played inside the key region
    pub primary: usize,
    /// Sample played above the key region
    pub high: Option<usize>,
    /// Lowest key of the primary region
    pub key_region_low: u8,
    /// Highest key of the primary region
    pub key_region_high: u8,
}

impl InstrumentSplit {
    /// Assigns roles over samples already sorted by ascending root note.
    ///
    /// One sample is the primary. With two, the higher one is the sole
    /// primary. With three, the lowest and highest become the low and high
    /// splits around the middle primary.
    fn for_sorted(samples: &[SampleRecord]) -> Self {
        match samples {
            [_, primary, high] => Self {
                low: Some(0),
                primary: 1,
                high: Some(2),
                key_region_low: key_region(primary.root_note()),
                key_region_high: key_region(high.root_note()),
            },
            _ => Self {
                low: None,
                primary: samples.len().saturating_sub(1),
                high: None,
                key_region_low: 0,
                key_region_high: KEY_REGION_MAX,
            },
        }
    }
}

fn key_region(root_note: u8) -> u8 {
    root_note.saturating_sub(KEY_REGION_OFFSET)
}

/// The computed placement of a bank's samples.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BankLayout {
    samples: Vec<SampleRecord>,
    bases: SectionBases,
    split: InstrumentSplit,
    descriptors: Vec<SampleDescriptorBits>,
    loops: Vec<LoopRecord>,
    loop_offsets: Vec<u32>,
}

impl BankLayout {
    /// Lays out 1 to 3 samples.
    ///
    /// Samples are ordered by ascending root note (ties keep input order)
    /// and every section lists them in that order.
    pub fn compute(samples: &[SampleRecord]) -> ZsoundResult<Self> {
        if samples.is_empty() || samples.len() > MAX_SAMPLES {
            return Err(ZsoundError::InvalidSampleCount {
                count: samples.len(),
            });
        }

        let mut samples = samples.to_vec();
        samples.sort_by_key(SampleRecord::root_note);

        let descriptors = samples
            .iter()
            .map(BankLayout::validate_sample)
            .collect::<ZsoundResult<Vec<_>>>()?;

        let loops: Vec<LoopRecord> = samples.iter().map(LoopRecord::for_sample).collect();
        let loop_offsets = loops
            .iter()
            .scan(0u32, |offset, record| {
                let this = *offset;
                *offset += record.size();
                Some(this)
            })
            .collect();

        let looping = loops.iter().filter(|l| l.has_tail()).count() as u32;
        let bases = SectionBases::compute(samples.len() as u32, looping);
        let split = InstrumentSplit::for_sorted(&samples);

        log::debug!(
            "bank layout for {} sample(s): instrument {:#x}, drum {:#x}, envelope {:#x}, sample {:#x}, codebook {:#x}, loopbook {:#x}, length {:#x}",
            samples.len(),
            bases.instrument,
            bases.drum,
            bases.envelope,
            bases.sample,
            bases.codebook,
            bases.loopbook,
            bases.bank_length
        );

        Ok(Self {
            samples,
            bases,
            split,
            descriptors,
            loops,
            loop_offsets,
        })
    }

    /// Checks that one sample fits a bank on its own: 1 to 4 codebook groups,
    /// at most 16 loopbook values and a binary size that fits 24 bits.
    ///
    /// Returns the sample's descriptor bits. Running this per sample before
    /// [`BankLayout::compute`] lets a caller drop a bad sample and keep the rest.
    pub fn validate_sample(sample: &SampleRecord) -> ZsoundResult<SampleDescriptorBits> {
        validate_tables(sample)?;
        SampleDescriptorBits::for_sample(sample.name(), sample.size())
    }

    /// Samples in layout order.
    pub fn samples(&self) -> &[SampleRecord] {
        &self.samples
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false for a computed layout.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Section base addresses.
    pub fn bases(&self) -> &SectionBases {
        &self.bases
    }

    /// Total bank size in bytes.
    pub fn bank_length(&self) -> u32 {
        self.bases.bank_length
    }

    /// Instrument sound-slot roles and key region.
    pub fn split(&self) -> &InstrumentSplit {
        &self.split
    }

    /// Descriptor bits of sample `index`.
    pub fn descriptor(&self, index: usize) -> &SampleDescriptorBits {
        &self.descriptors[index]
    }

    /// Loop record of sample `index`.
    pub fn loop_record(&self, index: usize) -> &LoopRecord {
        &self.loops[index]
    }

    /// Address of drum record `index`.
    pub fn drum_addr(&self, index: usize) -> u32 {
        self.bases.drum + DRUM_SIZE * index as u32
    }

    /// Address of sample descriptor `index`.
    pub fn sample_addr(&self, index: usize) -> u32 {
        self.bases.sample + SAMPLE_SIZE * index as u32
    }

    /// Address of codebook record `index`.
    pub fn codebook_addr(&self, index: usize) -> u32 {
        self.bases.codebook + CODEBOOK_SIZE * index as u32
    }

    /// Loop records are packed back to back, so the offset depends on the
    /// sizes of the records before `index`.
    pub fn loop_addr(&self, index: usize) -> u32 {
        self.bases.loopbook + self.loop_offsets[index]
    }
}

fn validate_tables(sample: &SampleRecord) -> ZsoundResult<()> {
    let groups = sample.codebook().len();
    if groups == 0 {
        return Err(ZsoundError::invalid_sample(sample.name(), "codebook is empty"));
    }
    if groups > MAX_CODEBOOK_GROUPS {
        return Err(ZsoundError::invalid_sample(
            sample.name(),
            format!(
                "codebook has {} predictor groups, at most {} fit",
                groups, MAX_CODEBOOK_GROUPS
            ),
        ));
    }
    if sample.loopbook().len() > MAX_LOOPBOOK_LEN {
        return Err(ZsoundError::invalid_sample(
            sample.name(),
            format!(
                "loopbook has {} values, at most {} fit",
                sample.loopbook().len(),
                MAX_LOOPBOOK_LEN
            ),
        ));
    }
    Ok(())
}
