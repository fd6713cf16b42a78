//! "smpl" chunk encode/decode and blanked-loop repair.
//!
//! Some sample editors save a loop descriptor with a start of 0 and an end of
//! `0xFFFFFFFF` when the user never set a loop. The encoder treats that as a
//! real loop spanning the whole address space, so such descriptors are zeroed
//! before the file is handed over.

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};

use crate::error::{ZsoundError, ZsoundResult};

/// Size of the fixed smpl header (manufacturer through sampler data size).
pub const SMPL_HEADER_SIZE: usize = 36;

/// Size of one loop descriptor.
pub const SAMPLE_LOOP_SIZE: usize = 24;

/// Manufacturer tag written into repaired files.
pub const REPAIRED_MANUFACTURER: &[u8; 4] = b"wav2";

/// Product tag written into repaired files.
pub const REPAIRED_PRODUCT: &[u8; 4] = b"zsnd";

/// End value of a blanked loop.
pub const BLANKED_LOOP_END: u32 = 0xFFFF_FFFF;

/// One loop descriptor of a smpl chunk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SampleLoop {
    /// Cue point id.
    pub id: u32,
    /// Loop type (0 = forward).
    pub loop_type: u32,
    /// First sample of the loop.
    pub start: u32,
    /// Last sample of the loop.
    pub end: u32,
    /// Fractional sample offset.
    pub fraction: u32,
    /// Play count (0 = infinite).
    pub play_count: u32,
}

impl SampleLoop {
    fn decode(bytes: &[u8]) -> Self {
        Self {
            id: LittleEndian::read_u32(&bytes[0..4]),
            loop_type: LittleEndian::read_u32(&bytes[4..8]),
            start: LittleEndian::read_u32(&bytes[8..12]),
            end: LittleEndian::read_u32(&bytes[12..16]),
            fraction: LittleEndian::read_u32(&bytes[16..20]),
            play_count: LittleEndian::read_u32(&bytes[20..24]),
        }
    }

    fn write(&self, buf: &mut Vec<u8>) -> std::io::Result<()> {
        for value in [
            self.id,
            self.loop_type,
            self.start,
            self.end,
            self.fraction,
            self.play_count,
        ] {
            buf.write_u32::<LittleEndian>(value)?;
        }
        Ok(())
    }

    /// True when the descriptor spans `0..=0xFFFFFFFF`.
    pub fn is_blanked(&self) -> bool {
        self.start == 0 && self.end == BLANKED_LOOP_END
    }
}

/// Decoded "smpl" chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmplChunk {
    /// Manufacturer tag.
    pub manufacturer: [u8; 4],
    /// Product tag.
    pub product: [u8; 4],
    /// Sample period in nanoseconds.
    pub sample_period: u32,
    /// MIDI note at which the sample plays at its recorded pitch.
    pub midi_unity_note: u32,
    /// Fraction of a semitone above the unity note.
    pub midi_pitch_fraction: u32,
    /// SMPTE format.
    pub smpte_format: u32,
    /// SMPTE offset.
    pub smpte_offset: u32,
    /// Size of the sampler-specific data following the loops.
    pub sampler_data: u32,
    /// Loop descriptors.
    pub loops: Vec<SampleLoop>,
    /// Bytes after the last loop descriptor, kept opaque.
    pub trailing: Vec<u8>,
}

impl SmplChunk {
    /// Decodes a smpl chunk payload. `offset` is the chunk header offset,
    /// used for error reporting.
    pub fn decode(payload: &[u8], offset: usize) -> ZsoundResult<Self> {
        if payload.len() < SMPL_HEADER_SIZE {
            return Err(ZsoundError::format(
                offset,
                format!("smpl chunk too small: {} bytes", payload.len()),
            ));
        }

        let num_loops = LittleEndian::read_u32(&payload[28..32]) as usize;
        let loops_end = num_loops
            .checked_mul(SAMPLE_LOOP_SIZE)
            .and_then(|len| len.checked_add(SMPL_HEADER_SIZE))
            .filter(|&end| end <= payload.len())
            .ok_or_else(|| {
                ZsoundError::format(
                    offset,
                    format!(
                        "smpl chunk declares {} loops but holds {} bytes",
                        num_loops,
                        payload.len()
                    ),
                )
            })?;

        let loops = payload[SMPL_HEADER_SIZE..loops_end]
            .chunks_exact(SAMPLE_LOOP_SIZE)
            .map(SampleLoop::decode)
            .collect();

        let mut manufacturer = [0u8; 4];
        manufacturer.copy_from_slice(&payload[0..4]);
        let mut product = [0u8; 4];
        product.copy_from_slice(&payload[4..8]);

        Ok(Self {
            manufacturer,
            product,
            sample_period: LittleEndian::read_u32(&payload[8..12]),
            midi_unity_note: LittleEndian::read_u32(&payload[12..16]),
            midi_pitch_fraction: LittleEndian::read_u32(&payload[16..20]),
            smpte_format: LittleEndian::read_u32(&payload[20..24]),
            smpte_offset: LittleEndian::read_u32(&payload[24..28]),
            sampler_data: LittleEndian::read_u32(&payload[32..36]),
            loops,
            trailing: payload[loops_end..].to_vec(),
        })
    }

    /// Encodes the payload: header, loop descriptors, then the trailing bytes.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        self.write(&mut buf).expect("writing to Vec should not fail");
        buf
    }

    fn write(&self, buf: &mut Vec<u8>) -> std::io::Result<()> {
        buf.extend_from_slice(&self.manufacturer);
        buf.extend_from_slice(&self.product);
        buf.write_u32::<LittleEndian>(self.sample_period)?;
        buf.write_u32::<LittleEndian>(self.midi_unity_note)?;
        buf.write_u32::<LittleEndian>(self.midi_pitch_fraction)?;
        buf.write_u32::<LittleEndian>(self.smpte_format)?;
        buf.write_u32::<LittleEndian>(self.smpte_offset)?;
        buf.write_u32::<LittleEndian>(self.loops.len() as u32)?;
        buf.write_u32::<LittleEndian>(self.sampler_data)?;
        for sample_loop in &self.loops {
            sample_loop.write(buf)?;
        }
        buf.extend_from_slice(&self.trailing);
        Ok(())
    }

    /// Payload length produced by [`SmplChunk::encode`].
    pub fn encoded_len(&self) -> usize {
        SMPL_HEADER_SIZE + self.loops.len() * SAMPLE_LOOP_SIZE + self.trailing.len()
    }

    /// First loop descriptor, if any.
    pub fn first_loop(&self) -> Option<&SampleLoop> {
        self.loops.first()
    }

    /// True when any loop descriptor is blanked.
    pub fn has_blanked_loop(&self) -> bool {
        self.loops.iter().any(SampleLoop::is_blanked)
    }

    /// Stamps the repaired tags and zeroes every loop descriptor.
    ///
    /// The loop count and the payload length are left unchanged.
    pub fn repair(&mut self) {
        self.manufacturer = *REPAIRED_MANUFACTURER;
        self.product = *REPAIRED_PRODUCT;
        for sample_loop in &mut self.loops {
            *sample_loop = SampleLoop::default();
        }
    }

    /// True when the tags mark a chunk this crate has repaired.
    pub fn is_repaired(&self) -> bool {
        &self.manufacturer == REPAIRED_MANUFACTURER && &self.product == REPAIRED_PRODUCT
    }
}
