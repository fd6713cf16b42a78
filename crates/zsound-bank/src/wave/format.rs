//! "fmt " chunk encode/decode.

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};

use crate::error::{ZsoundError, ZsoundResult};

/// Size of the fixed part of the format chunk payload.
pub const FMT_FIXED_SIZE: usize = 16;

/// Decoded "fmt " chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FmtChunk {
    /// Audio format tag (1 = PCM).
    pub audio_format: u16,
    /// Number of channels.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bytes per second.
    pub byte_rate: u32,
    /// Bytes per sample frame.
    pub block_align: u16,
    /// Bits per sample.
    pub bits_per_sample: u16,
    /// Extension parameters after the fixed 16 bytes, kept opaque.
    pub extension: Vec<u8>,
}

impl FmtChunk {
    /// Decodes a format chunk payload. `offset` is the chunk header offset,
    /// used for error reporting.
    pub fn decode(payload: &[u8], offset: usize) -> ZsoundResult<Self> {
        if payload.len() < FMT_FIXED_SIZE {
            return Err(ZsoundError::format(
                offset,
                format!("fmt chunk too small: {} bytes", payload.len()),
            ));
        }

        Ok(Self {
            audio_format: LittleEndian::read_u16(&payload[0..2]),
            channels: LittleEndian::read_u16(&payload[2..4]),
            sample_rate: LittleEndian::read_u32(&payload[4..8]),
            byte_rate: LittleEndian::read_u32(&payload[8..12]),
            block_align: LittleEndian::read_u16(&payload[12..14]),
            bits_per_sample: LittleEndian::read_u16(&payload[14..16]),
            extension: payload[FMT_FIXED_SIZE..].to_vec(),
        })
    }

    /// Encodes the payload (fixed fields followed by the extension bytes).
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(FMT_FIXED_SIZE + self.extension.len());
        self.write_fixed(&mut buf).expect("writing to Vec should not fail");
        buf.extend_from_slice(&self.extension);
        buf
    }

    fn write_fixed(&self, buf: &mut Vec<u8>) -> std::io::Result<()> {
        buf.write_u16::<LittleEndian>(self.audio_format)?;
        buf.write_u16::<LittleEndian>(self.channels)?;
        buf.write_u32::<LittleEndian>(self.sample_rate)?;
        buf.write_u32::<LittleEndian>(self.byte_rate)?;
        buf.write_u16::<LittleEndian>(self.block_align)?;
        buf.write_u16::<LittleEndian>(self.bits_per_sample)?;
        Ok(())
    }

    /// Bytes per sample frame as derived from channels and bit depth.
    ///
    /// Returns `None` when the frame size would be zero.
    pub fn frame_size(&self) -> Option<u64> {
        let bytes = u64::from(self.channels) * u64::from(self.bits_per_sample) / 8;
        (bytes > 0).then_some(bytes)
    }
}
