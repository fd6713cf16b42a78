//! In-memory WAVE container with typed fmt/smpl/data chunks.

use std::io::{Seek, SeekFrom, Write};

use super::chunk::{read_riff_header, scan_for_chunk, ChunkHeader, DATA_ID, FMT_ID, SMPL_ID};
use super::format::FmtChunk;
use super::smpl::{SampleLoop, SmplChunk};
use crate::error::{ZsoundError, ZsoundResult};

/// A parsed RIFF/WAVE file.
///
/// Holds the original file image plus typed views of the "fmt ", "smpl" and
/// "data" chunks. The audio payload is never decoded; only the data chunk
/// size is used.
#[derive(Debug, Clone)]
pub struct WaveContainer {
    image: Vec<u8>,
    riff_size: u32,
    fmt_header: ChunkHeader,
    fmt: FmtChunk,
    smpl: Option<(ChunkHeader, SmplChunk)>,
    data_header: ChunkHeader,
}

impl WaveContainer {
    /// Parses a WAVE file image.
    ///
    /// Fails if the RIFF/WAVE tags are wrong or the "fmt " or "data" chunk is
    /// missing. A missing "smpl" chunk is not an error.
    pub fn parse(bytes: &[u8]) -> ZsoundResult<Self> {
        let riff_size = read_riff_header(bytes)?;

        let fmt_header = scan_for_chunk(bytes, FMT_ID)
            .ok_or_else(|| ZsoundError::format(bytes.len(), "no fmt chunk in RIFF"))?;
        let fmt = FmtChunk::decode(fmt_header.payload(bytes)?, fmt_header.offset)?;
        log::debug!(
            "fmt chunk at {:#x}: format {}, {} ch, {} Hz, {} bits",
            fmt_header.offset,
            fmt.audio_format,
            fmt.channels,
            fmt.sample_rate,
            fmt.bits_per_sample
        );

        let smpl = match scan_for_chunk(bytes, SMPL_ID) {
            Some(header) => {
                let chunk = SmplChunk::decode(header.payload(bytes)?, header.offset)?;
                log::debug!(
                    "smpl chunk at {:#x}: unity note {}, {} loop(s)",
                    header.offset,
                    chunk.midi_unity_note,
                    chunk.loops.len()
                );
                Some((header, chunk))
            }
            None => None,
        };

        // The data payload is never read, so a short final chunk is tolerated.
        let data_header = scan_for_chunk(bytes, DATA_ID)
            .ok_or_else(|| ZsoundError::format(bytes.len(), "no data chunk in RIFF"))?;

        Ok(Self {
            image: bytes.to_vec(),
            riff_size,
            fmt_header,
            fmt,
            smpl,
            data_header,
        })
    }

    /// Declared RIFF size from the container header.
    pub fn riff_size(&self) -> u32 {
        self.riff_size
    }

    /// The format chunk.
    pub fn fmt(&self) -> &FmtChunk {
        &self.fmt
    }

    /// The loop metadata chunk, if present.
    pub fn smpl(&self) -> Option<&SmplChunk> {
        self.smpl.as_ref().map(|(_, chunk)| chunk)
    }

    /// Location of the loop metadata chunk, if present.
    pub fn smpl_header(&self) -> Option<&ChunkHeader> {
        self.smpl.as_ref().map(|(header, _)| header)
    }

    /// Location of the data chunk.
    pub fn data_header(&self) -> &ChunkHeader {
        &self.data_header
    }

    /// Data chunk payload size in bytes.
    pub fn data_size(&self) -> u32 {
        self.data_header.size
    }

    /// First loop descriptor, if the file has one.
    pub fn first_loop(&self) -> Option<&SampleLoop> {
        self.smpl().and_then(SmplChunk::first_loop)
    }

    /// True iff a loop descriptor has start 0 and end 0xFFFFFFFF.
    pub fn detect_corrupt_loop(&self) -> bool {
        self.smpl().is_some_and(SmplChunk::has_blanked_loop)
    }

    /// Repairs a blanked loop in memory.
    ///
    /// Returns `true` if the chunk was patched. Calling it again is a no-op
    /// because the repaired chunk no longer matches the corruption predicate.
    /// Use [`WaveContainer::flush`] to write the patch back.
    pub fn repair_loop(&mut self) -> bool {
        if !self.detect_corrupt_loop() {
            return false;
        }
        match self.smpl.as_mut() {
            Some((_, chunk)) => {
                chunk.repair();
                true
            }
            None => false,
        }
    }

    /// Number of sample frames in the data chunk.
    pub fn sample_count(&self) -> ZsoundResult<u64> {
        let frame_size = self.fmt.frame_size().ok_or(ZsoundError::Arithmetic {
            channels: self.fmt.channels,
            bits_per_sample: self.fmt.bits_per_sample,
        })?;
        Ok(u64::from(self.data_header.size) / frame_size)
    }

    /// The original file image as parsed.
    pub fn original_bytes(&self) -> &[u8] {
        &self.image
    }

    /// Re-serializes the container: the original image with the fmt and smpl
    /// payloads re-encoded in place.
    ///
    /// Chunk sizes never change, so no other byte moves.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = self.image.clone();
        splice(&mut bytes, &self.fmt_header, &self.fmt.encode());
        if let Some((header, chunk)) = &self.smpl {
            splice(&mut bytes, header, &chunk.encode());
        }
        bytes
    }

    /// Writes the current smpl payload back at its original file offset.
    ///
    /// Returns `false` (and writes nothing) when there is no smpl chunk.
    pub fn flush<W: Write + Seek>(&self, writer: &mut W) -> ZsoundResult<bool> {
        let Some((header, chunk)) = &self.smpl else {
            return Ok(false);
        };

        let payload = chunk.encode();
        debug_assert_eq!(payload.len(), header.size as usize);
        writer.seek(SeekFrom::Start(header.payload_offset() as u64))?;
        writer.write_all(&payload)?;
        writer.flush()?;
        Ok(true)
    }
}

fn splice(bytes: &mut [u8], header: &ChunkHeader, payload: &[u8]) {
    let start = header.payload_offset();
    bytes[start..start + payload.len()].copy_from_slice(payload);
}
