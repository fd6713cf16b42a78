//! RIFF container header and chunk scanning.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{ZsoundError, ZsoundResult};

/// RIFF container tag.
pub const RIFF_TAG: &[u8; 4] = b"RIFF";

/// WAVE form tag.
pub const WAVE_TAG: &[u8; 4] = b"WAVE";

/// Format chunk id.
pub const FMT_ID: &[u8; 4] = b"fmt ";

/// Sampler (loop metadata) chunk id.
pub const SMPL_ID: &[u8; 4] = b"smpl";

/// Data chunk id.
pub const DATA_ID: &[u8; 4] = b"data";

/// Size of the container header (tag, size, form).
pub const RIFF_HEADER_SIZE: usize = 12;

/// Size of a chunk header (id, size).
pub const CHUNK_HEADER_SIZE: usize = 8;

/// Location of a chunk inside a container image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    /// Four-character chunk id.
    pub id: [u8; 4],
    /// Payload size in bytes, excluding the pad byte.
    pub size: u32,
    /// Offset of the chunk header from the start of the container.
    pub offset: usize,
}

impl ChunkHeader {
    /// Offset of the first payload byte.
    pub fn payload_offset(&self) -> usize {
        self.offset + CHUNK_HEADER_SIZE
    }

    /// Offset of the next chunk header, accounting for the pad byte.
    pub fn next_offset(&self) -> usize {
        self.payload_offset().saturating_add(padded_len(self.size))
    }

    /// Returns the payload slice, failing if the chunk runs past the buffer.
    pub fn payload<'a>(&self, bytes: &'a [u8]) -> ZsoundResult<&'a [u8]> {
        let start = self.payload_offset();
        let end = start.checked_add(self.size as usize).ok_or_else(|| {
            ZsoundError::format(self.offset, format!("{} chunk size overflows", self.id_str()))
        })?;
        bytes.get(start..end).ok_or_else(|| {
            ZsoundError::format(
                self.offset,
                format!(
                    "truncated {} chunk: declares {} bytes, {} available",
                    self.id_str(),
                    self.size,
                    bytes.len().saturating_sub(start)
                ),
            )
        })
    }

    /// Chunk id as text, for messages.
    pub fn id_str(&self) -> String {
        String::from_utf8_lossy(&self.id).into_owned()
    }
}

/// Chunk payloads are word aligned: odd sizes are followed by one pad byte.
pub fn padded_len(size: u32) -> usize {
    (size as usize).saturating_add(size as usize & 1)
}

/// Validates the 12-byte container header and returns the declared RIFF size.
pub fn read_riff_header(bytes: &[u8]) -> ZsoundResult<u32> {
    if bytes.len() < RIFF_HEADER_SIZE {
        return Err(ZsoundError::format(
            0,
            format!(
                "file too short: {} bytes (minimum {} required)",
                bytes.len(),
                RIFF_HEADER_SIZE
            ),
        ));
    }

    if &bytes[0..4] != RIFF_TAG {
        return Err(ZsoundError::format(
            0,
            format!("invalid RIFF tag: expected 'RIFF', got {:?}", &bytes[0..4]),
        ));
    }

    if &bytes[8..12] != WAVE_TAG {
        return Err(ZsoundError::format(
            8,
            format!("invalid form tag: expected 'WAVE', got {:?}", &bytes[8..12]),
        ));
    }

    Ok(LittleEndian::read_u32(&bytes[4..8]))
}

/// Linear scan from offset 12 for the first chunk with the given id.
///
/// Unknown chunks are skipped opaquely. Returns `None` once fewer than eight
/// bytes remain.
pub fn scan_for_chunk(bytes: &[u8], id: &[u8; 4]) -> Option<ChunkHeader> {
    chunks(bytes).find(|chunk| &chunk.id == id)
}

/// Iterates over every chunk header after the container header.
pub fn chunks(bytes: &[u8]) -> ChunkIter<'_> {
    ChunkIter {
        bytes,
        offset: RIFF_HEADER_SIZE,
    }
}

/// Iterator over chunk headers in a container image.
#[derive(Debug)]
pub struct ChunkIter<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl Iterator for ChunkIter<'_> {
    type Item = ChunkHeader;

    fn next(&mut self) -> Option<ChunkHeader> {
        let end = self.offset.checked_add(CHUNK_HEADER_SIZE)?;
        let header = self.bytes.get(self.offset..end)?;

        let mut id = [0u8; 4];
        id.copy_from_slice(&header[0..4]);
        let chunk = ChunkHeader {
            id,
            size: LittleEndian::read_u32(&header[4..8]),
            offset: self.offset,
        };

        self.offset = chunk.next_offset();
        Some(chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container(chunks: &[(&[u8; 4], &[u8])]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(RIFF_TAG);
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(WAVE_TAG);
        for (id, payload) in chunks {
            bytes.extend_from_slice(*id);
            bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
            bytes.extend_from_slice(payload);
            if payload.len() % 2 == 1 {
                bytes.push(0);
            }
        }
        let riff_size = (bytes.len() - 8) as u32;
        bytes[4..8].copy_from_slice(&riff_size.to_le_bytes());
        bytes
    }

    #[test]
    fn test_padded_len() {
        assert_eq!(padded_len(0), 0);
        assert_eq!(padded_len(3), 4);
        assert_eq!(padded_len(16), 16);
    }

    #[test]
    fn test_read_riff_header() {
        let bytes = container(&[]);
        assert_eq!(read_riff_header(&bytes).unwrap(), 4);
    }

    #[test]
    fn test_read_riff_header_rejects_bad_tags() {
        let mut bytes = container(&[]);
        bytes[0..4].copy_from_slice(b"RIFX");
        assert!(matches!(
            read_riff_header(&bytes),
            Err(ZsoundError::Format { offset: 0, .. })
        ));

        let mut bytes = container(&[]);
        bytes[8..12].copy_from_slice(b"AVI ");
        assert!(matches!(
            read_riff_header(&bytes),
            Err(ZsoundError::Format { offset: 8, .. })
        ));
    }

    #[test]
    fn test_read_riff_header_too_short() {
        let err = read_riff_header(b"RIFF").unwrap_err();
        assert!(err.to_string().contains("too short"));
    }

    #[test]
    fn test_scan_skips_odd_sized_chunks() {
        let bytes = container(&[(b"junk", &[1, 2, 3]), (b"data", &[0; 4])]);
        let data = scan_for_chunk(&bytes, DATA_ID).expect("data chunk");
        // 12 header + 8 junk header + 3 payload + 1 pad
        assert_eq!(data.offset, 24);
        assert_eq!(data.size, 4);
    }

    #[test]
    fn test_scan_missing_chunk() {
        let bytes = container(&[(b"junk", &[0; 2])]);
        assert!(scan_for_chunk(&bytes, SMPL_ID).is_none());
    }

    #[test]
    fn test_scan_stops_on_partial_header() {
        let mut bytes = container(&[(b"junk", &[0; 2])]);
        bytes.extend_from_slice(b"smp");
        assert!(scan_for_chunk(&bytes, SMPL_ID).is_none());
    }

    #[test]
    fn test_payload_truncated() {
        let mut bytes = container(&[(b"fmt ", &[0; 16])]);
        bytes.truncate(bytes.len() - 4);
        let fmt = scan_for_chunk(&bytes, FMT_ID).unwrap();
        let err = fmt.payload(&bytes).unwrap_err();
        assert!(err.to_string().contains("truncated fmt  chunk"));
    }

    #[test]
    fn test_huge_chunk_size_ends_scan() {
        let mut bytes = container(&[(b"junk", &[0; 2])]);
        bytes[16..20].copy_from_slice(&u32::MAX.to_le_bytes());
        assert_eq!(chunks(&bytes).count(), 1);
    }
}
