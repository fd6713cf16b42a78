//! Shared fixtures: WAVE images and encoder output files.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use zsound_bank::predictor::CODEBOOK_HEADER_SIZE;
use zsound_bank::wave::BLANKED_LOOP_END;

/// Builds a mono 16-bit WAVE image with an optional smpl chunk.
pub fn wave_bytes(sample_rate: u32, frames: usize, smpl: Option<(u32, u32, u32)>) -> Vec<u8> {
    let mut wav = Vec::new();
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&0u32.to_le_bytes());
    wav.extend_from_slice(b"WAVE");

    let mut fmt = Vec::new();
    fmt.extend_from_slice(&1u16.to_le_bytes());
    fmt.extend_from_slice(&1u16.to_le_bytes());
    fmt.extend_from_slice(&sample_rate.to_le_bytes());
    fmt.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    fmt.extend_from_slice(&2u16.to_le_bytes());
    fmt.extend_from_slice(&16u16.to_le_bytes());
    push_chunk(&mut wav, b"fmt ", &fmt);

    push_chunk(&mut wav, b"data", &vec![0x22; frames * 2]);

    if let Some((unity_note, start, end)) = smpl {
        let mut chunk = Vec::new();
        chunk.extend_from_slice(b"ACME");
        chunk.extend_from_slice(b"SMP1");
        for value in [22675u32, unity_note, 0, 0, 0, 1, 0] {
            chunk.extend_from_slice(&value.to_le_bytes());
        }
        for value in [0u32, 0, start, end, 0, 0] {
            chunk.extend_from_slice(&value.to_le_bytes());
        }
        push_chunk(&mut wav, b"smpl", &chunk);
    }

    let riff_size = (wav.len() - 8) as u32;
    wav[4..8].copy_from_slice(&riff_size.to_le_bytes());
    wav
}

/// A WAVE image whose loop was blanked by an editor.
pub fn blanked_wave_bytes(unity_note: u32) -> Vec<u8> {
    wave_bytes(32000, 500, Some((unity_note, 0, BLANKED_LOOP_END)))
}

fn push_chunk(wav: &mut Vec<u8>, id: &[u8; 4], payload: &[u8]) {
    wav.extend_from_slice(id);
    wav.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    wav.extend_from_slice(payload);
    if payload.len() % 2 == 1 {
        wav.push(0);
    }
}

/// Big-endian codebook file contents: header plus `groups` groups.
pub fn codebook_bytes(groups: usize) -> Vec<u8> {
    let mut bytes = vec![0; CODEBOOK_HEADER_SIZE];
    for value in 0..(groups * 16) as i16 {
        bytes.extend_from_slice(&value.to_be_bytes());
    }
    bytes
}

/// Big-endian loopbook file contents.
pub fn loopbook_bytes(values: &[i16]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_be_bytes()).collect()
}

/// Writes a WAVE file and its encoder outputs into `dir`; returns the WAVE
/// path.
pub fn write_sample(
    dir: &Path,
    stem: &str,
    wav: &[u8],
    binary_size: usize,
    loopbook: Option<&[i16]>,
) -> PathBuf {
    let wav_path = dir.join(format!("{}.wav", stem));
    fs::write(&wav_path, wav).unwrap();
    fs::write(dir.join(format!("{}.vadpcm.bin", stem)), vec![0u8; binary_size]).unwrap();
    fs::write(dir.join(format!("{}.book.bin", stem)), codebook_bytes(4)).unwrap();
    if let Some(values) = loopbook {
        fs::write(dir.join(format!("{}.loopbook.bin", stem)), loopbook_bytes(values)).unwrap();
    }
    wav_path
}
