//! Fuzz target for WAVE parsing and loop repair.
//!
//! Parsing arbitrary bytes must return an error or a container, never panic.
//! Parsed containers must survive repair and re-serialization without
//! changing length.
//!
//! Run with: `cargo +nightly fuzz run fuzz_wave_parse`

#![no_main]

use libfuzzer_sys::fuzz_target;
use zsound_bank::wave::chunks;
use zsound_bank::{SampleMetadata, WaveContainer};

fn exercise(bytes: &[u8]) {
    for _ in chunks(bytes) {}

    let Ok(mut container) = WaveContainer::parse(bytes) else {
        return;
    };
    let _ = container.sample_count();
    let _ = SampleMetadata::from_container(&container);

    let was_corrupt = container.repair_loop();
    assert!(!container.detect_corrupt_loop());
    assert!(!(was_corrupt && container.repair_loop()));
    assert_eq!(container.to_bytes().len(), bytes.len());
}

fuzz_target!(|data: &[u8]| {
    exercise(data);

    // Force a RIFF/WAVE header so the chunk walk is reached more often
    if data.len() >= 12 {
        let mut patched = data.to_vec();
        patched[0..4].copy_from_slice(b"RIFF");
        patched[8..12].copy_from_slice(b"WAVE");
        exercise(&patched);
    }
});
