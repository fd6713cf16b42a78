//! On-disk loop repair tests.

mod common;

use std::fs;

use zsound_bank::wave::{
    load_wave, repair_wave_file, REPAIRED_MANUFACTURER, REPAIRED_PRODUCT, SMPL_HEADER_SIZE,
};
use zsound_bank::ZsoundError;

use common::{blanked_wave_bytes, wave_bytes};

#[test]
fn test_repair_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pad.wav");
    let original = blanked_wave_bytes(60);
    fs::write(&path, &original).unwrap();

    let outcome = repair_wave_file(&path, false).unwrap();
    assert!(outcome.was_corrupt);
    assert!(outcome.written);

    let patched = fs::read(&path).unwrap();
    assert_eq!(patched.len(), original.len());

    let header = *outcome.container.smpl_header().unwrap();
    let start = header.payload_offset();
    let end = start + header.size as usize;
    assert_eq!(&patched[..start], &original[..start]);
    assert_eq!(&patched[end..], &original[end..]);
    assert_eq!(&patched[start..start + 4], REPAIRED_MANUFACTURER);
    assert_eq!(&patched[start + 4..start + 8], REPAIRED_PRODUCT);
    assert!(patched[start + SMPL_HEADER_SIZE..end].iter().all(|&b| b == 0));

    let reloaded = load_wave(&path).unwrap();
    assert!(!reloaded.detect_corrupt_loop());
    assert_eq!(reloaded.smpl().unwrap().midi_unity_note, 60);
}

#[test]
fn test_repair_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pad.wav");
    fs::write(&path, blanked_wave_bytes(48)).unwrap();

    repair_wave_file(&path, false).unwrap();
    let once = fs::read(&path).unwrap();

    let second = repair_wave_file(&path, false).unwrap();
    assert!(!second.was_corrupt);
    assert!(!second.written);
    assert_eq!(fs::read(&path).unwrap(), once);
}

#[test]
fn test_dry_run_leaves_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pad.wav");
    let original = blanked_wave_bytes(60);
    fs::write(&path, &original).unwrap();

    let outcome = repair_wave_file(&path, true).unwrap();
    assert!(outcome.was_corrupt);
    assert!(!outcome.written);
    assert_eq!(fs::read(&path).unwrap(), original);
}

#[test]
fn test_intact_loop_is_not_rewritten() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lead.wav");
    let original = wave_bytes(44100, 300, Some((69, 128, 290)));
    fs::write(&path, &original).unwrap();

    let outcome = repair_wave_file(&path, false).unwrap();
    assert!(!outcome.was_corrupt);
    assert_eq!(fs::read(&path).unwrap(), original);
}

#[test]
fn test_intact_read_only_file_needs_no_write_access() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("locked.wav");
    let original = wave_bytes(32000, 300, Some((60, 128, 290)));
    fs::write(&path, &original).unwrap();

    let mut permissions = fs::metadata(&path).unwrap().permissions();
    permissions.set_readonly(true);
    fs::set_permissions(&path, permissions).unwrap();

    let outcome = repair_wave_file(&path, false).unwrap();
    assert!(!outcome.was_corrupt);
    assert!(!outcome.written);
    assert_eq!(fs::read(&path).unwrap(), original);
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = repair_wave_file(&dir.path().join("absent.wav"), false).unwrap_err();
    assert!(matches!(err, ZsoundError::NotFound { what: "wave file", .. }));
}

#[test]
fn test_malformed_file_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.wav");
    fs::write(&path, b"RIFX\0\0\0\0WAVE").unwrap();
    let err = repair_wave_file(&path, false).unwrap_err();
    assert!(matches!(err, ZsoundError::Format { .. }));
    assert_eq!(err.code(), "ZSOUND_001");
}
