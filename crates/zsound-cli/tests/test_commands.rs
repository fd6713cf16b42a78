//! Command-level tests for the wav2zsound CLI library.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use zsound_cli::commands::bank::{build_bank, BankFormat, BankRequest};
use zsound_cli::commands::inspect::inspect_output;
use zsound_cli::commands::{inspect, repair};
use zsound_bank::{load_wave, BankOptions, ZsoundError};

// ============================================================================
// Fixtures
// ============================================================================

fn wave_bytes(unity_note: u32, start: u32, end: u32) -> Vec<u8> {
    let mut fmt = Vec::new();
    for value in [1u16, 1] {
        fmt.extend_from_slice(&value.to_le_bytes());
    }
    fmt.extend_from_slice(&32000u32.to_le_bytes());
    fmt.extend_from_slice(&64000u32.to_le_bytes());
    fmt.extend_from_slice(&2u16.to_le_bytes());
    fmt.extend_from_slice(&16u16.to_le_bytes());

    let mut smpl = Vec::new();
    smpl.extend_from_slice(b"ACME");
    smpl.extend_from_slice(b"SMP1");
    for value in [22675u32, unity_note, 0, 0, 0, 1, 0, 0, 0, start, end, 0, 0] {
        smpl.extend_from_slice(&value.to_le_bytes());
    }

    let mut wav = Vec::new();
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&0u32.to_le_bytes());
    wav.extend_from_slice(b"WAVE");
    for (id, payload) in [(b"fmt ", fmt), (b"data", vec![0u8; 1000]), (b"smpl", smpl)] {
        wav.extend_from_slice(id);
        wav.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        wav.extend_from_slice(&payload);
    }
    let riff_size = (wav.len() - 8) as u32;
    wav[4..8].copy_from_slice(&riff_size.to_le_bytes());
    wav
}

fn write_outputs(dir: &Path, stem: &str, codebook_groups: usize, loopbook_len: Option<usize>) {
    fs::write(dir.join(format!("{}.vadpcm.bin", stem)), vec![0u8; 288]).unwrap();
    let mut book = vec![0u8; 8];
    for value in 0..(codebook_groups * 16) as i16 {
        book.extend_from_slice(&value.to_be_bytes());
    }
    fs::write(dir.join(format!("{}.book.bin", stem)), book).unwrap();
    if let Some(len) = loopbook_len {
        let loopbook: Vec<u8> = (0..len as i16).flat_map(i16::to_be_bytes).collect();
        fs::write(dir.join(format!("{}.loopbook.bin", stem)), loopbook).unwrap();
    }
}

fn write_sample(dir: &Path, stem: &str, unity_note: u32, with_outputs: bool) -> PathBuf {
    let wav = dir.join(format!("{}.wav", stem));
    fs::write(&wav, wave_bytes(unity_note, 0, 0xFFFF_FFFF)).unwrap();
    if with_outputs {
        write_outputs(dir, stem, 2, None);
    }
    wav
}

fn write_looping_sample(dir: &Path, stem: &str, unity_note: u32, loopbook_len: usize) -> PathBuf {
    let wav = dir.join(format!("{}.wav", stem));
    fs::write(&wav, wave_bytes(unity_note, 128, 490)).unwrap();
    write_outputs(dir, stem, 4, Some(loopbook_len));
    wav
}

fn request(wavs: Vec<PathBuf>, out: PathBuf, format: BankFormat) -> BankRequest {
    BankRequest {
        wavs,
        encoded_dir: None,
        name: None,
        out: Some(out),
        format,
        seed: Some(7),
        config: None,
        dry_run: false,
    }
}

// ============================================================================
// Inspect / repair
// ============================================================================

#[test]
fn test_inspect_reports_blanked_loop() {
    let dir = tempfile::tempdir().unwrap();
    let wav = write_sample(dir.path(), "pad", 60, false);

    let container = load_wave(&wav).unwrap();
    let output = inspect_output("pad.wav", &container);

    assert!(output.success);
    assert!(output.corrupt_loop);
    assert_eq!(output.data_size, Some(1000));
    assert_eq!(output.sample_count, Some(500));
    let smpl = output.smpl.unwrap();
    assert_eq!(smpl.midi_unity_note, 60);
    assert_eq!(smpl.loops.len(), 1);
    assert_eq!(smpl.loops[0].end, 0xFFFF_FFFF);
    assert!(!smpl.repaired);
}

#[test]
fn test_inspect_runs_in_both_modes() {
    let dir = tempfile::tempdir().unwrap();
    let wav = write_sample(dir.path(), "pad", 60, false);
    let input = wav.to_str().unwrap();

    assert_eq!(inspect::run(input, false).unwrap(), ExitCode::SUCCESS);
    assert_eq!(inspect::run(input, true).unwrap(), ExitCode::SUCCESS);
}

#[test]
fn test_inspect_json_failure_exit_code() {
    assert_eq!(
        inspect::run("/nonexistent/pad.wav", true).unwrap(),
        ExitCode::from(1)
    );
}

#[test]
fn test_repair_dry_run_then_repair() {
    let dir = tempfile::tempdir().unwrap();
    let wav = write_sample(dir.path(), "pad", 60, false);
    let input = wav.to_str().unwrap();
    let original = fs::read(&wav).unwrap();

    assert_eq!(repair::run(input, true, false).unwrap(), ExitCode::SUCCESS);
    assert_eq!(fs::read(&wav).unwrap(), original);

    assert_eq!(repair::run(input, false, false).unwrap(), ExitCode::SUCCESS);
    let repaired = load_wave(&wav).unwrap();
    assert!(!repaired.detect_corrupt_loop());
    assert_eq!(fs::read(&wav).unwrap().len(), original.len());
}

// ============================================================================
// Bank
// ============================================================================

#[test]
fn test_bank_writes_xml() {
    let dir = tempfile::tempdir().unwrap();
    let wav = write_sample(dir.path(), "soft_pad", 60, true);
    let out = dir.path().join("bank.xml");

    let report = build_bank(
        &request(vec![wav.clone()], out.clone(), BankFormat::Xml),
        &BankOptions::default(),
    )
    .unwrap();

    assert!(report.errors.is_empty());
    assert_eq!(report.bank_file.as_deref(), Some(out.as_path()));
    let xml = fs::read_to_string(&out).unwrap();
    assert!(xml.starts_with("<?xml version='1.0' encoding='utf-8'?>"));
    assert_eq!(xml, report.document.unwrap().to_xml_string());

    // The blanked loop was repaired on the way
    assert!(!load_wave(&wav).unwrap().detect_corrupt_loop());
}

#[test]
fn test_bank_skips_failed_samples() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_sample(dir.path(), "good", 60, true);
    let missing = write_sample(dir.path(), "missing", 72, false);
    let out = dir.path().join("bank.json");

    let report = build_bank(
        &request(vec![good, missing], out.clone(), BankFormat::Json),
        &BankOptions::default(),
    )
    .unwrap();

    assert_eq!(report.samples.len(), 1);
    assert_eq!(report.samples[0].name(), "good");
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].code, "ZSOUND_002");

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(json["node"], "section");
}

#[test]
fn test_bank_without_survivors_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let missing = write_sample(dir.path(), "missing", 60, false);
    let out = dir.path().join("bank.xml");

    let report = build_bank(
        &request(vec![missing], out.clone(), BankFormat::Xml),
        &BankOptions::default(),
    )
    .unwrap();

    assert!(report.document.is_none());
    assert!(report.bank_file.is_none());
    assert!(!out.exists());
    assert_eq!(report.errors.last().unwrap().code, "CLI_002");
}

#[test]
fn test_bank_seed_is_deterministic() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();

    let mut hashes = Vec::new();
    for dir in [first.path(), second.path()] {
        let low = write_sample(dir, "low", 48, true);
        let high = write_sample(dir, "high", 72, true);
        let report = build_bank(
            &request(vec![high, low], dir.join("bank.xml"), BankFormat::Xml),
            &BankOptions::default(),
        )
        .unwrap();
        hashes.push(report.document.unwrap().content_hash());
    }

    assert_eq!(hashes[0], hashes[1]);
}

#[test]
fn test_bank_skips_sample_with_empty_codebook() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_sample(dir.path(), "good", 60, true);
    let bad = write_sample(dir.path(), "bad", 72, false);
    write_outputs(dir.path(), "bad", 0, None);
    let out = dir.path().join("bank.xml");

    let report = build_bank(
        &request(vec![good, bad], out.clone(), BankFormat::Xml),
        &BankOptions::default(),
    )
    .unwrap();

    let document = report.document.unwrap();
    assert_eq!(document.layout().len(), 1);
    assert_eq!(document.layout().samples()[0].name(), "good");
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].code, "ZSOUND_006");
    assert!(report.errors[0].message.contains("codebook is empty"));

    let xml = fs::read_to_string(&out).unwrap();
    assert!(xml.contains("NUM_DRUM=\"1\""));
    assert!(!xml.contains("bad"));
}

#[test]
fn test_bank_skips_sample_with_oversized_loopbook() {
    let dir = tempfile::tempdir().unwrap();
    let fits = write_looping_sample(dir.path(), "fits", 60, 16);
    let too_long = write_looping_sample(dir.path(), "too_long", 48, 17);
    let out = dir.path().join("bank.xml");

    let report = build_bank(
        &request(vec![fits, too_long], out.clone(), BankFormat::Xml),
        &BankOptions::default(),
    )
    .unwrap();

    let document = report.document.unwrap();
    assert_eq!(document.layout().len(), 1);
    assert!(document.layout().samples()[0].is_looping());
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].code, "ZSOUND_006");
    assert!(report.errors[0].file.as_deref().unwrap().ends_with("too_long.wav"));
    assert!(out.exists());
}

#[test]
fn test_bank_rejects_four_samples_before_touching_files() {
    let dir = tempfile::tempdir().unwrap();
    let wavs: Vec<PathBuf> = ["a", "b", "c", "d"]
        .iter()
        .map(|stem| write_sample(dir.path(), stem, 60, true))
        .collect();
    let originals: Vec<Vec<u8>> = wavs.iter().map(|wav| fs::read(wav).unwrap()).collect();
    let out = dir.path().join("bank.xml");

    let err = build_bank(
        &request(wavs.clone(), out.clone(), BankFormat::Xml),
        &BankOptions::default(),
    )
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ZsoundError>(),
        Some(ZsoundError::InvalidSampleCount { count: 4 })
    ));
    for (wav, original) in wavs.iter().zip(&originals) {
        assert_eq!(&fs::read(wav).unwrap(), original);
    }
    assert!(!out.exists());
}
