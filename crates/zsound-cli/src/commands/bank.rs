//! Bank command implementation
//!
//! Prepares up to three samples and writes their bank description.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use zsound_bank::layout::MAX_SAMPLES;
use zsound_bank::{
    bank_file_name, prepare_sample, sample_name, zsound_file_name, AddressAllocator,
    BankDocument, BankOptions, EncoderOutputs, SampleRecord, ZsoundError,
};

use super::json_output::{error_codes, print_json, BankOutput, JsonError, SampleSummary};
use crate::config::load_bank_options;

/// Bank description output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankFormat {
    Xml,
    Json,
}

impl BankFormat {
    /// Parses the `--format` value.
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "xml" => Ok(Self::Xml),
            "json" => Ok(Self::Json),
            other => bail!("Unknown bank format '{}' (expected xml or json)", other),
        }
    }

    fn extension(self) -> &'static str {
        match self {
            Self::Xml => "xml",
            Self::Json => "json",
        }
    }
}

/// Arguments of the bank command.
#[derive(Debug, Clone)]
pub struct BankRequest {
    /// WAVE files, one per sample
    pub wavs: Vec<PathBuf>,
    /// Directory holding the encoder outputs; defaults to each WAVE's directory
    pub encoded_dir: Option<PathBuf>,
    /// Bank name; defaults to the primary sample's name
    pub name: Option<String>,
    /// Output path; defaults to `{name}_BANK.{ext}` in the current directory
    pub out: Option<PathBuf>,
    pub format: BankFormat,
    /// Seed for temp-address assignment; OS entropy when absent
    pub seed: Option<u32>,
    /// Bank options file
    pub config: Option<PathBuf>,
    /// Skip the in-place WAVE repair
    pub dry_run: bool,
}

/// What a bank run produced.
#[derive(Debug, Clone)]
pub struct BankReport {
    pub bank_file: Option<PathBuf>,
    pub document: Option<BankDocument>,
    pub samples: Vec<SampleRecord>,
    pub errors: Vec<JsonError>,
}

/// Run the bank command
///
/// # Returns
/// Exit code: 0 if a bank was written, 1 if no sample could be prepared
pub fn run(request: &BankRequest, json_output: bool) -> Result<ExitCode> {
    if json_output {
        return run_json(request);
    }

    let options = load_bank_options(request.config.as_deref())?;
    let report = build_bank(request, &options)?;
    for error in &report.errors {
        eprintln!(
            "{} {} [{}]: {}",
            "SKIPPED".yellow().bold(),
            error.file.as_deref().unwrap_or("-"),
            error.code,
            error.message
        );
    }

    let (Some(path), Some(document)) = (&report.bank_file, &report.document) else {
        bail!("no sample could be prepared");
    };

    for record in &report.samples {
        println!(
            "{} {} -> {}",
            "Sample:".cyan().bold(),
            record.name(),
            zsound_file_name(record.name(), record.temp_addr())
        );
    }
    println!("{} {}", "Bank:".cyan().bold(), path.display());
    println!("  {} {} bytes", "Size:".dimmed(), document.total_size());
    println!("  {} {}", "Hash:".dimmed(), document.content_hash());

    Ok(ExitCode::SUCCESS)
}

fn run_json(request: &BankRequest) -> Result<ExitCode> {
    let result = load_bank_options(request.config.as_deref())
        .map_err(|e| JsonError::new(error_codes::CONFIG, format!("{:#}", e)))
        .and_then(|options| {
            build_bank(request, &options).map_err(|e| {
                let code = match e.downcast_ref::<ZsoundError>() {
                    Some(err) => err.code(),
                    None => error_codes::OUTPUT_WRITE,
                };
                JsonError::new(code, format!("{:#}", e))
            })
        });
    let output = match result {
        Ok(report) => bank_output(&report),
        Err(error) => BankOutput {
            success: false,
            bank_file: None,
            total_size: None,
            content_hash: None,
            samples: Vec::new(),
            errors: vec![error],
        },
    };

    print_json(&output)?;
    Ok(if output.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

/// Prepares every sample, lays out the survivors and writes the bank file.
///
/// More than three WAVE files are rejected before any of them is touched.
/// A sample that fails to prepare is recorded in `errors` and skipped. No
/// file is written when none survive.
pub fn build_bank(request: &BankRequest, options: &BankOptions) -> Result<BankReport> {
    let count = request.wavs.len();
    if count == 0 || count > MAX_SAMPLES {
        return Err(ZsoundError::InvalidSampleCount { count }.into());
    }

    let mut allocator = match request.seed {
        Some(seed) => AddressAllocator::from_seed(seed),
        None => AddressAllocator::from_entropy(),
    };

    let mut samples = Vec::new();
    let mut errors = Vec::new();
    for wav in &request.wavs {
        let stem = sample_name(wav);
        let dir = match &request.encoded_dir {
            Some(dir) => dir.clone(),
            None => parent_dir(wav),
        };
        let outputs = EncoderOutputs::locate(&dir, &stem);
        let address = allocator.allocate();

        match prepare_sample(wav, &outputs, address, request.dry_run) {
            Ok(record) => samples.push(record),
            Err(e) => {
                log::warn!("skipping {}: {}", wav.display(), e);
                errors.push(JsonError::from_zsound(&e, &wav.display().to_string()));
            }
        }
    }

    if samples.is_empty() {
        errors.push(JsonError::new(
            error_codes::NO_SAMPLES,
            "no sample could be prepared",
        ));
        return Ok(BankReport {
            bank_file: None,
            document: None,
            samples,
            errors,
        });
    }

    let document = BankDocument::build(&samples, options)?;
    let name = match &request.name {
        Some(name) => name.clone(),
        None => primary_name(&document),
    };
    let path = request
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from(bank_file_name(&name, request.format.extension())));

    let contents = match request.format {
        BankFormat::Xml => document.to_xml_string(),
        BankFormat::Json => document
            .to_json()
            .with_context(|| format!("{}: failed to serialize bank", error_codes::JSON_SERIALIZE))?,
    };
    fs::write(&path, contents).with_context(|| {
        format!(
            "{}: failed to write bank file {}",
            error_codes::OUTPUT_WRITE,
            path.display()
        )
    })?;
    log::info!("wrote {} ({} bytes of bank)", path.display(), document.total_size());

    Ok(BankReport {
        bank_file: Some(path),
        samples: document.layout().samples().to_vec(),
        document: Some(document),
        errors,
    })
}

fn bank_output(report: &BankReport) -> BankOutput {
    BankOutput {
        success: report.document.is_some(),
        bank_file: report
            .bank_file
            .as_ref()
            .map(|path| path.display().to_string()),
        total_size: report.document.as_ref().map(BankDocument::total_size),
        content_hash: report.document.as_ref().map(BankDocument::content_hash),
        samples: report
            .samples
            .iter()
            .map(|record| SampleSummary {
                name: record.name().to_string(),
                root_note: record.root_note(),
                looping: record.is_looping(),
                size: record.size(),
                temp_address: record.temp_addr().to_hex(),
                zsound_file: zsound_file_name(record.name(), record.temp_addr()),
            })
            .collect(),
        errors: report.errors.clone(),
    }
}

fn primary_name(document: &BankDocument) -> String {
    let layout = document.layout();
    layout.samples()[layout.split().primary].name().to_string()
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
