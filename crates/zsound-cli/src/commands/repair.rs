//! Repair command implementation

use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use std::process::ExitCode;
use zsound_bank::{repair_wave_file, RepairOutcome};

use super::json_output::{print_json, JsonError, RepairOutput};

/// Run the repair command
///
/// # Arguments
/// * `input` - Path to the WAVE file, patched in place
/// * `dry_run` - Report the corruption without writing
/// * `json_output` - Whether to output machine-readable JSON
pub fn run(input: &str, dry_run: bool, json_output: bool) -> Result<ExitCode> {
    let result = repair_wave_file(Path::new(input), dry_run);

    if json_output {
        let output = match &result {
            Ok(outcome) => repair_output(input, dry_run, outcome),
            Err(e) => RepairOutput {
                success: false,
                file: input.to_string(),
                dry_run,
                was_corrupt: false,
                written: false,
                errors: vec![JsonError::from_zsound(e, input)],
            },
        };
        print_json(&output)?;
        return Ok(if output.success {
            ExitCode::SUCCESS
        } else {
            ExitCode::from(1)
        });
    }

    let outcome = result?;
    match (outcome.was_corrupt, outcome.written) {
        (false, _) => println!("{} {}: loop intact, nothing to do", "OK".green().bold(), input),
        (true, true) => println!("{} {}: blanked loop repaired", "REPAIRED".green().bold(), input),
        (true, false) => println!(
            "{} {}: blanked loop found (dry run, not written)",
            "CORRUPT".yellow().bold(),
            input
        ),
    }
    Ok(ExitCode::SUCCESS)
}

fn repair_output(input: &str, dry_run: bool, outcome: &RepairOutcome) -> RepairOutput {
    RepairOutput {
        success: true,
        file: input.to_string(),
        dry_run,
        was_corrupt: outcome.was_corrupt,
        written: outcome.written,
        errors: Vec::new(),
    }
}
