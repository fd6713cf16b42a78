//! Inspect command implementation
//!
//! Prints the decoded "fmt " and "smpl" chunks of a WAVE file and whether
//! its loop is blanked.

use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use std::process::ExitCode;
use zsound_bank::wave::SmplChunk;
use zsound_bank::{load_wave, WaveContainer};

use super::json_output::{print_json, FormatInfo, InspectOutput, JsonError, LoopInfo, SmplInfo};

/// Run the inspect command
///
/// # Arguments
/// * `input` - Path to the WAVE file
/// * `json_output` - Whether to output machine-readable JSON
///
/// # Returns
/// Exit code: 0 if the file parsed, 1 otherwise
pub fn run(input: &str, json_output: bool) -> Result<ExitCode> {
    if json_output {
        run_json(input)
    } else {
        run_human(input)
    }
}

fn run_human(input: &str) -> Result<ExitCode> {
    let container = load_wave(Path::new(input))?;

    println!("{} {}", "Inspecting:".cyan().bold(), input);

    let fmt = container.fmt();
    println!("\n{}", "Format:".bold());
    println!("  {} {}", "Audio format:".dimmed(), fmt.audio_format);
    println!("  {} {}", "Channels:".dimmed(), fmt.channels);
    println!("  {} {} Hz", "Sample rate:".dimmed(), fmt.sample_rate);
    println!("  {} {}", "Bits/sample:".dimmed(), fmt.bits_per_sample);

    println!("\n{}", "Data:".bold());
    println!("  {} {} bytes", "Size:".dimmed(), container.data_size());
    match container.sample_count() {
        Ok(count) => println!("  {} {}", "Frames:".dimmed(), count),
        Err(e) => println!("  {} {}", "Frames:".dimmed(), e.to_string().yellow()),
    }

    match container.smpl() {
        Some(smpl) => {
            println!("\n{}", "Sampler:".bold());
            println!(
                "  {} {} / {}",
                "Manufacturer/product:".dimmed(),
                tag_str(&smpl.manufacturer),
                tag_str(&smpl.product)
            );
            println!("  {} {}", "Unity note:".dimmed(), smpl.midi_unity_note);
            for (index, sample_loop) in smpl.loops.iter().enumerate() {
                println!(
                    "  {} {}: {}..{} (type {}, count {})",
                    "Loop".dimmed(),
                    index,
                    sample_loop.start,
                    sample_loop.end,
                    sample_loop.loop_type,
                    sample_loop.play_count
                );
            }
        }
        None => println!("\n{}", "No smpl chunk".dimmed()),
    }

    println!();
    if container.detect_corrupt_loop() {
        println!("{} blanked loop (run `repair` to fix)", "CORRUPT".red().bold());
    } else {
        println!("{} loop intact", "OK".green().bold());
    }

    Ok(ExitCode::SUCCESS)
}

fn run_json(input: &str) -> Result<ExitCode> {
    let output = match load_wave(Path::new(input)) {
        Ok(container) => inspect_output(input, &container),
        Err(e) => InspectOutput {
            success: false,
            file: input.to_string(),
            format: None,
            smpl: None,
            data_size: None,
            sample_count: None,
            corrupt_loop: false,
            errors: vec![JsonError::from_zsound(&e, input)],
        },
    };

    print_json(&output)?;
    Ok(if output.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

/// Builds the JSON summary of a parsed file.
pub fn inspect_output(input: &str, container: &WaveContainer) -> InspectOutput {
    let fmt = container.fmt();
    InspectOutput {
        success: true,
        file: input.to_string(),
        format: Some(FormatInfo {
            audio_format: fmt.audio_format,
            channels: fmt.channels,
            sample_rate: fmt.sample_rate,
            bits_per_sample: fmt.bits_per_sample,
        }),
        smpl: container.smpl().map(smpl_info),
        data_size: Some(container.data_size()),
        sample_count: container.sample_count().ok(),
        corrupt_loop: container.detect_corrupt_loop(),
        errors: Vec::new(),
    }
}

fn smpl_info(smpl: &SmplChunk) -> SmplInfo {
    SmplInfo {
        manufacturer: tag_str(&smpl.manufacturer),
        product: tag_str(&smpl.product),
        midi_unity_note: smpl.midi_unity_note,
        loops: smpl
            .loops
            .iter()
            .map(|l| LoopInfo {
                start: l.start,
                end: l.end,
                loop_type: l.loop_type,
                play_count: l.play_count,
            })
            .collect(),
        repaired: smpl.is_repaired(),
    }
}

fn tag_str(tag: &[u8; 4]) -> String {
    tag.iter()
        .map(|&b| if b.is_ascii_graphic() { b as char } else { '.' })
        .collect()
}
