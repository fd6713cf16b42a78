//! wav2zsound CLI
//!
//! Prepares WAVE samples and instrument-bank descriptions for the zsound
//! runtime.
//!
//! ## Commands
//!
//! - `inspect` - Print a WAVE file's format, sampler chunk and loop state
//! - `repair` - Repair a blanked sample loop in place
//! - `bank` - Build the bank description for one to three encoded samples

use clap::{Parser, Subcommand};
use env_logger::{Builder, Env};
use std::path::PathBuf;
use std::process::ExitCode;

use zsound_cli::commands;
use zsound_cli::commands::bank::{BankFormat, BankRequest};

/// wav2zsound - zsound sample and bank preparation
#[derive(Parser)]
#[command(name = "wav2zsound")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a WAVE file's format, sampler chunk and loop state
    Inspect {
        /// Path to the WAVE file
        #[arg(short, long)]
        input: String,

        /// Output machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Repair a blanked sample loop in place
    Repair {
        /// Path to the WAVE file
        #[arg(short, long)]
        input: String,

        /// Report the corruption without writing
        #[arg(long)]
        dry_run: bool,

        /// Output machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Build the bank description for one to three encoded samples
    Bank {
        /// WAVE file of a sample (repeat for up to three samples)
        #[arg(short, long = "wav", required = true, num_args = 1)]
        wavs: Vec<PathBuf>,

        /// Directory with the encoder outputs (default: next to each WAVE file)
        #[arg(short, long)]
        encoded_dir: Option<PathBuf>,

        /// Bank name (default: the primary sample's name)
        #[arg(short, long)]
        name: Option<String>,

        /// Output path (default: {name}_BANK.{format})
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Output format
        #[arg(long, default_value = "xml", value_parser = ["xml", "json"])]
        format: String,

        /// Seed for temp-address assignment (default: OS entropy)
        #[arg(long)]
        seed: Option<u32>,

        /// JSON file overriding the bank options
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Leave blanked loops unrepaired on disk
        #[arg(long)]
        dry_run: bool,

        /// Output machine-readable JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    let result = match cli.command {
        Commands::Inspect { input, json } => commands::inspect::run(&input, json),
        Commands::Repair {
            input,
            dry_run,
            json,
        } => commands::repair::run(&input, dry_run, json),
        Commands::Bank {
            wavs,
            encoded_dir,
            name,
            out,
            format,
            seed,
            config,
            dry_run,
            json,
        } => BankFormat::parse(&format).and_then(|format| {
            let request = BankRequest {
                wavs,
                encoded_dir,
                name,
                out,
                format,
                seed,
                config,
                dry_run,
            };
            commands::bank::run(&request, json)
        }),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
