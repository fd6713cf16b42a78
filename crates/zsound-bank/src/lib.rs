//! zsound sample and bank core
//!
//! Prepares WAVE samples for a console audio runtime's instrument-bank
//! format:
//!
//! - [`wave`] parses RIFF/WAVE files and repairs blanked sample loops in place
//! - [`predictor`] decodes VADPCM codebook and loopbook files
//! - [`sample`] extracts tuning and loop metadata into [`SampleRecord`]s
//! - [`address`] assigns placeholder sample-table addresses
//! - [`layout`] computes the bank's memory layout for 1 to 3 samples
//! - [`bank`] renders the layout as an address-annotated [`BankDocument`]
//!
//! # Determinism
//!
//! Given the same records and options the bank document is byte-identical
//! across runs. The only randomness is temp-address assignment, which takes
//! an injected generator (PCG32 when seeded).
//!
//! # Example
//!
//! ```ignore
//! use zsound_bank::{prepare_sample, AddressAllocator, BankDocument, BankOptions, EncoderOutputs};
//!
//! let mut allocator = AddressAllocator::from_seed(42);
//! let outputs = EncoderOutputs::locate(encoded_dir, "pad");
//! let record = prepare_sample(wav_path, &outputs, allocator.allocate(), false)?;
//! let bank = BankDocument::build(&[record], &BankOptions::default())?;
//! std::fs::write("pad_BANK.xml", bank.to_xml_string())?;
//! ```

pub mod address;
pub mod bank;
pub mod document;
pub mod encoded;
pub mod error;
pub mod layout;
pub mod predictor;
pub mod sample;
pub mod wave;

// Re-export main types at crate root
pub use address::{AddressAllocator, TempAddress};
pub use bank::{bank_file_name, BankDocument, BankOptions, Envelope};
pub use encoded::{prepare_sample, sample_name, EncoderOutputs};
pub use error::{ZsoundError, ZsoundResult};
pub use layout::BankLayout;
pub use predictor::{decode_predictors, load_predictors, Predictors};
pub use sample::{zsound_file_name, SampleMetadata, SampleRecord};
pub use wave::{load_wave, repair_wave_file, RepairOutcome, WaveContainer};
