//! RIFF/WAVE chunk model with in-place loop repair.
//!
//! Only the three chunks the sample pipeline cares about are decoded:
//! "fmt " (audio format), "smpl" (unity note and loop points) and "data"
//! (size only). Every other chunk is skipped opaquely. All fields are
//! little-endian and decoded at fixed offsets, never by overlaying native
//! structs on the file bytes.
//!
//! The single mutation supported is the repair of a blanked loop, which
//! rewrites the smpl payload at its original offset without resizing it.

mod chunk;
mod container;
mod file;
mod format;
mod smpl;


// Re-export public API
pub use chunk::{
    chunks, padded_len, read_riff_header, scan_for_chunk, ChunkHeader, ChunkIter, DATA_ID,
    FMT_ID, RIFF_HEADER_SIZE, SMPL_ID,
};
pub use container::WaveContainer;
pub use file::{load_wave, repair_wave_file, RepairOutcome};
pub use format::{FmtChunk, FMT_FIXED_SIZE};
pub use smpl::{
    SampleLoop, SmplChunk, BLANKED_LOOP_END, REPAIRED_MANUFACTURER, REPAIRED_PRODUCT,
    SAMPLE_LOOP_SIZE, SMPL_HEADER_SIZE,
};
