//! Path-based load and in-place loop repair.

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read};
use std::path::Path;

use super::container::WaveContainer;
use crate::error::{ZsoundError, ZsoundResult};

/// Result of [`repair_wave_file`].
#[derive(Debug, Clone)]
pub struct RepairOutcome {
    /// The container after repair (or as read, if the loop was intact).
    pub container: WaveContainer,
    /// Whether a blanked loop was found.
    pub was_corrupt: bool,
    /// Whether the patch was written back to the file.
    pub written: bool,
}

/// Reads and parses a WAVE file.
pub fn load_wave(path: &Path) -> ZsoundResult<WaveContainer> {
    let mut file = File::open(path).map_err(|e| not_found_or_io(e, path))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    WaveContainer::parse(&bytes)
}

/// Parses a WAVE file and, if its loop is blanked, patches the smpl chunk in
/// place.
///
/// With `dry_run` the repair is reported but nothing is written. The file is
/// read through a read-only handle and only reopened for writing when a patch
/// is due, so intact read-only files pass. Handles are released before
/// returning, on success or failure.
pub fn repair_wave_file(path: &Path, dry_run: bool) -> ZsoundResult<RepairOutcome> {
    let mut container = load_wave(path)?;

    let was_corrupt = container.repair_loop();
    if !was_corrupt || dry_run {
        if was_corrupt {
            log::info!("{}: blanked loop found (dry run)", path.display());
        }
        return Ok(RepairOutcome {
            container,
            was_corrupt,
            written: false,
        });
    }

    let mut file = OpenOptions::new()
        .write(true)
        .open(path)
        .map_err(|e| not_found_or_io(e, path))?;
    container.flush(&mut file)?;
    log::info!("{}: blanked loop repaired", path.display());
    Ok(RepairOutcome {
        container,
        was_corrupt,
        written: true,
    })
}

fn not_found_or_io(err: std::io::Error, path: &Path) -> ZsoundError {
    if err.kind() == ErrorKind::NotFound {
        ZsoundError::NotFound {
            what: "wave file",
            path: path.to_path_buf(),
        }
    } else {
        ZsoundError::Io(err)
    }
}
