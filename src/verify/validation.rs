//! Verify-specific facade over the shared validation routines in
//! [`crate::validation`], adding a progress-reporting variant for large
//! files where an interactive run wants to show scan progress.

use crate::checksum::ProgressReporter;
use crate::domain::Crc32Value;
use rustc_hash::FxHashSet as HashSet;
use std::io;
use std::path::Path;

pub use crate::validation::{validate_blocks_md5_crc32, validate_slices_crc32};

/// Same as [`validate_slices_crc32`], but reports cumulative progress
/// through `progress` once the scan completes (the underlying sequential
/// I/O is already a single buffered pass, so there's one report rather than
/// one per slice).
pub fn validate_slices_crc32_with_progress<P: AsRef<Path>, R: ProgressReporter>(
    file_path: P,
    slice_checksums: &[Crc32Value],
    slice_size: usize,
    file_size: u64,
    progress: &R,
) -> io::Result<HashSet<usize>> {
    let valid = validate_slices_crc32(file_path, slice_checksums, slice_size, file_size)?;
    progress.report_bytes(file_size, file_size);
    Ok(valid)
}
