//! Source-file scanner (C7): sliding-window block identification.
//!
//! [`FileCheckSummer`](crate::checksum::FileCheckSummer) and
//! [`verify::file_verification`](crate::verify::file_verification) cover the
//! fast path, where a file is already at its expected location and
//! sequential per-block hashing is enough. This module covers the other
//! path from §4.7: when a file is damaged, renamed, or simply a stray byte
//! stream that might contain blocks belonging to the set, a rolling CRC-32
//! lets the scanner slide one byte at a time without re-hashing the whole
//! window, so a `block_size`-long match can be found at any offset.

use crate::checksum::compute_md5;
use crate::domain::{Crc32Value, FileId, Md5Hash};
use rustc_hash::FxHashMap as HashMap;
use std::io::Read;

/// One source block the scanner is looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockExpectation {
    pub file_id: FileId,
    pub block_index: usize,
}

/// Where a matched block was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundLocation {
    pub disk_file: String,
    pub byte_offset: u64,
}

/// A block match produced by the scan, keyed by which expectation it fills.
#[derive(Debug, Clone)]
pub struct ScanMatch {
    pub expectation: BlockExpectation,
    pub location: FoundLocation,
    /// True if this expectation had already been filled by an earlier match
    /// in this scan (a duplicate, not an error — §4.7).
    pub duplicate: bool,
}

/// 256-entry table for the reflected CRC-32 used throughout PAR2 (PKZIP
/// polynomial 0xEDB88320).
pub fn build_crc_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    for (i, entry) in table.iter_mut().enumerate() {
        let mut crc = i as u32;
        for _ in 0..8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ 0xEDB8_8320
            } else {
                crc >> 1
            };
        }
        *entry = crc;
    }
    table
}

#[inline]
fn crc_update_byte(table: &[u32; 256], crc: u32, byte: u8) -> u32 {
    table[((crc ^ byte as u32) & 0xff) as usize] ^ (crc >> 8)
}

/// Builds the window table used to slide the CRC by one byte: `table[b]` is
/// the CRC you'd get from a register seeded with byte `b` after `window`
/// zero-byte updates. XORing it into the current CRC cancels the outgoing
/// byte's contribution (the CRC update is linear in GF(2) over the
/// zero-fed tail), leaving just the new byte to feed in.
pub fn build_window_table(crc_table: &[u32; 256], window: usize) -> [u32; 256] {
    let mut table = [0u32; 256];
    for (byte, entry) in table.iter_mut().enumerate() {
        let mut crc = byte as u32;
        for _ in 0..window {
            crc = crc_update_byte(crc_table, crc, 0);
        }
        *entry = crc;
    }
    table
}

/// Rolling CRC-32 over a fixed-width window of `block_size` bytes.
pub struct SlidingCrc {
    crc_table: [u32; 256],
    window_table: [u32; 256],
    window: usize,
    crc: u32,
}

impl SlidingCrc {
    /// Seeds the window with the CRC-32 of `initial_window`, which must be
    /// exactly `block_size` bytes.
    pub fn new(block_size: usize, initial_window: &[u8]) -> Self {
        debug_assert_eq!(initial_window.len(), block_size);
        let crc_table = build_crc_table();
        let window_table = build_window_table(&crc_table, block_size);
        let crc = crc32fast::hash(initial_window);
        SlidingCrc {
            crc_table,
            window_table,
            window: block_size,
            crc,
        }
    }

    pub fn value(&self) -> Crc32Value {
        Crc32Value::new(self.crc)
    }

    /// Slides the window forward by one byte: `byte_out` leaves the front,
    /// `byte_in` enters the back.
    pub fn slide(&mut self, byte_out: u8, byte_in: u8) {
        let cleared = self.crc ^ self.window_table[byte_out as usize];
        self.crc = crc_update_byte(&self.crc_table, cleared, byte_in);
    }

    pub fn window_len(&self) -> usize {
        self.window
    }
}

/// Index from CRC value to the set of block expectations sharing it, built
/// once per scan and consulted on every window position.
pub struct CandidateIndex {
    by_crc: HashMap<u32, Vec<(BlockExpectation, Md5Hash)>>,
}

impl CandidateIndex {
    pub fn build(expectations: &[(BlockExpectation, Md5Hash, Crc32Value)]) -> Self {
        let mut by_crc: HashMap<u32, Vec<(BlockExpectation, Md5Hash)>> = HashMap::default();
        for &(expectation, md5, crc) in expectations {
            by_crc.entry(crc.as_u32()).or_default().push((expectation, md5));
        }
        CandidateIndex { by_crc }
    }

    fn candidates(&self, crc: Crc32Value) -> &[(BlockExpectation, Md5Hash)] {
        self.by_crc.get(&crc.as_u32()).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Scans `data` for `block_size`-wide windows matching any expectation in
/// `index`, sliding one byte at a time on a miss and `block_size` bytes on
/// a hit. `scanning_file_id` is the file currently being scanned, used to
/// break CRC ties in favor of the expected source (§4.7).
pub fn scan_buffer(
    data: &[u8],
    block_size: usize,
    disk_file: &str,
    scanning_file_id: Option<FileId>,
    index: &CandidateIndex,
    already_found: &mut HashMap<BlockExpectation, FoundLocation>,
) -> Vec<ScanMatch> {
    let mut matches = Vec::new();
    if data.len() < block_size || block_size == 0 {
        return matches;
    }

    let mut pos = 0usize;
    let mut last_match: Option<BlockExpectation> = None;
    let mut crc = SlidingCrc::new(block_size, &data[0..block_size]);

    loop {
        let window = &data[pos..pos + block_size];
        let candidates = index.candidates(crc.value());
        if !candidates.is_empty() {
            if let Some(best) = pick_best_candidate(candidates, scanning_file_id, last_match) {
                let window_md5 = compute_md5(window);
                if window_md5 == best.1 {
                    let duplicate = already_found.contains_key(&best.0);
                    let location = FoundLocation {
                        disk_file: disk_file.to_string(),
                        byte_offset: pos as u64,
                    };
                    if !duplicate {
                        already_found.insert(best.0, location.clone());
                    }
                    matches.push(ScanMatch {
                        expectation: best.0,
                        location,
                        duplicate,
                    });
                    last_match = Some(best.0);

                    if pos + block_size + block_size > data.len() {
                        break;
                    }
                    for _ in 0..block_size {
                        let byte_out = data[pos];
                        let byte_in = data[pos + block_size];
                        crc.slide(byte_out, byte_in);
                        pos += 1;
                    }
                    continue;
                }
            }
        }

        if pos + block_size >= data.len() {
            break;
        }
        let byte_out = data[pos];
        let byte_in = data[pos + block_size];
        crc.slide(byte_out, byte_in);
        pos += 1;
    }

    matches
}

/// Applies the §4.7 tie-break: prefer the expectation belonging to the file
/// currently being scanned; among those, prefer contiguity with the last
/// match in this file.
fn pick_best_candidate(
    candidates: &[(BlockExpectation, Md5Hash)],
    scanning_file_id: Option<FileId>,
    last_match: Option<BlockExpectation>,
) -> Option<(BlockExpectation, Md5Hash)> {
    if candidates.is_empty() {
        return None;
    }

    let expected_owner = scanning_file_id
        .map(|fid| candidates.iter().filter(|(e, _)| e.file_id == fid).collect::<Vec<_>>())
        .filter(|v| !v.is_empty());
    let pool: Vec<&(BlockExpectation, Md5Hash)> = expected_owner.unwrap_or_else(|| candidates.iter().collect());

    if let Some(last) = last_match {
        if let Some(contiguous) = pool
            .iter()
            .find(|(e, _)| e.file_id == last.file_id && e.block_index == last.block_index + 1)
        {
            return Some(**contiguous);
        }
    }

    pool.first().map(|c| **c)
}

/// Attempts to recover blocks that failed fixed-offset verification by
/// re-scanning the whole file for shifted or interleaved copies (§4.7).
/// Only the blocks named in `damaged_blocks` are searched for; any that
/// can't be found in `data` at some offset stay damaged. This is the
/// fallback the fixed-position block check (`validation::validate_blocks_md5_crc32`)
/// can't provide on its own: that check only ever looks at each block's
/// expected byte offset, so a file that's merely shifted (truncated at the
/// front, or with bytes inserted) reports every block after the shift as
/// damaged even though the data is all still there.
pub fn rescue_damaged_blocks(
    data: &[u8],
    file_id: FileId,
    disk_file: &str,
    block_size: usize,
    checksums: &[(Md5Hash, Crc32Value)],
    damaged_blocks: &[u32],
) -> Vec<u32> {
    if damaged_blocks.is_empty() || block_size == 0 {
        return damaged_blocks.to_vec();
    }

    let expectations: Vec<(BlockExpectation, Md5Hash, Crc32Value)> = damaged_blocks
        .iter()
        .filter_map(|&block_index| {
            checksums.get(block_index as usize).map(|&(md5, crc)| {
                (
                    BlockExpectation { file_id, block_index: block_index as usize },
                    md5,
                    crc,
                )
            })
        })
        .collect();

    let index = CandidateIndex::build(&expectations);
    let mut already_found = HashMap::default();
    let matches = scan_buffer(data, block_size, disk_file, Some(file_id), &index, &mut already_found);

    let recovered: std::collections::HashSet<u32> = matches
        .iter()
        .filter(|m| !m.duplicate)
        .map(|m| m.expectation.block_index as u32)
        .collect();

    damaged_blocks
        .iter()
        .copied()
        .filter(|b| !recovered.contains(b))
        .collect()
}

/// Scans an entire readable source for block matches, streaming it into
/// memory. Intended for files too large to read in one call; callers with
/// an in-memory buffer should use [`scan_buffer`] directly.
pub fn scan_reader<R: Read>(
    mut reader: R,
    block_size: usize,
    disk_file: &str,
    scanning_file_id: Option<FileId>,
    index: &CandidateIndex,
    already_found: &mut HashMap<BlockExpectation, FoundLocation>,
) -> std::io::Result<Vec<ScanMatch>> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    Ok(scan_buffer(&data, block_size, disk_file, scanning_file_id, index, already_found))
}
