//! Creator driver (C9): plans a recovery set from a list of source files and
//! turns the plan into packets ready to be written out as `.par2` volumes.
//!
//! Grounded on `par2creator.cpp`'s four planning passes
//! (`ComputeBlockSizeAndBlockCount`, `ComputeRecoveryBlockCount`,
//! `ComputeRecoveryFileCount`, `InitialiseOutputFiles`), kept as separate
//! pure functions here so each can be tested against the original's
//! documented edge cases without needing a filesystem. The actual recovery
//! data is produced by reusing [`crate::reed_solomon::reedsolomon`]'s
//! `ReedSolomon` engine rather than re-deriving the Vandermonde matrix math:
//! a create is just a decode where every source block is present and every
//! recovery block is "missing" (to be computed).

use crate::checksum::{
    calculate_file_md5, calculate_file_md5_16k, compute_block_checksums_padded, compute_file_id,
    compute_recovery_set_id,
};
use crate::domain::{Crc32Value, FileId, Md5Hash, RecoverySetId};
use crate::packets::{
    CreatorPacket, FileDescriptionPacket, InputFileSliceChecksumPacket, MainPacket,
    RecoverySlicePacket,
};
use crate::reed_solomon::reedsolomon::{ReedSolomonBuilder, RsResult};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CreatorError {
    #[error("no source files given")]
    NoSourceFiles,
    #[error("{0} source blocks would be needed, more than the 32768 a Main packet can address")]
    TooManyBlocks(u64),
    #[error("source block count {requested} is smaller than the {files} files being protected")]
    TooFewBlocksForFiles { requested: u32, files: usize },
    #[error("{0} recovery blocks requested, more than the 65536 an exponent can address")]
    TooManyRecoveryBlocks(u32),
    #[error("first recovery exponent {first} plus {count} recovery blocks would exceed 65536")]
    RecoveryExponentOverflow { first: u32, count: u32 },
    #[error("{requested} recovery files requested, more than the {available} recovery blocks to distribute among them")]
    TooManyRecoveryFiles { requested: u32, available: u32 },
    #[error("I/O error reading {path}: {cause}")]
    Io {
        path: PathBuf,
        #[source]
        cause: std::io::Error,
    },
    #[error("Reed-Solomon setup failed: {0}")]
    ReedSolomon(#[from] crate::reed_solomon::reedsolomon::RsError),
}

pub type Result<T> = std::result::Result<T, CreatorError>;

/// How recovery blocks are spread across recovery volumes (§4.9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeScheme {
    /// Every volume carries the same number of blocks, give or take one.
    Uniform,
    /// Volume sizes double (1, 2, 4, 8, ...), so a recipient only fetching a
    /// prefix of the volumes still gets a usable block count.
    Variable,
    /// Like Variable, but no volume carries more blocks than the largest
    /// source file needs, so a single volume can always fully reconstruct it.
    Limited,
}

/// Caller-supplied knobs for planning a recovery set. Leave a field `None`
/// to let the planner derive it the way `par2create` does.
#[derive(Debug, Clone)]
pub struct CreatorConfig {
    pub block_size: Option<u64>,
    pub source_block_count: Option<u32>,
    pub redundancy_percent: f64,
    pub recovery_block_count: Option<u32>,
    pub recovery_file_count: Option<u32>,
    pub first_recovery_block: u32,
    pub scheme: VolumeScheme,
}

impl Default for CreatorConfig {
    fn default() -> Self {
        CreatorConfig {
            block_size: None,
            source_block_count: None,
            redundancy_percent: 10.0,
            recovery_block_count: None,
            recovery_file_count: None,
            first_recovery_block: 0,
            scheme: VolumeScheme::Variable,
        }
    }
}

/// Picks a slice size and the resulting total source block count, following
/// `ComputeBlockSizeAndBlockCount`. Either an explicit `block_size` or an
/// explicit `source_block_count` must be given; if both are `None` the
/// config's default redundancy-driven sizing is the caller's job to fill in
/// before calling this.
pub fn compute_block_size_and_count(
    file_sizes: &[u64],
    block_size: Option<u64>,
    source_block_count: Option<u32>,
) -> Result<(u64, u32)> {
    if file_sizes.is_empty() {
        return Err(CreatorError::NoSourceFiles);
    }

    if let Some(requested) = block_size {
        let slice_size = requested.max(4) & !3;
        let count: u64 = file_sizes.iter().map(|&sz| sz.div_ceil(slice_size).max(1)).sum();
        if count > 32768 {
            return Err(CreatorError::TooManyBlocks(count));
        }
        return Ok((slice_size, count as u32));
    }

    let source_block_count =
        source_block_count.expect("caller must supply block_size or source_block_count");
    let num_files = file_sizes.len() as u64;
    if (source_block_count as u64) < num_files {
        return Err(CreatorError::TooFewBlocksForFiles {
            requested: source_block_count,
            files: file_sizes.len(),
        });
    }

    let largest = file_sizes.iter().copied().max().unwrap_or(0);
    if source_block_count as u64 == num_files {
        let slice_size = ((largest + 3) & !3).max(4);
        let count: u64 = file_sizes.iter().map(|&sz| sz.div_ceil(slice_size).max(1)).sum();
        return Ok((slice_size, count as u32));
    }

    // Binary search over the block size (in 4-byte units, as the original
    // does) for the size whose resulting block count is closest to the
    // requested source_block_count.
    let totalsize: u64 = file_sizes.iter().map(|&sz| sz.div_ceil(4)).sum();
    let count_for = |units: u64| -> u64 {
        let slice_size = (units * 4).max(4);
        file_sizes.iter().map(|&sz| sz.div_ceil(slice_size).max(1)).sum()
    };

    let mut low = (totalsize / source_block_count as u64).max(1);
    let mut high = ((totalsize + source_block_count as u64 - num_files - 1)
        / (source_block_count as u64 - num_files))
        .max(low);

    let mut best_units = low;
    let mut best_diff = i64::MAX;
    while low <= high {
        let mid = low + (high - low) / 2;
        let count = count_for(mid);
        let diff = (count as i64 - source_block_count as i64).abs();
        if diff < best_diff {
            best_diff = diff;
            best_units = mid;
        }
        if count > source_block_count as u64 {
            low = mid + 1;
        } else if mid == 0 {
            break;
        } else {
            high = mid - 1;
        }
    }

    let slice_size = (best_units * 4).max(4);
    let count = count_for(best_units);
    if count > 32768 {
        return Err(CreatorError::TooManyBlocks(count));
    }
    Ok((slice_size, count as u32))
}

/// Picks the number of recovery blocks to generate, following
/// `ComputeRecoveryBlockCount`.
pub fn compute_recovery_block_count(
    source_block_count: u32,
    redundancy_percent: f64,
    explicit: Option<u32>,
    first_recovery_block: u32,
) -> Result<u32> {
    let mut count = match explicit {
        Some(n) => n,
        None => ((source_block_count as f64 * redundancy_percent + 50.0) / 100.0).floor() as u32,
    };
    if count == 0 && redundancy_percent > 0.0 {
        count = 1;
    }
    if count > 65536 {
        return Err(CreatorError::TooManyRecoveryBlocks(count));
    }
    if first_recovery_block as u64 + count as u64 >= 65536 {
        return Err(CreatorError::RecoveryExponentOverflow {
            first: first_recovery_block,
            count,
        });
    }
    Ok(count)
}

/// Number of bits needed to represent `n` (0 for `n == 0`). This is the
/// "how many volume copies does a critical packet need" count used both by
/// `ComputeRecoveryFileCount`'s default and by the interleaving pass below.
pub fn bit_length(mut n: u32) -> u32 {
    let mut len = 0;
    while n > 0 {
        len += 1;
        n >>= 1;
    }
    len
}

/// Picks how many recovery volumes to split `recovery_block_count` across,
/// following `ComputeRecoveryFileCount`.
pub fn compute_recovery_file_count(
    scheme: VolumeScheme,
    recovery_block_count: u32,
    largest_file_block_count: u32,
    explicit: Option<u32>,
) -> Result<u32> {
    if recovery_block_count == 0 {
        return Ok(0);
    }
    if let Some(n) = explicit {
        if n > recovery_block_count {
            return Err(CreatorError::TooManyRecoveryFiles {
                requested: n,
                available: recovery_block_count,
            });
        }
        return Ok(n);
    }

    match scheme {
        VolumeScheme::Uniform | VolumeScheme::Variable => Ok(bit_length(recovery_block_count)),
        VolumeScheme::Limited => {
            let largest = largest_file_block_count.max(1);
            let whole = recovery_block_count / largest;
            let whole = if whole >= 1 { whole - 1 } else { 0 };
            let extra = recovery_block_count - whole * largest;
            Ok(whole + bit_length(extra))
        }
    }
}

/// One recovery volume's share of the recovery block range: blocks
/// `exponent_low .. exponent_low + count` (exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeAllocation {
    pub exponent_low: u32,
    pub count: u32,
}

/// Splits `recovery_block_count` blocks (starting at exponent
/// `first_recovery_block`) across `recovery_file_count` volumes, following
/// `InitialiseOutputFiles`'s per-scheme allocation.
pub fn allocate_volumes(
    scheme: VolumeScheme,
    recovery_block_count: u32,
    recovery_file_count: u32,
    largest_file_block_count: u32,
    first_recovery_block: u32,
) -> Vec<VolumeAllocation> {
    if recovery_block_count == 0 || recovery_file_count == 0 {
        return Vec::new();
    }

    let mut volumes = Vec::new();
    let mut exponent = first_recovery_block;

    match scheme {
        VolumeScheme::Uniform => {
            let base = recovery_block_count / recovery_file_count;
            let remainder = recovery_block_count % recovery_file_count;
            for i in 0..recovery_file_count {
                let count = if i < remainder { base + 1 } else { base };
                if count == 0 {
                    continue;
                }
                volumes.push(VolumeAllocation { exponent_low: exponent, count });
                exponent += count;
            }
        }
        VolumeScheme::Variable => {
            let mut remaining = recovery_block_count;
            let mut step = 1u32;
            while remaining > 0 {
                let count = step.min(remaining);
                volumes.push(VolumeAllocation { exponent_low: exponent, count });
                exponent += count;
                remaining -= count;
                step = step.saturating_mul(2);
            }
        }
        VolumeScheme::Limited => {
            let largest = largest_file_block_count.max(1);
            let mut remaining = recovery_block_count;
            let mut counts = Vec::new();
            while remaining >= 2 * largest {
                counts.push(largest);
                remaining -= largest;
            }
            let mut step = 1u32;
            while remaining > 0 {
                let count = step.min(remaining);
                counts.push(count);
                remaining -= count;
                step = step.saturating_mul(2);
            }
            for count in counts {
                volumes.push(VolumeAllocation { exponent_low: exponent, count });
                exponent += count;
            }
        }
    }

    volumes
}

/// Spreads `critical_packet_total` critical packets (Main, File Description,
/// IFSC, ...) round-robin across `volumes`, weighting larger volumes with
/// more copies so that any single volume plus the `.par2` index file carries
/// enough critical data to be self-describing. Following the packet-count
/// accumulator in `InitialiseOutputFiles`. Returns, per volume, the indices
/// (into `0..critical_packet_total`) of the critical packets it should
/// carry.
pub fn schedule_critical_packets(
    volumes: &[VolumeAllocation],
    critical_packet_total: usize,
) -> Vec<Vec<usize>> {
    let mut result = vec![Vec::new(); volumes.len()];
    if critical_packet_total == 0 {
        return result;
    }

    let mut next_packet = 0usize;
    for (vi, volume) in volumes.iter().enumerate() {
        if volume.count == 0 {
            continue;
        }
        let copies = bit_length(volume.count) as u64;
        let mut packet_count: u64 = 0;
        for _ in 0..volume.count {
            packet_count += copies * critical_packet_total as u64;
            while packet_count >= volume.count as u64 {
                result[vi].push(next_packet % critical_packet_total);
                next_packet += 1;
                packet_count -= volume.count as u64;
            }
        }
    }
    result
}

/// One source file, hashed and sliced at the set's block size, ready to
/// become a File Description + IFSC packet pair.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub file_name: Vec<u8>,
    pub file_length: u64,
    pub md5: Md5Hash,
    pub md5_16k: Md5Hash,
    pub slice_checksums: Vec<(Md5Hash, Crc32Value)>,
}

impl SourceFile {
    pub fn file_id(&self) -> FileId {
        compute_file_id(&self.md5_16k, self.file_length, &self.file_name)
    }
}

/// Reads and hashes one source file against `slice_size`.
pub fn read_source_file(path: &Path, slice_size: u64) -> Result<SourceFile> {
    let io_err = |cause: std::io::Error| CreatorError::Io { path: path.to_path_buf(), cause };

    let metadata = std::fs::metadata(path).map_err(io_err)?;
    let file_length = metadata.len();
    let md5 = calculate_file_md5(path).map_err(io_err)?;
    let md5_16k = calculate_file_md5_16k(path).map_err(io_err)?;

    let file_name: Vec<u8> = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned().into_bytes())
        .unwrap_or_default();

    let mut slice_checksums = Vec::new();
    if slice_size > 0 {
        use std::io::Read;
        let mut reader = std::fs::File::open(path).map_err(io_err)?;
        let mut buf = vec![0u8; slice_size as usize];
        loop {
            let mut filled = 0usize;
            while filled < buf.len() {
                let n = reader.read(&mut buf[filled..]).map_err(io_err)?;
                if n == 0 {
                    break;
                }
                filled += n;
            }
            if filled == 0 {
                break;
            }
            slice_checksums.push(compute_block_checksums_padded(&buf[..filled], slice_size as usize));
            if filled < buf.len() {
                break;
            }
        }
    }

    Ok(SourceFile { path: path.to_path_buf(), file_name, file_length, md5, md5_16k, slice_checksums })
}

/// The fully planned recovery set: every critical packet except the
/// recovery slices themselves, plus the volume layout those slices will be
/// split across.
#[derive(Debug, Clone)]
pub struct RecoverySetPlan {
    pub set_id: RecoverySetId,
    pub slice_size: u64,
    pub main: MainPacket,
    pub creator: CreatorPacket,
    pub descriptions: Vec<FileDescriptionPacket>,
    pub verifications: Vec<InputFileSliceChecksumPacket>,
    pub recovery_block_count: u32,
    pub volumes: Vec<VolumeAllocation>,
}

/// Runs the full planning pipeline (block sizing, recovery-block count,
/// volume scheme) over a set of already-hashed source files and assembles
/// the critical packets. Does not compute recovery slice data; call
/// [`compute_recovery_slices`] with the result's `recovery_block_count` and
/// `volumes` for that.
pub fn plan_recovery_set(
    files: &[SourceFile],
    slice_size: u64,
    config: &CreatorConfig,
    creator_info: Vec<u8>,
) -> Result<RecoverySetPlan> {
    if files.is_empty() {
        return Err(CreatorError::NoSourceFiles);
    }

    let source_block_count: u32 = files
        .iter()
        .map(|f| f.slice_checksums.len() as u32)
        .sum();

    let recovery_block_count = compute_recovery_block_count(
        source_block_count,
        config.redundancy_percent,
        config.recovery_block_count,
        config.first_recovery_block,
    )?;

    let largest_file_block_count =
        files.iter().map(|f| f.slice_checksums.len() as u32).max().unwrap_or(1);

    let recovery_file_count = compute_recovery_file_count(
        config.scheme,
        recovery_block_count,
        largest_file_block_count,
        config.recovery_file_count,
    )?;

    let volumes = allocate_volumes(
        config.scheme,
        recovery_block_count,
        recovery_file_count,
        largest_file_block_count,
        config.first_recovery_block,
    );

    // Provisional set ID, refined below once the Main packet body (which
    // embeds it) is known: the recovery set ID is the MD5 of the Main
    // packet's own body, so it's computed from a zero set_id placeholder
    // first, matching `compute_recovery_set_id`'s definition.
    let file_ids: Vec<FileId> = files.iter().map(SourceFile::file_id).collect();
    let placeholder = MainPacket::new(RecoverySetId::new([0; 16]), slice_size, file_ids.clone(), vec![]);
    let set_id = RecoverySetId::new(compute_recovery_set_id(&{
        let mut body = Vec::new();
        body.extend_from_slice(TYPE_OF_MAIN_PACKET);
        body.extend_from_slice(&placeholder.slice_size.to_le_bytes());
        body.extend_from_slice(&placeholder.file_count.to_le_bytes());
        for id in &file_ids {
            body.extend_from_slice(id.as_bytes());
        }
        body
    }));

    let main = MainPacket::new(set_id, slice_size, file_ids, vec![]);
    let creator = CreatorPacket::new(set_id, creator_info);

    let mut descriptions = Vec::with_capacity(files.len());
    let mut verifications = Vec::with_capacity(files.len());
    for file in files {
        let fd = FileDescriptionPacket::new(
            set_id,
            file.md5,
            file.md5_16k,
            file.file_length,
            file.file_name.clone(),
        );
        let ifsc = InputFileSliceChecksumPacket::new(set_id, fd.file_id, file.slice_checksums.clone());
        descriptions.push(fd);
        verifications.push(ifsc);
    }

    Ok(RecoverySetPlan {
        set_id,
        slice_size,
        main,
        creator,
        descriptions,
        verifications,
        recovery_block_count,
        volumes,
    })
}

const TYPE_OF_MAIN_PACKET: &[u8] = b"PAR 2.0\0Main\0\0\0\0";

/// Computes `recovery_block_count` recovery slices (exponents
/// `first_recovery_block .. first_recovery_block + recovery_block_count`)
/// from `source_blocks`, which must all be exactly `slice_size` bytes
/// (callers should zero-pad the last slice of each file, as
/// [`read_source_file`] already does via `compute_block_checksums_padded`'s
/// sibling padding). Reuses the decode engine: every input is "present",
/// every requested output is "missing" and gets filled in by `process`.
pub fn compute_recovery_slices(
    source_blocks: &[&[u8]],
    first_recovery_block: u32,
    recovery_block_count: u32,
) -> RsResult<Vec<Vec<u8>>> {
    if recovery_block_count == 0 || source_blocks.is_empty() {
        return Ok(Vec::new());
    }

    let low = first_recovery_block as u16;
    let high = (first_recovery_block + recovery_block_count - 1) as u16;

    let mut rs = ReedSolomonBuilder::new()
        .with_input_status(&vec![true; source_blocks.len()])
        .with_recovery_blocks_range(false, low, high)
        .build()?;
    rs.compute()?;

    let slice_size = source_blocks[0].len();
    let mut outputs = vec![vec![0u8; slice_size]; recovery_block_count as usize];
    for out_idx in 0..recovery_block_count as usize {
        for (in_idx, block) in source_blocks.iter().enumerate() {
            rs.process(in_idx as u32, block, out_idx as u32, &mut outputs[out_idx])?;
        }
    }
    Ok(outputs)
}

/// Zero-filled stand-in for [`compute_recovery_slices`], used by `-0`'s
/// metadata-only volumes: same packet layout and sizes, none of the
/// Reed-Solomon cost, for benchmarking I/O and volume scheduling alone.
pub fn dummy_recovery_slices(slice_size: u64, recovery_block_count: u32) -> Vec<Vec<u8>> {
    vec![vec![0u8; slice_size as usize]; recovery_block_count as usize]
}

/// Builds the `RecoverySlicePacket`s for a plan, given the raw slice data
/// from [`compute_recovery_slices`].
pub fn build_recovery_packets(
    set_id: RecoverySetId,
    first_recovery_block: u32,
    slices: Vec<Vec<u8>>,
) -> Vec<RecoverySlicePacket> {
    slices
        .into_iter()
        .enumerate()
        .map(|(i, data)| RecoverySlicePacket::new(set_id, first_recovery_block + i as u32, data))
        .collect()
}

/// The base name recovery volumes and the index file share, e.g.
/// `archive` for `archive.par2` / `archive.vol000+001.par2` (§4.9/§6).
pub fn recovery_set_base_name(first_source_file_name: &str) -> String {
    first_source_file_name.to_string()
}

/// Names one recovery volume: `<base>.volLOW+COUNT.par2`, zero-padded to the
/// width of the largest exponent in the set so filenames sort correctly.
pub fn volume_file_name(base_name: &str, volume: VolumeAllocation, exponent_width: usize) -> String {
    format!(
        "{base_name}.vol{:0width$}+{}.par2",
        volume.exponent_low,
        volume.count,
        width = exponent_width
    )
}

/// Names the index file that carries only critical packets: `<base>.par2`.
pub fn index_file_name(base_name: &str) -> String {
    format!("{base_name}.par2")
}
