use crate::domain::{Crc32Value, FileId, Md5Hash};
use crate::packets::{FileDescriptionPacket, MainPacket, Packet};
use rustc_hash::FxHashMap as HashMap;

/// Functional packet processing utilities
///
/// This module provides functional, reusable utilities for extracting and processing
/// information from PAR2 packets. These functions are designed to be pure, efficient,
/// and composable.
/// Extract main packet information
///
/// Returns the first MainPacket found, or None if no MainPacket exists
pub fn extract_main_packet(packets: &[Packet]) -> Option<&MainPacket> {
    packets.iter().find_map(|p| {
        if let Packet::Main(main) = p {
            Some(main)
        } else {
            None
        }
    })
}

/// Count recovery blocks available
///
/// Returns the total number of RecoverySlice packets
pub fn count_recovery_blocks(packets: &[Packet]) -> usize {
    packets
        .iter()
        .filter(|p| matches!(p, Packet::RecoverySlice(_)))
        .count()
}

/// Extract file descriptions (deduplicated by file_id)
///
/// Returns unique FileDescriptionPackets. When the same file_id appears in more than
/// one volume, the first one encountered wins (PAR2 volumes are expected to carry
/// identical copies of each description packet; the first is as good as any, and
/// this keeps dedup order-independent of which volume happened to load last).
pub fn extract_file_descriptions(packets: &[Packet]) -> Vec<&FileDescriptionPacket> {
    let mut seen: HashMap<FileId, &FileDescriptionPacket> = HashMap::default();
    for p in packets {
        if let Packet::FileDescription(fd) = p {
            seen.entry(fd.file_id).or_insert(fd);
        }
    }
    seen.into_values().collect()
}

/// Extract slice checksums indexed by file ID
///
/// Returns a map from FileId to vectors of (MD5, CRC32) checksum pairs for each block
pub fn extract_slice_checksums(packets: &[Packet]) -> HashMap<FileId, Vec<(Md5Hash, Crc32Value)>> {
    packets
        .iter()
        .filter_map(|p| {
            if let Packet::InputFileSliceChecksum(ifsc) = p {
                Some((ifsc.file_id, ifsc.slice_checksums.clone()))
            } else {
                None
            }
        })
        .collect()
}

/// Extract main packet statistics (block size and total blocks)
///
/// Returns (block_size, total_blocks) calculated from MainPacket and FileDescriptions
/// This is more efficient than calculating separately
pub fn extract_main_stats(packets: &[Packet]) -> (u64, usize) {
    let main_packet = extract_main_packet(packets);
    let block_size = main_packet.map(|m| m.slice_size).unwrap_or(0);

    let total_blocks = if block_size > 0 {
        extract_file_descriptions(packets)
            .into_iter()
            .map(|fd| fd.file_length.div_ceil(block_size) as usize)
            .sum()
    } else {
        0
    };

    (block_size, total_blocks)
}

/// Extract file information as a map from filename to (file_id, md5_hash, file_length)
///
/// This is useful for file analysis and verification operations
pub fn extract_file_info(packets: &[Packet]) -> HashMap<String, (FileId, Md5Hash, u64)> {
    extract_file_descriptions(packets)
        .into_iter()
        .filter_map(|fd| {
            std::str::from_utf8(&fd.file_name).ok().map(|file_name| {
                let clean_name = file_name.trim_end_matches('\0').to_string();
                (clean_name, (fd.file_id, fd.md5_hash, fd.file_length))
            })
        })
        .collect()
}

/// Extract file descriptions in main packet order
///
/// Returns FileDescriptions in the same order as specified in MainPacket.file_ids
/// This is critical for correct global slice indexing in repair operations
pub fn extract_ordered_file_descriptions(packets: &[Packet]) -> Vec<FileDescriptionPacket> {
    let main_packet = match extract_main_packet(packets) {
        Some(main) => main,
        None => return Vec::new(),
    };

    // Build lookup map for O(1) access, first occurrence wins (matches
    // extract_file_descriptions' dedup rule).
    let mut fd_map: HashMap<FileId, FileDescriptionPacket> = HashMap::default();
    for p in packets {
        if let Packet::FileDescription(fd) = p {
            fd_map.entry(fd.file_id).or_insert_with(|| fd.clone());
        }
    }

    // Return files in main packet order
    main_packet
        .file_ids
        .iter()
        .filter_map(|file_id| fd_map.get(file_id).cloned())
        .collect()
}

/// Separate packets by type for efficient processing
///
/// Returns (main_packet, file_descriptions, slice_checksums, recovery_count)
/// This is useful when you need to process multiple packet types efficiently
pub fn separate_packets(
    packets: Vec<Packet>,
) -> (
    Option<MainPacket>,
    Vec<FileDescriptionPacket>,
    Vec<crate::packets::InputFileSliceChecksumPacket>,
    usize,
) {
    let mut main_packet = None;
    let mut file_descriptions = Vec::new();
    let mut slice_checksums = Vec::new();
    let mut recovery_count = 0;

    for packet in packets {
        match packet {
            Packet::Main(main) => main_packet = Some(main),
            Packet::FileDescription(fd) => file_descriptions.push(fd),
            Packet::InputFileSliceChecksum(ifsc) => slice_checksums.push(ifsc),
            Packet::RecoverySlice(_) => recovery_count += 1,
            _ => {} // Ignore other packet types
        }
    }

    (
        main_packet,
        file_descriptions,
        slice_checksums,
        recovery_count,
    )
}

/// Extract clean filenames from file description packets
///
/// Returns a vector of clean filenames (null-terminated strings cleaned up)
pub fn extract_filenames(packets: &[Packet]) -> Vec<String> {
    extract_file_descriptions(packets)
        .into_iter()
        .filter_map(|fd| {
            std::str::from_utf8(&fd.file_name)
                .ok()
                .map(|name| name.trim_end_matches('\0').to_string())
        })
        .collect::<std::collections::HashSet<_>>() // Deduplicate
        .into_iter()
        .collect()
}
