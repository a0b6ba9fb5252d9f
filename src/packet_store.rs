//! Recovery-set packet store (C6).
//!
//! Indexes packets discovered across any number of volumes by
//! `(set_id, type, discriminator)` and applies the dedup/rejection rules
//! from the on-disk format: first packet wins the active Set ID, later
//! packets with a different Set ID are ignored, and duplicate
//! description/verification/recovery packets keep their first copy.

use crate::domain::{FileId, RecoverySetId};
use crate::packets::{
    FileDescriptionPacket, InputFileSliceChecksumPacket, MainPacket, Packet, RecoverySlicePacket,
};
use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};

/// Why a packet was rejected by the store. Surfaced for diagnostics; never
/// fatal on its own (§4.6, §7 `FormatError`/`IntegrityError`).
#[derive(Debug, Clone)]
pub enum RejectReason {
    WrongSetId,
    DuplicateFileDescription(FileId),
    DuplicateVerification(FileId),
    DuplicateRecoveryExponent(u32),
    RecoveryBodySizeMismatch { expected: u64, actual: u64 },
    VerificationBlockCountMismatch { file_id: FileId, declared: usize, expected: usize },
    FailedSelfVerification,
}

/// Accumulates packets belonging to one recovery set, enforcing the
/// insertion rules of §4.6.
#[derive(Debug, Default)]
pub struct PacketStore {
    set_id: Option<RecoverySetId>,
    main: Option<MainPacket>,
    creator: Option<crate::packets::CreatorPacket>,
    descriptions: HashMap<FileId, FileDescriptionPacket>,
    verifications: HashMap<FileId, InputFileSliceChecksumPacket>,
    recovery: HashMap<u32, RecoverySlicePacket>,
    rejections: Vec<RejectReason>,
}

impl PacketStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The Set ID that the first-inserted packet established, if any.
    pub fn set_id(&self) -> Option<RecoverySetId> {
        self.set_id
    }

    pub fn rejections(&self) -> &[RejectReason] {
        &self.rejections
    }

    /// Inserts every packet from `packets` one at a time, in order.
    pub fn insert_all(&mut self, packets: impl IntoIterator<Item = Packet>) {
        for packet in packets {
            self.insert(packet);
        }
    }

    /// Inserts a single packet, applying the dedup/rejection rules. Returns
    /// `true` if the packet was accepted into the store.
    pub fn insert(&mut self, packet: Packet) -> bool {
        if !packet.verify() {
            self.rejections.push(RejectReason::FailedSelfVerification);
            return false;
        }

        let packet_set_id = packet_set_id(&packet);
        match self.set_id {
            None => self.set_id = Some(packet_set_id),
            Some(active) if active != packet_set_id => {
                self.rejections.push(RejectReason::WrongSetId);
                return false;
            }
            Some(_) => {}
        }

        match packet {
            Packet::Main(main) => {
                if self.main.is_none() {
                    self.main = Some(main);
                }
                true
            }
            Packet::PackedMain(_) => {
                // Interop-only read path; not part of the canonical active set.
                true
            }
            Packet::Creator(creator) => {
                if self.creator.is_none() {
                    self.creator = Some(creator);
                }
                true
            }
            Packet::FileDescription(fd) => {
                if self.descriptions.contains_key(&fd.file_id) {
                    self.rejections
                        .push(RejectReason::DuplicateFileDescription(fd.file_id));
                    false
                } else {
                    self.descriptions.insert(fd.file_id, fd);
                    true
                }
            }
            Packet::InputFileSliceChecksum(ifsc) => self.insert_verification(ifsc),
            Packet::RecoverySlice(slice) => self.insert_recovery(slice),
        }
    }

    fn insert_verification(&mut self, ifsc: InputFileSliceChecksumPacket) -> bool {
        if self.verifications.contains_key(&ifsc.file_id) {
            self.rejections
                .push(RejectReason::DuplicateVerification(ifsc.file_id));
            return false;
        }

        // A verification packet's declared block count must agree with the
        // file's length divided by the set's block size, once known;
        // otherwise the whole file record (description + verification) is
        // dropped together.
        if let Some(main) = &self.main {
            if main.slice_size > 0 {
                if let Some(fd) = self.descriptions.get(&ifsc.file_id) {
                    let expected = fd.file_length.div_ceil(main.slice_size) as usize;
                    if ifsc.slice_checksums.len() != expected {
                        self.rejections.push(RejectReason::VerificationBlockCountMismatch {
                            file_id: ifsc.file_id,
                            declared: ifsc.slice_checksums.len(),
                            expected,
                        });
                        self.descriptions.remove(&ifsc.file_id);
                        return false;
                    }
                }
            }
        }

        self.verifications.insert(ifsc.file_id, ifsc);
        true
    }

    fn insert_recovery(&mut self, slice: RecoverySlicePacket) -> bool {
        if self.recovery.contains_key(&slice.exponent) {
            self.rejections
                .push(RejectReason::DuplicateRecoveryExponent(slice.exponent));
            return false;
        }

        if let Some(main) = &self.main {
            let expected = main.slice_size;
            let actual = slice.recovery_data.len() as u64;
            if expected != 0 && actual != expected {
                self.rejections.push(RejectReason::RecoveryBodySizeMismatch { expected, actual });
                return false;
            }
        }

        self.recovery.insert(slice.exponent, slice);
        true
    }

    pub fn main_packet(&self) -> Option<&MainPacket> {
        self.main.as_ref()
    }

    pub fn creator_packet(&self) -> Option<&crate::packets::CreatorPacket> {
        self.creator.as_ref()
    }

    pub fn descriptions(&self) -> impl Iterator<Item = &FileDescriptionPacket> {
        self.descriptions.values()
    }

    pub fn verification_for(&self, file_id: &FileId) -> Option<&InputFileSliceChecksumPacket> {
        self.verifications.get(file_id)
    }

    pub fn recovery_exponents(&self) -> HashSet<u32> {
        self.recovery.keys().copied().collect()
    }

    pub fn recovery_block(&self, exponent: u32) -> Option<&RecoverySlicePacket> {
        self.recovery.get(&exponent)
    }

    pub fn recovery_block_count(&self) -> usize {
        self.recovery.len()
    }

    /// An absent Main packet is fatal: without it there is no block size
    /// and no ordered file list to reconstruct against.
    pub fn require_main(&self) -> Result<&MainPacket, crate::error::Par2Error> {
        self.main
            .as_ref()
            .ok_or_else(|| crate::error::Par2Error::InsufficientMetadata("no Main packet".into()))
    }
}

/// Runs `packets` through a [`PacketStore`], applying the Set ID gate and
/// per-kind discriminator dedup, and hands back the accepted packets
/// (order is not preserved; nothing downstream depends on load order once
/// packets are grouped by kind). `Packet::PackedMain` is interop-only and is
/// dropped here, matching that nothing in the active recovery set reads it.
pub fn dedup_through_store(packets: Vec<Packet>) -> Vec<Packet> {
    let mut store = PacketStore::new();
    store.insert_all(packets);

    let mut out = Vec::new();
    if let Some(main) = store.main {
        out.push(Packet::Main(main));
    }
    if let Some(creator) = store.creator {
        out.push(Packet::Creator(creator));
    }
    out.extend(store.descriptions.into_values().map(Packet::FileDescription));
    out.extend(
        store
            .verifications
            .into_values()
            .map(Packet::InputFileSliceChecksum),
    );
    out.extend(store.recovery.into_values().map(Packet::RecoverySlice));
    out
}

fn packet_set_id(packet: &Packet) -> RecoverySetId {
    match packet {
        Packet::Main(p) => p.set_id,
        Packet::PackedMain(p) => p.set_id,
        Packet::FileDescription(p) => p.set_id,
        Packet::InputFileSliceChecksum(p) => p.set_id,
        Packet::RecoverySlice(p) => p.set_id,
        Packet::Creator(p) => p.set_id,
    }
}
