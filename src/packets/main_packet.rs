use crate::domain::{FileId, Md5Hash, RecoverySetId};
use binrw::{BinRead, BinWrite};

pub const TYPE_OF_PACKET: &[u8] = b"PAR 2.0\0Main\0\0\0\0";

/// The Main packet. Every recovery set has exactly one: it fixes the slice
/// size for the set and records which files are recoverable.
///
/// ```rust
/// use binrw::BinReaderExt;
/// use par2rs::domain::{FileId, RecoverySetId};
/// use par2rs::packets::main_packet::MainPacket;
///
/// let packet = MainPacket::new(
///     RecoverySetId::new([1; 16]),
///     4096,
///     vec![FileId::new([2; 16])],
///     vec![],
/// );
/// assert!(packet.verify());
///
/// let mut buffer = std::io::Cursor::new(Vec::new());
/// binrw::BinWrite::write_le(&packet, &mut buffer).unwrap();
/// buffer.set_position(0);
/// let read_back: MainPacket = buffer.read_le().unwrap();
/// assert_eq!(read_back.file_ids.len(), 1);
/// assert!(read_back.verify());
/// ```
#[derive(Debug, Clone, BinRead)]
#[br(magic = b"PAR2\0PKT")]
pub struct MainPacket {
    pub length: u64, // Length of the packet
    #[br(map = |x: [u8; 16]| Md5Hash::from(x))]
    pub md5: Md5Hash, // MD5 hash of the packet
    #[br(map = |x: [u8; 16]| RecoverySetId::from(x))]
    pub set_id: RecoverySetId, // Unique identifier for the PAR2 set
    #[br(pad_after = 16)] // Skip the `type_of_packet` field
    pub slice_size: u64, // Size of each slice
    pub file_count: u32, // Number of files in the recovery set
    #[br(count = file_count, map = |v: Vec<[u8; 16]>| v.into_iter().map(FileId::from).collect())]
    pub file_ids: Vec<FileId>, // File IDs of all files in the recovery set, in set order
    #[br(count = (length - 76 - (file_count as u64 * 16)) / 16, map = |v: Vec<[u8; 16]>| v.into_iter().map(FileId::from).collect())]
    pub non_recovery_file_ids: Vec<FileId>, // File IDs of all files in the non-recovery set
}

impl MainPacket {
    /// Builds a new Main packet and computes its body MD5 and packet length.
    pub fn new(
        set_id: RecoverySetId,
        slice_size: u64,
        file_ids: Vec<FileId>,
        non_recovery_file_ids: Vec<FileId>,
    ) -> Self {
        let file_count = file_ids.len() as u32;
        let length = 76 + (file_ids.len() as u64 * 16) + (non_recovery_file_ids.len() as u64 * 16);
        let mut packet = MainPacket {
            length,
            md5: Md5Hash::new([0; 16]),
            set_id,
            slice_size,
            file_count,
            file_ids,
            non_recovery_file_ids,
        };
        packet.md5 = packet.compute_md5();
        packet
    }

    fn body_bytes(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.length as usize - 32);
        data.extend_from_slice(self.set_id.as_bytes());
        data.extend_from_slice(TYPE_OF_PACKET);
        data.extend_from_slice(&self.slice_size.to_le_bytes());
        data.extend_from_slice(&self.file_count.to_le_bytes());
        for id in &self.file_ids {
            data.extend_from_slice(id.as_bytes());
        }
        for id in &self.non_recovery_file_ids {
            data.extend_from_slice(id.as_bytes());
        }
        data
    }

    fn compute_md5(&self) -> Md5Hash {
        use md5::Digest;
        let digest: [u8; 16] = md5::Md5::digest(self.body_bytes()).into();
        Md5Hash::from(digest)
    }

    /// Verifies the packet MD5 and that re-serialization reproduces `length`.
    pub fn verify(&self) -> bool {
        if self.length < 76 {
            return false;
        }
        if self.compute_md5() != self.md5 {
            return false;
        }
        let mut buffer = std::io::Cursor::new(Vec::new());
        if self.write_le(&mut buffer).is_err() {
            return false;
        }
        buffer.get_ref().len() as u64 == self.length
    }
}

impl BinWrite for MainPacket {
    type Args<'a> = ();

    fn write_options<W: std::io::Write + std::io::Seek>(
        &self,
        writer: &mut W,
        _endian: binrw::Endian,
        _args: Self::Args<'_>,
    ) -> binrw::BinResult<()> {
        writer.write_all(super::MAGIC_BYTES)?;
        writer.write_all(&self.length.to_le_bytes())?;
        writer.write_all(self.md5.as_bytes())?;
        writer.write_all(self.set_id.as_bytes())?;
        writer.write_all(TYPE_OF_PACKET)?;
        writer.write_all(&self.slice_size.to_le_bytes())?;
        writer.write_all(&self.file_count.to_le_bytes())?;
        for id in &self.file_ids {
            writer.write_all(id.as_bytes())?;
        }
        for id in &self.non_recovery_file_ids {
            writer.write_all(id.as_bytes())?;
        }
        Ok(())
    }
}
