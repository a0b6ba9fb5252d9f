use crate::domain::{FileId, Md5Hash, RecoverySetId};
use binrw::{BinRead, BinWrite};

pub const TYPE_OF_PACKET: &[u8] = b"PAR 2.0\0FileDesc";

/// Describes one protected file: its identity, size, and the two MD5 hashes
/// used to locate it (full-file hash and hash of the first 16kB).
#[derive(Debug, Clone, BinRead)]
#[br(magic = b"PAR2\0PKT")]
pub struct FileDescriptionPacket {
    pub length: u64, // Length of the packet
    #[br(map = |x: [u8; 16]| Md5Hash::from(x))]
    pub md5: Md5Hash, // MD5 hash of the packet
    #[br(map = |x: [u8; 16]| RecoverySetId::from(x))]
    pub set_id: RecoverySetId, // Unique identifier for the PAR2 set
    #[br(pad_after = 16, map = |x: [u8; 16]| FileId::from(x))] // Skip the `type_of_packet` field
    pub file_id: FileId, // Unique identifier for the file
    #[br(map = |x: [u8; 16]| Md5Hash::from(x))]
    pub md5_hash: Md5Hash, // MD5 hash of the entire file
    #[br(map = |x: [u8; 16]| Md5Hash::from(x))]
    pub md5_16k: Md5Hash, // MD5 hash of the first 16kB of the file
    pub file_length: u64, // Length of the file
    #[br(count = length - 120)]
    pub file_name: Vec<u8>, // Name of the file (not null-terminated)
}

impl FileDescriptionPacket {
    /// Derives the file ID for a file from its 16k hash, length, and name,
    /// per the PAR2 file ID definition.
    pub fn derive_file_id(md5_16k: &Md5Hash, file_length: u64, file_name: &[u8]) -> FileId {
        use md5::Digest;
        let mut hasher = md5::Md5::new();
        hasher.update(md5_16k.as_bytes());
        hasher.update(file_length.to_le_bytes());
        hasher.update(file_name);
        let digest: [u8; 16] = hasher.finalize().into();
        FileId::from(digest)
    }

    /// Builds a new File Description packet, deriving `file_id` and the body MD5.
    pub fn new(
        set_id: RecoverySetId,
        md5_hash: Md5Hash,
        md5_16k: Md5Hash,
        file_length: u64,
        file_name: Vec<u8>,
    ) -> Self {
        let file_id = Self::derive_file_id(&md5_16k, file_length, &file_name);
        let length = 120 + file_name.len() as u64;
        let mut packet = FileDescriptionPacket {
            length,
            md5: Md5Hash::new([0; 16]),
            set_id,
            file_id,
            md5_hash,
            md5_16k,
            file_length,
            file_name,
        };
        packet.md5 = packet.compute_md5();
        packet
    }

    fn body_bytes(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.length as usize - 32);
        data.extend_from_slice(self.set_id.as_bytes());
        data.extend_from_slice(TYPE_OF_PACKET);
        data.extend_from_slice(self.file_id.as_bytes());
        data.extend_from_slice(self.md5_hash.as_bytes());
        data.extend_from_slice(self.md5_16k.as_bytes());
        data.extend_from_slice(&self.file_length.to_le_bytes());
        data.extend_from_slice(&self.file_name);
        data
    }

    fn compute_md5(&self) -> Md5Hash {
        use md5::Digest;
        let digest: [u8; 16] = md5::Md5::digest(self.body_bytes()).into();
        Md5Hash::from(digest)
    }

    /// Verifies the packet MD5 and that re-serialization reproduces `length`.
    pub fn verify(&self) -> bool {
        if self.length < 120 {
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

impl BinWrite for FileDescriptionPacket {
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
        writer.write_all(self.file_id.as_bytes())?;
        writer.write_all(self.md5_hash.as_bytes())?;
        writer.write_all(self.md5_16k.as_bytes())?;
        writer.write_all(&self.file_length.to_le_bytes())?;
        writer.write_all(&self.file_name)?;
        Ok(())
    }
}
