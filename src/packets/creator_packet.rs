use crate::domain::{Md5Hash, RecoverySetId};
use binrw::{BinRead, BinWrite};

pub const TYPE_OF_PACKET: &[u8] = b"PAR 2.0\0Creator\0";

/// Identifies the client that created a recovery set. Purely informational;
/// readers must tolerate any content here.
#[derive(Debug, Clone, BinRead)]
#[br(magic = b"PAR2\0PKT")]
pub struct CreatorPacket {
    pub length: u64, // Length of the packet
    #[br(map = |x: [u8; 16]| Md5Hash::from(x))]
    pub md5: Md5Hash, // MD5 hash of the packet
    #[br(pad_after = 16, map = |x: [u8; 16]| RecoverySetId::from(x))] // Skip the `type_of_packet` field
    pub set_id: RecoverySetId, // Unique identifier for the PAR2 set
    #[br(count = length as usize - 64)]
    pub creator_info: Vec<u8>, // ASCII text identifying the client
}

impl CreatorPacket {
    /// Builds a new Creator packet, computing the body MD5 and packet length.
    pub fn new(set_id: RecoverySetId, creator_info: Vec<u8>) -> Self {
        let length = 64 + creator_info.len() as u64;
        let mut packet = CreatorPacket {
            length,
            md5: Md5Hash::new([0; 16]),
            set_id,
            creator_info,
        };
        packet.md5 = packet.compute_md5();
        packet
    }

    fn body_bytes(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.length as usize - 32);
        data.extend_from_slice(self.set_id.as_bytes());
        data.extend_from_slice(TYPE_OF_PACKET);
        data.extend_from_slice(&self.creator_info);
        data
    }

    fn compute_md5(&self) -> Md5Hash {
        use md5::Digest;
        let digest: [u8; 16] = md5::Md5::digest(self.body_bytes()).into();
        Md5Hash::from(digest)
    }

    /// Verifies the packet MD5 and that re-serialization reproduces `length`.
    pub fn verify(&self) -> bool {
        if self.length < 64 {
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

impl BinWrite for CreatorPacket {
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
        writer.write_all(&self.creator_info)?;
        Ok(())
    }
}
