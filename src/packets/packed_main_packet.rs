use crate::domain::{FileId, Md5Hash, RecoverySetId};
use binrw::{BinRead, BinWrite};

pub const TYPE_OF_PACKET: &[u8] = b"PAR 2.0\0PkdMain\0";

/// The "packed" Main packet variant used by clients that need a single
/// packet carrying both slice/subslice sizing and the full file ID lists.
/// par2rs reads this for interoperability but does not emit it.
#[derive(Debug, BinRead)]
#[br(magic = b"PAR2\0PKT")]
pub struct PackedMainPacket {
    pub length: u64, // Length of the packet
    #[br(map = |x: [u8; 16]| Md5Hash::from(x))]
    pub md5: Md5Hash, // MD5 hash of the packet
    #[br(pad_after = 16, map = |x: [u8; 16]| RecoverySetId::from(x))] // Skip the `type_of_packet` field
    pub set_id: RecoverySetId, // Unique identifier for the PAR2 set
    pub subslice_size: u64, // Subslice size. Must be a multiple of 4 and equally divide the slice size.
    pub slice_size: u64, // Slice size. Must be a multiple of 4 and a multiple of the subslice size.
    pub file_count: u32, // Number of files in the recovery set.
    #[br(count = file_count, map = |v: Vec<[u8; 16]>| v.into_iter().map(FileId::from).collect())]
    pub recovery_set_ids: Vec<FileId>, // File IDs of all files in the recovery set.
    #[br(count = (length as usize - 64 - 8 - 8 - 4 - (file_count as usize * 16)) / 16, map = |v: Vec<[u8; 16]>| v.into_iter().map(FileId::from).collect())]
    pub non_recovery_set_ids: Vec<FileId>, // File IDs of all files in the non-recovery set.
}

impl PackedMainPacket {
    /// Verifies the MD5 hash of the packet.
    /// Computes the MD5 hash of the serialized fields and compares it to the stored MD5 value.
    pub fn verify(&self) -> bool {
        if self.length < 64 {
            println!("Invalid packet length: {}", self.length);
            return false;
        }
        let mut data = Vec::new();
        data.extend_from_slice(self.set_id.as_bytes());
        data.extend_from_slice(TYPE_OF_PACKET);
        data.extend_from_slice(&self.subslice_size.to_le_bytes());
        data.extend_from_slice(&self.slice_size.to_le_bytes());
        data.extend_from_slice(&self.file_count.to_le_bytes());
        for id in &self.recovery_set_ids {
            data.extend_from_slice(id.as_bytes());
        }
        for id in &self.non_recovery_set_ids {
            data.extend_from_slice(id.as_bytes());
        }
        let computed_md5 = md5::compute(&data);
        if computed_md5.as_ref() != self.md5.as_bytes() {
            return false;
        }

        // Check that BinWrite output matches the packet length
        let mut buffer = std::io::Cursor::new(Vec::new());
        if self.write_le(&mut buffer).is_err() {
            println!("Failed to serialize packet");
            return false;
        }

        let serialized_length = buffer.get_ref().len() as u64;
        if serialized_length != self.length {
            println!(
                "Serialized length mismatch: expected {}, got {}",
                self.length, serialized_length
            );
            return false;
        }

        true
    }
}

impl BinWrite for PackedMainPacket {
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
        writer.write_all(&self.subslice_size.to_le_bytes())?;
        writer.write_all(&self.slice_size.to_le_bytes())?;
        writer.write_all(&self.file_count.to_le_bytes())?;
        for id in &self.recovery_set_ids {
            writer.write_all(id.as_bytes())?;
        }
        for id in &self.non_recovery_set_ids {
            writer.write_all(id.as_bytes())?;
        }
        Ok(())
    }
}
