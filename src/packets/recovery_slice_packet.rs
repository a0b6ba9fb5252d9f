use crate::domain::{Md5Hash, RecoverySetId};
use binrw::{BinRead, BinWrite};

pub const TYPE_OF_PACKET: &[u8] = b"PAR 2.0\0RecvSlic";

/// One recovery slice: `exponent` selects which row of the generator matrix
/// produced `recovery_data`, which is exactly one slice_size long.
#[derive(Debug, Clone, BinRead)]
#[br(magic = b"PAR2\0PKT")]
pub struct RecoverySlicePacket {
    pub length: u64, // Length of the packet
    #[br(map = |x: [u8; 16]| Md5Hash::from(x))]
    pub md5: Md5Hash, // MD5 hash of the packet
    #[br(map = |x: [u8; 16]| RecoverySetId::from(x))]
    pub set_id: RecoverySetId, // Unique identifier for the PAR2 set
    pub type_of_packet: [u8; 16], // Type of packet - should be "PAR 2.0\0RecvSlic"
    pub exponent: u32,           // Exponent used to generate recovery data
    #[br(count = length as usize - (8 + 8 + 16 + 16 + 16 + 4))]
    // Calculate recovery data size: total length - (magic + length + md5 + set_id + type + exponent)
    pub recovery_data: Vec<u8>, // Recovery data
}

impl RecoverySlicePacket {
    /// Builds a new Recovery Slice packet and computes its body MD5 and length.
    pub fn new(set_id: RecoverySetId, exponent: u32, recovery_data: Vec<u8>) -> Self {
        let length = 64 + 4 + recovery_data.len() as u64;
        let mut packet = RecoverySlicePacket {
            length,
            md5: Md5Hash::new([0; 16]),
            set_id,
            type_of_packet: TYPE_OF_PACKET.try_into().expect("16-byte type tag"),
            exponent,
            recovery_data,
        };
        packet.md5 = packet.compute_md5();
        packet
    }

    fn compute_md5(&self) -> Md5Hash {
        let mut data = Vec::new();
        data.extend_from_slice(self.set_id.as_bytes());
        data.extend_from_slice(TYPE_OF_PACKET);
        data.extend_from_slice(&self.exponent.to_le_bytes());
        data.extend_from_slice(&self.recovery_data);
        use md5::Digest;
        let digest: [u8; 16] = md5::Md5::digest(&data).into();
        Md5Hash::from(digest)
    }

    /// Verifies the MD5 hash of the packet.
    /// Computes the MD5 hash of the serialized fields and compares it to the stored MD5 value.
    pub fn verify(&self) -> bool {
        if self.length < 64 {
            println!("Invalid packet length: {}", self.length);
            return false;
        }
        if self.compute_md5() != self.md5 {
            println!("MD5 verification failed");
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

impl BinWrite for RecoverySlicePacket {
    type Args<'a> = ();

    fn write_options<W: std::io::Write + std::io::Seek>(
        &self,
        writer: &mut W,
        _endian: binrw::Endian,
        _args: Self::Args<'_>,
    ) -> binrw::BinResult<()> {
        writer.write_all(b"PAR2\0PKT")?;
        writer.write_all(&self.length.to_le_bytes())?;
        writer.write_all(self.md5.as_bytes())?;
        writer.write_all(self.set_id.as_bytes())?;
        writer.write_all(&self.type_of_packet)?;
        writer.write_all(&self.exponent.to_le_bytes())?;
        writer.write_all(&self.recovery_data)?;
        Ok(())
    }
}
