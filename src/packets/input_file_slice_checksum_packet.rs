use crate::domain::{Crc32Value, FileId, Md5Hash, RecoverySetId};
use binrw::{BinRead, BinWrite};

pub const TYPE_OF_PACKET: &[u8] = b"PAR 2.0\0IFSC\0\0\0\0";

/// Per-slice MD5+CRC32 checksums for one file, used to identify which
/// blocks of a (possibly damaged or renamed) file are intact.
#[derive(Debug, Clone)]
pub struct InputFileSliceChecksumPacket {
    pub length: u64,
    pub md5: Md5Hash,
    pub set_id: RecoverySetId,
    pub file_id: FileId,
    pub slice_checksums: Vec<(Md5Hash, Crc32Value)>,
}

impl BinRead for InputFileSliceChecksumPacket {
    type Args<'a> = ();

    fn read_options<R: std::io::Read + std::io::Seek>(
        reader: &mut R,
        _endian: binrw::Endian,
        _args: Self::Args<'_>,
    ) -> binrw::BinResult<Self> {
        // Bulk-read the fixed 64-byte header in one syscall.
        let mut header = [0u8; 64];
        reader.read_exact(&mut header).map_err(binrw::Error::Io)?;

        if &header[0..8] != b"PAR2\0PKT" {
            return Err(binrw::Error::AssertFail {
                pos: 0,
                message: "Invalid magic".to_string(),
            });
        }

        let length = u64::from_le_bytes(header[8..16].try_into().unwrap());
        let md5 = Md5Hash::from(<[u8; 16]>::try_from(&header[16..32]).unwrap());
        let set_id = RecoverySetId::from(<[u8; 16]>::try_from(&header[32..48]).unwrap());
        // header[48..64] is type_of_packet, already dispatched on by the caller.

        let mut file_id_bytes = [0u8; 16];
        reader
            .read_exact(&mut file_id_bytes)
            .map_err(binrw::Error::Io)?;
        let file_id = FileId::from(file_id_bytes);

        let num_checksums = ((length - 64 - 16) / 20) as usize;
        let mut buffer = vec![0u8; num_checksums * 20];
        reader.read_exact(&mut buffer).map_err(binrw::Error::Io)?;

        let mut slice_checksums = Vec::with_capacity(num_checksums);
        for chunk in buffer.chunks_exact(20) {
            let md5_bytes: [u8; 16] = chunk[0..16].try_into().unwrap();
            let crc32 = u32::from_le_bytes(chunk[16..20].try_into().unwrap());
            slice_checksums.push((Md5Hash::from(md5_bytes), Crc32Value::new(crc32)));
        }

        Ok(InputFileSliceChecksumPacket {
            length,
            md5,
            set_id,
            file_id,
            slice_checksums,
        })
    }
}

impl InputFileSliceChecksumPacket {
    /// Builds a new IFSC packet for `file_id`, computing the body MD5 and length.
    pub fn new(
        set_id: RecoverySetId,
        file_id: FileId,
        slice_checksums: Vec<(Md5Hash, Crc32Value)>,
    ) -> Self {
        let length = 64 + 16 + (slice_checksums.len() as u64 * 20);
        let mut packet = InputFileSliceChecksumPacket {
            length,
            md5: Md5Hash::new([0; 16]),
            set_id,
            file_id,
            slice_checksums,
        };
        packet.md5 = packet.compute_md5();
        packet
    }

    fn body_bytes(&self) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(self.set_id.as_bytes());
        data.extend_from_slice(TYPE_OF_PACKET);
        data.extend_from_slice(self.file_id.as_bytes());
        for (md5, crc32) in &self.slice_checksums {
            data.extend_from_slice(md5.as_bytes());
            data.extend_from_slice(&crc32.to_le_bytes());
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
        if self.length < 64 {
            println!("Invalid packet length: {}", self.length);
            return false;
        }
        if self.compute_md5() != self.md5 {
            println!("MD5 mismatch for InputFileSliceChecksumPacket");
            return false;
        }

        let mut buffer = std::io::Cursor::new(Vec::new());
        if self.write_le(&mut buffer).is_err() {
            return false;
        }
        buffer.get_ref().len() as u64 == self.length
    }
}

impl BinWrite for InputFileSliceChecksumPacket {
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
        for (md5, crc32) in &self.slice_checksums {
            writer.write_all(md5.as_bytes())?;
            writer.write_all(&crc32.to_le_bytes())?;
        }
        Ok(())
    }
}
