use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{self, Cursor, Write};

use crate::error::{Error, Result};

use super::stream::ArchiveStream;

/// Version needed to extract: 2.0, the baseline every reader supports.
pub const VERSION_NEEDED: u16 = 20;

/// Version made by: 2.0, host system 0 (MS-DOS / FAT attributes).
pub const VERSION_MADE_BY: u16 = 0x0014;

/// Largest entry count a classic EOCD can carry. `0xFFFF` marks ZIP64.
pub const MAX_ENTRIES: u64 = 0xFFFE;

/// Largest size or offset a classic 32-bit field can carry. `0xFFFFFFFF` marks ZIP64.
pub const MAX_32BIT_VALUE: u64 = 0xFFFF_FFFE;

/// Longest file name a 16-bit length field can describe.
pub const MAX_NAME_LENGTH: u64 = 0xFFFF;

/// ZIP compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Unknown(u16),
}

impl CompressionMethod {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => CompressionMethod::Stored,
            _ => CompressionMethod::Unknown(value),
        }
    }

    pub fn as_u16(&self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
            CompressionMethod::Unknown(v) => *v,
        }
    }
}

/// Local File Header (LFH) - 30 bytes, followed by the file name and extra field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFileHeader {
    pub version_needed: u16,
    pub flags: u16,
    pub compression_method: CompressionMethod,
    pub last_mod_time: u16,
    pub last_mod_date: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub file_name_length: u16,
    pub extra_field_length: u16,
}

impl LocalFileHeader {
    pub const SIGNATURE: &'static [u8] = b"PK\x03\x04";
    pub const SIZE: usize = 30;

    /// Header for a STORED entry with zeroed timestamps and no extra field.
    pub fn stored(crc32: u32, size: u32, file_name_length: u16) -> Self {
        Self {
            version_needed: VERSION_NEEDED,
            flags: 0,
            compression_method: CompressionMethod::Stored,
            last_mod_time: 0,
            last_mod_date: 0,
            crc32,
            compressed_size: size,
            uncompressed_size: size,
            file_name_length,
            extra_field_length: 0,
        }
    }

    pub fn write_to<W: Write>(&self, stream: &mut ArchiveStream<W>) -> io::Result<()> {
        stream.write_bytes(Self::SIGNATURE)?;
        stream.write_u16(self.version_needed)?;
        stream.write_u16(self.flags)?;
        stream.write_u16(self.compression_method.as_u16())?;
        stream.write_u16(self.last_mod_time)?;
        stream.write_u16(self.last_mod_date)?;
        stream.write_u32(self.crc32)?;
        stream.write_u32(self.compressed_size)?;
        stream.write_u32(self.uncompressed_size)?;
        stream.write_u16(self.file_name_length)?;
        stream.write_u16(self.extra_field_length)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE || &data[0..4] != Self::SIGNATURE {
            return Err(Error::InvalidZipFile("invalid local file header".to_string()));
        }

        let mut cursor = Cursor::new(&data[4..]);

        Ok(Self {
            version_needed: cursor.read_u16::<LittleEndian>()?,
            flags: cursor.read_u16::<LittleEndian>()?,
            compression_method: CompressionMethod::from_u16(cursor.read_u16::<LittleEndian>()?),
            last_mod_time: cursor.read_u16::<LittleEndian>()?,
            last_mod_date: cursor.read_u16::<LittleEndian>()?,
            crc32: cursor.read_u32::<LittleEndian>()?,
            compressed_size: cursor.read_u32::<LittleEndian>()?,
            uncompressed_size: cursor.read_u32::<LittleEndian>()?,
            file_name_length: cursor.read_u16::<LittleEndian>()?,
            extra_field_length: cursor.read_u16::<LittleEndian>()?,
        })
    }
}

/// Central Directory File Header (CDFH) - 46 bytes, followed by name, extra and comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CentralDirectoryHeader {
    pub version_made_by: u16,
    pub version_needed: u16,
    pub flags: u16,
    pub compression_method: CompressionMethod,
    pub last_mod_time: u16,
    pub last_mod_date: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub file_name_length: u16,
    pub extra_field_length: u16,
    pub file_comment_length: u16,
    pub disk_number_start: u16,
    pub internal_attrs: u16,
    pub external_attrs: u32,
    pub lfh_offset: u32,
}

impl CentralDirectoryHeader {
    pub const SIGNATURE: &'static [u8] = b"PK\x01\x02";
    pub const SIZE: usize = 46;

    /// Directory record mirroring a STORED local header at `lfh_offset`.
    pub fn stored(crc32: u32, size: u32, file_name_length: u16, lfh_offset: u32) -> Self {
        Self {
            version_made_by: VERSION_MADE_BY,
            version_needed: VERSION_NEEDED,
            flags: 0,
            compression_method: CompressionMethod::Stored,
            last_mod_time: 0,
            last_mod_date: 0,
            crc32,
            compressed_size: size,
            uncompressed_size: size,
            file_name_length,
            extra_field_length: 0,
            file_comment_length: 0,
            disk_number_start: 0,
            internal_attrs: 0,
            external_attrs: 0,
            lfh_offset,
        }
    }

    pub fn write_to<W: Write>(&self, stream: &mut ArchiveStream<W>) -> io::Result<()> {
        stream.write_bytes(Self::SIGNATURE)?;
        stream.write_u16(self.version_made_by)?;
        stream.write_u16(self.version_needed)?;
        stream.write_u16(self.flags)?;
        stream.write_u16(self.compression_method.as_u16())?;
        stream.write_u16(self.last_mod_time)?;
        stream.write_u16(self.last_mod_date)?;
        stream.write_u32(self.crc32)?;
        stream.write_u32(self.compressed_size)?;
        stream.write_u32(self.uncompressed_size)?;
        stream.write_u16(self.file_name_length)?;
        stream.write_u16(self.extra_field_length)?;
        stream.write_u16(self.file_comment_length)?;
        stream.write_u16(self.disk_number_start)?;
        stream.write_u16(self.internal_attrs)?;
        stream.write_u32(self.external_attrs)?;
        stream.write_u32(self.lfh_offset)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE || &data[0..4] != Self::SIGNATURE {
            return Err(Error::InvalidZipFile(
                "invalid central directory file header".to_string(),
            ));
        }

        let mut cursor = Cursor::new(&data[4..]);

        Ok(Self {
            version_made_by: cursor.read_u16::<LittleEndian>()?,
            version_needed: cursor.read_u16::<LittleEndian>()?,
            flags: cursor.read_u16::<LittleEndian>()?,
            compression_method: CompressionMethod::from_u16(cursor.read_u16::<LittleEndian>()?),
            last_mod_time: cursor.read_u16::<LittleEndian>()?,
            last_mod_date: cursor.read_u16::<LittleEndian>()?,
            crc32: cursor.read_u32::<LittleEndian>()?,
            compressed_size: cursor.read_u32::<LittleEndian>()?,
            uncompressed_size: cursor.read_u32::<LittleEndian>()?,
            file_name_length: cursor.read_u16::<LittleEndian>()?,
            extra_field_length: cursor.read_u16::<LittleEndian>()?,
            file_comment_length: cursor.read_u16::<LittleEndian>()?,
            disk_number_start: cursor.read_u16::<LittleEndian>()?,
            internal_attrs: cursor.read_u16::<LittleEndian>()?,
            external_attrs: cursor.read_u32::<LittleEndian>()?,
            lfh_offset: cursor.read_u32::<LittleEndian>()?,
        })
    }

    /// Bytes taken by this record including its variable-length tail.
    pub fn record_len(&self) -> usize {
        Self::SIZE
            + self.file_name_length as usize
            + self.extra_field_length as usize
            + self.file_comment_length as usize
    }
}

/// End of Central Directory (EOCD) - 22 bytes minimum
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndOfCentralDirectory {
    pub disk_number: u16,
    pub disk_with_cd: u16,
    pub disk_entries: u16,
    pub total_entries: u16,
    pub cd_size: u32,
    pub cd_offset: u32,
    pub comment_len: u16,
}

impl EndOfCentralDirectory {
    pub const SIGNATURE: &'static [u8] = b"PK\x05\x06";
    pub const SIZE: usize = 22;

    /// Single-disk trailer without an archive comment.
    pub fn single_disk(entries: u16, cd_size: u32, cd_offset: u32) -> Self {
        Self {
            disk_number: 0,
            disk_with_cd: 0,
            disk_entries: entries,
            total_entries: entries,
            cd_size,
            cd_offset,
            comment_len: 0,
        }
    }

    pub fn write_to<W: Write>(&self, stream: &mut ArchiveStream<W>) -> io::Result<()> {
        stream.write_bytes(Self::SIGNATURE)?;
        stream.write_u16(self.disk_number)?;
        stream.write_u16(self.disk_with_cd)?;
        stream.write_u16(self.disk_entries)?;
        stream.write_u16(self.total_entries)?;
        stream.write_u32(self.cd_size)?;
        stream.write_u32(self.cd_offset)?;
        stream.write_u16(self.comment_len)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE || &data[0..4] != Self::SIGNATURE {
            return Err(Error::InvalidZipFile(
                "invalid end of central directory".to_string(),
            ));
        }

        let mut cursor = Cursor::new(&data[4..]);

        Ok(Self {
            disk_number: cursor.read_u16::<LittleEndian>()?,
            disk_with_cd: cursor.read_u16::<LittleEndian>()?,
            disk_entries: cursor.read_u16::<LittleEndian>()?,
            total_entries: cursor.read_u16::<LittleEndian>()?,
            cd_size: cursor.read_u32::<LittleEndian>()?,
            cd_offset: cursor.read_u32::<LittleEndian>()?,
            comment_len: cursor.read_u16::<LittleEndian>()?,
        })
    }

    pub fn is_zip64(&self) -> bool {
        self.disk_entries == 0xFFFF
            || self.total_entries == 0xFFFF
            || self.cd_size == 0xFFFFFFFF
            || self.cd_offset == 0xFFFFFFFF
    }
}

/// Parsed ZIP file entry information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipFileEntry {
    pub file_name: String,
    pub compression_method: CompressionMethod,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub crc32: u32,
    pub lfh_offset: u32,
    pub is_directory: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(write: impl FnOnce(&mut ArchiveStream<Vec<u8>>) -> io::Result<()>) -> Vec<u8> {
        let mut stream = ArchiveStream::new(Vec::<u8>::new());
        write(&mut stream).unwrap();
        stream.into_inner()
    }

    #[test]
    fn local_header_layout() {
        let header = LocalFileHeader::stored(0xCBF4_3926, 9, 5);
        let bytes = encode(|s| header.write_to(s));

        assert_eq!(bytes.len(), LocalFileHeader::SIZE);
        assert_eq!(
            bytes,
            [
                b'P', b'K', 3, 4, // signature
                20, 0, // version needed
                0, 0, // flags
                0, 0, // method
                0, 0, 0, 0, // time, date
                0x26, 0x39, 0xF4, 0xCB, // crc32
                9, 0, 0, 0, // compressed size
                9, 0, 0, 0, // uncompressed size
                5, 0, // name length
                0, 0, // extra length
            ]
        );
        assert_eq!(LocalFileHeader::from_bytes(&bytes).unwrap(), header);
    }

    #[test]
    fn central_directory_header_layout() {
        let header = CentralDirectoryHeader::stored(0x1122_3344, 0x0102, 3, 0x0A0B_0C0D);
        let bytes = encode(|s| header.write_to(s));

        assert_eq!(bytes.len(), CentralDirectoryHeader::SIZE);
        assert_eq!(&bytes[0..4], b"PK\x01\x02");
        assert_eq!(&bytes[4..6], &[0x14, 0x00]);
        assert_eq!(&bytes[6..8], &[20, 0]);
        assert_eq!(&bytes[16..20], &[0x44, 0x33, 0x22, 0x11]);
        assert_eq!(&bytes[28..30], &[3, 0]);
        assert_eq!(&bytes[30..42], &[0u8; 12]);
        assert_eq!(&bytes[42..46], &[0x0D, 0x0C, 0x0B, 0x0A]);

        let parsed = CentralDirectoryHeader::from_bytes(&bytes).unwrap();
        assert_eq!(parsed, header);
        assert_eq!(parsed.record_len(), 49);
    }

    #[test]
    fn eocd_layout() {
        let eocd = EndOfCentralDirectory::single_disk(2, 0x5C, 0x40);
        let bytes = encode(|s| eocd.write_to(s));

        assert_eq!(
            bytes,
            [
                b'P', b'K', 5, 6, 0, 0, 0, 0, 2, 0, 2, 0, 0x5C, 0, 0, 0, 0x40, 0, 0, 0, 0, 0
            ]
        );
        assert!(!EndOfCentralDirectory::from_bytes(&bytes).unwrap().is_zip64());
    }

    #[test]
    fn rejects_wrong_signature() {
        let bytes = encode(|s| EndOfCentralDirectory::single_disk(0, 0, 0).write_to(s));
        assert!(LocalFileHeader::from_bytes(&bytes).is_err());
        assert!(CentralDirectoryHeader::from_bytes(&bytes).is_err());
        assert!(EndOfCentralDirectory::from_bytes(&bytes[..10]).is_err());
    }

    #[test]
    fn detects_zip64_markers() {
        let mut eocd = EndOfCentralDirectory::single_disk(1, 46, 0);
        eocd.cd_offset = 0xFFFFFFFF;
        assert!(eocd.is_zip64());
    }
}
