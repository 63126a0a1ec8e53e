//! In-memory ZIP reader used to list and verify archives.
//!
//! ## Parsing Strategy
//!
//! ZIP files are designed to be read from the end:
//! 1. Find the End of Central Directory (EOCD) at the file's end
//! 2. Read the Central Directory to get metadata for all files
//! 3. For each entry, follow the recorded offset back to its Local File
//!    Header, which tells where the raw data begins
//!
//! Only classic archives with STORED entries can be read back in full;
//! ZIP64 archives are rejected.

use crate::error::{Error, Result};

use super::crc32;
use super::structures::*;

/// Maximum ZIP comment size allowed by the format (65535 bytes).
///
/// This limits the search area when looking for EOCD with a comment.
const MAX_COMMENT_SIZE: usize = 65535;

/// Reader over a complete archive held in memory.
///
/// ## Example
///
/// ```
/// use stowzip::zip::{ArchiveEntry, ArchiveReader, write_archive};
///
/// let (bytes, _) = write_archive(Vec::<u8>::new(), vec![ArchiveEntry::new("a.txt", "hello")])?;
/// let reader = ArchiveReader::new(&bytes);
/// let entries = reader.verify()?;
/// assert_eq!(entries[0].file_name, "a.txt");
/// assert_eq!(reader.read_entry(&entries[0])?, b"hello");
/// # Ok::<(), stowzip::Error>(())
/// ```
pub struct ArchiveReader<'a> {
    data: &'a [u8],
}

impl<'a> ArchiveReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Find and parse the End of Central Directory record.
    ///
    /// Handles both the simple case (no comment) and archives with
    /// comments by searching backwards for the signature.
    ///
    /// # Returns
    ///
    /// A tuple of (EOCD record, offset of EOCD in the archive).
    ///
    /// # Errors
    ///
    /// Returns an error if no valid EOCD can be found, indicating
    /// the data is not a ZIP archive.
    pub fn find_eocd(&self) -> Result<(EndOfCentralDirectory, usize)> {
        let size = self.data.len();
        if size < EndOfCentralDirectory::SIZE {
            return Err(Error::InvalidZipFile("archive is too short".to_string()));
        }

        // Common case: no archive comment, the EOCD is the last 22 bytes
        let offset = size - EndOfCentralDirectory::SIZE;
        let tail = &self.data[offset..];
        if &tail[0..4] == EndOfCentralDirectory::SIGNATURE && tail[20..22] == [0, 0] {
            return Ok((EndOfCentralDirectory::from_bytes(tail)?, offset));
        }

        // Otherwise scan backwards; the comment length must account for
        // exactly the bytes remaining after the record.
        let search_start = size.saturating_sub(MAX_COMMENT_SIZE + EndOfCentralDirectory::SIZE);
        for i in (search_start..=offset).rev() {
            if &self.data[i..i + 4] != EndOfCentralDirectory::SIGNATURE {
                continue;
            }
            let comment_len = u16::from_le_bytes([self.data[i + 20], self.data[i + 21]]) as usize;
            if comment_len == size - i - EndOfCentralDirectory::SIZE {
                let eocd = EndOfCentralDirectory::from_bytes(&self.data[i..])?;
                return Ok((eocd, i));
            }
        }

        Err(Error::InvalidZipFile("end of central directory not found".to_string()))
    }

    /// List all entries recorded in the Central Directory, in order.
    pub fn list_files(&self) -> Result<Vec<ZipFileEntry>> {
        let (eocd, eocd_offset) = self.find_eocd()?;
        if eocd.is_zip64() {
            return Err(Error::Zip64Unsupported);
        }
        if eocd.disk_number != 0
            || eocd.disk_with_cd != 0
            || eocd.disk_entries != eocd.total_entries
        {
            return Err(Error::InvalidZipFile(
                "multi-disk archives are not supported".to_string(),
            ));
        }

        let cd_start = eocd.cd_offset as usize;
        let cd_end = cd_start + eocd.cd_size as usize;
        if cd_end > eocd_offset {
            return Err(Error::InvalidZipFile(
                "central directory overlaps the end record".to_string(),
            ));
        }

        let mut entries = Vec::with_capacity(eocd.total_entries as usize);
        let mut position = cd_start;
        for _ in 0..eocd.total_entries {
            let header = CentralDirectoryHeader::from_bytes(&self.data[position..cd_end])?;
            let record_end = position + header.record_len();
            if record_end > cd_end {
                return Err(Error::InvalidZipFile(
                    "central directory record is truncated".to_string(),
                ));
            }

            let name_start = position + CentralDirectoryHeader::SIZE;
            let name_bytes = &self.data[name_start..name_start + header.file_name_length as usize];
            // Use lossy conversion to handle non-UTF8 filenames gracefully
            let file_name = String::from_utf8_lossy(name_bytes).into_owned();

            entries.push(ZipFileEntry {
                is_directory: file_name.ends_with('/'),
                file_name,
                compression_method: header.compression_method,
                compressed_size: header.compressed_size,
                uncompressed_size: header.uncompressed_size,
                crc32: header.crc32,
                lfh_offset: header.lfh_offset,
            });
            position = record_end;
        }

        if position != cd_end {
            return Err(Error::InvalidZipFile(format!(
                "central directory size mismatch: recorded {}, parsed {}",
                eocd.cd_size,
                position - cd_start
            )));
        }

        Ok(entries)
    }

    /// Get the offset where the raw data of `entry` begins.
    ///
    /// The Local File Header has variable-length fields (name, extra field)
    /// that may differ from the Central Directory record, so it is read to
    /// find where the data starts.
    pub fn data_offset(&self, entry: &ZipFileEntry) -> Result<usize> {
        let lfh_offset = entry.lfh_offset as usize;
        let lfh = self
            .data
            .get(lfh_offset..)
            .ok_or_else(|| Error::InvalidZipFile("local header offset out of range".to_string()))?;
        let header = LocalFileHeader::from_bytes(lfh)?;

        Ok(lfh_offset
            + LocalFileHeader::SIZE
            + header.file_name_length as usize
            + header.extra_field_length as usize)
    }

    /// Borrow the raw data of a STORED entry.
    pub fn read_entry(&self, entry: &ZipFileEntry) -> Result<&'a [u8]> {
        if entry.compression_method != CompressionMethod::Stored {
            return Err(Error::UnsupportedCompression(entry.compression_method.as_u16()));
        }

        let start = self.data_offset(entry)?;
        let end = start + entry.uncompressed_size as usize;
        self.data.get(start..end).ok_or_else(|| {
            Error::InvalidZipFile(format!("data of {} is truncated", entry.file_name))
        })
    }

    /// Read every entry back and check it against its recorded CRC-32.
    ///
    /// # Returns
    ///
    /// The verified entries, in Central Directory order.
    pub fn verify(&self) -> Result<Vec<ZipFileEntry>> {
        let entries = self.list_files()?;
        for entry in &entries {
            let actual = crc32::checksum(self.read_entry(entry)?);
            if actual != entry.crc32 {
                return Err(Error::ChecksumMismatch {
                    name: entry.file_name.clone(),
                    expected: entry.crc32,
                    actual,
                });
            }
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zip::writer::{ArchiveEntry, write_archive};

    fn sample() -> Vec<u8> {
        let entries = vec![
            ArchiveEntry::new("a.txt", "hello"),
            ArchiveEntry::new("docs/b.txt", ""),
            ArchiveEntry::new("c.bin", vec![0u8, 1, 2, 3, 255]),
        ];
        write_archive(Vec::<u8>::new(), entries).unwrap().0
    }

    #[test]
    fn lists_entries_in_order() {
        let bytes = sample();
        let entries = ArchiveReader::new(&bytes).list_files().unwrap();

        let names: Vec<_> = entries.iter().map(|e| e.file_name.as_str()).collect();
        assert_eq!(names, ["a.txt", "docs/b.txt", "c.bin"]);
        assert!(entries.iter().all(|e| e.compression_method == CompressionMethod::Stored));
        assert_eq!(entries[0].lfh_offset, 0);
        assert_eq!(entries[1].lfh_offset, 40);
    }

    #[test]
    fn reads_and_verifies_content() {
        let bytes = sample();
        let reader = ArchiveReader::new(&bytes);
        let entries = reader.verify().unwrap();

        assert_eq!(reader.read_entry(&entries[0]).unwrap(), b"hello");
        assert_eq!(reader.read_entry(&entries[1]).unwrap(), b"");
        assert_eq!(reader.read_entry(&entries[2]).unwrap(), [0u8, 1, 2, 3, 255]);
    }

    #[test]
    fn detects_corrupted_data() {
        let mut bytes = sample();
        // First byte of "hello"
        bytes[35] ^= 0xFF;

        let err = ArchiveReader::new(&bytes).verify().unwrap_err();
        assert!(matches!(err, Error::ChecksumMismatch { ref name, .. } if name == "a.txt"));
    }

    #[test]
    fn finds_eocd_behind_a_comment() {
        let mut bytes = sample();
        let len = bytes.len();
        bytes[len - 2..].copy_from_slice(&7u16.to_le_bytes());
        bytes.extend_from_slice(b"comment");

        let (eocd, offset) = ArchiveReader::new(&bytes).find_eocd().unwrap();
        assert_eq!(offset, len - EndOfCentralDirectory::SIZE);
        assert_eq!(eocd.comment_len, 7);
        assert_eq!(ArchiveReader::new(&bytes).verify().unwrap().len(), 3);
    }

    #[test]
    fn empty_archive() {
        let (bytes, _) = write_archive(Vec::<u8>::new(), Vec::<ArchiveEntry>::new()).unwrap();
        let (eocd, offset) = ArchiveReader::new(&bytes).find_eocd().unwrap();

        assert_eq!(offset, 0);
        assert_eq!(eocd.total_entries, 0);
        assert_eq!(eocd.cd_size, 0);
        assert!(ArchiveReader::new(&bytes).verify().unwrap().is_empty());
    }

    #[test]
    fn rejects_garbage() {
        assert!(ArchiveReader::new(b"PK").find_eocd().is_err());
        assert!(ArchiveReader::new(&[0u8; 64]).list_files().is_err());
    }

    #[test]
    fn rejects_zip64_marker() {
        let mut bytes = sample();
        let len = bytes.len();
        // Total entries field of the EOCD
        bytes[len - 12..len - 10].copy_from_slice(&[0xFF, 0xFF]);

        let err = ArchiveReader::new(&bytes).list_files().unwrap_err();
        assert!(matches!(err, Error::Zip64Unsupported));
    }
}
