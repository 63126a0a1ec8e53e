//! STORED archive encoder.
//!
//! Entries are written in two passes over a single output stream:
//!
//! 1. [`ArchiveWriter::add_entry`] immediately writes the local file header,
//!    the name and the raw content, and keeps only the metadata needed later.
//! 2. [`ArchiveWriter::finish`] writes one central directory record per
//!    entry, in the same order, followed by the End of Central Directory record.
//!
//! Every limit of the classic (non-ZIP64) format is checked before any byte
//! of the offending record reaches the sink, so a rejected entry leaves the
//! stream exactly as it was.

use log::debug;
use std::io::Write;

use crate::error::{
    EXCEEDED_CD_SIZE, EXCEEDED_ENTRY_COUNT, EXCEEDED_ENTRY_SIZE, EXCEEDED_NAME_LENGTH,
    EXCEEDED_OFFSET, Error, Result,
};

use super::crc32;
use super::stream::ArchiveStream;
use super::structures::{
    CentralDirectoryHeader, EndOfCentralDirectory, LocalFileHeader, MAX_32BIT_VALUE, MAX_ENTRIES,
    MAX_NAME_LENGTH,
};

/// One input file: its archive-relative name and its full content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: Vec<u8>,
    pub content: Vec<u8>,
}

impl ArchiveEntry {
    pub fn new(name: impl Into<Vec<u8>>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    pub fn crc32(&self) -> u32 {
        crc32::checksum(&self.content)
    }

    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }
}

/// Metadata of an entry whose local header and data are already written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenEntry {
    pub name: Vec<u8>,
    pub crc32: u32,
    pub size: u32,
    pub local_header_offset: u32,
}

impl WrittenEntry {
    pub fn display_name(&self) -> String {
        String::from_utf8_lossy(&self.name).into_owned()
    }
}

/// Layout of a finished archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub entries: Vec<WrittenEntry>,
    pub central_directory_offset: u32,
    pub central_directory_size: u32,
    pub total_size: u64,
}

/// Streaming ZIP writer producing STORED entries.
pub struct ArchiveWriter<W: Write> {
    stream: ArchiveStream<W>,
    entries: Vec<WrittenEntry>,
}

impl<W: Write> ArchiveWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            stream: ArchiveStream::new(sink),
            entries: Vec::new(),
        }
    }

    /// Entries written so far, in archive order.
    pub fn entries(&self) -> &[WrittenEntry] {
        &self.entries
    }

    /// Current position in the output stream.
    pub fn offset(&self) -> u64 {
        self.stream.offset()
    }

    /// Write the local file header, name and content of `entry`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidName`] or a [`Error::CapacityExceeded`] on the name
    ///   length or entry size: nothing was written, the entry can be skipped.
    /// - [`Error::CapacityExceeded`] on the entry count or archive offset: the
    ///   archive cannot grow any further.
    /// - [`Error::Io`]: the sink failed and the archive is unusable. Every
    ///   later call to `add_entry` or [`finish`](Self::finish) fails too.
    pub fn add_entry(&mut self, entry: &ArchiveEntry) -> Result<&WrittenEntry> {
        self.stream.ensure_healthy()?;
        validate_name(&entry.name)?;
        let name_len = check_limit(
            EXCEEDED_NAME_LENGTH,
            entry.name.len() as u64,
            MAX_NAME_LENGTH,
        )?;
        let size = check_limit(EXCEEDED_ENTRY_SIZE, entry.size(), MAX_32BIT_VALUE)?;
        check_limit(
            EXCEEDED_ENTRY_COUNT,
            self.entries.len() as u64 + 1,
            MAX_ENTRIES,
        )?;
        let local_header_offset =
            check_limit(EXCEEDED_OFFSET, self.stream.offset(), MAX_32BIT_VALUE)?;

        let crc32 = entry.crc32();
        debug!(
            "local header for {} at offset {} ({} bytes, crc {:08x})",
            String::from_utf8_lossy(&entry.name),
            local_header_offset,
            size,
            crc32
        );

        LocalFileHeader::stored(crc32, size as u32, name_len as u16)
            .write_to(&mut self.stream)?;
        self.stream.write_bytes(&entry.name)?;
        self.stream.write_bytes(&entry.content)?;

        self.entries.push(WrittenEntry {
            name: entry.name.clone(),
            crc32,
            size: size as u32,
            local_header_offset: local_header_offset as u32,
        });

        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Write the central directory and the End of Central Directory record,
    /// flush the sink and hand it back together with the archive layout.
    pub fn finish(mut self) -> Result<(W, ArchiveSummary)> {
        self.stream.ensure_healthy()?;
        let cd_start = check_limit(EXCEEDED_OFFSET, self.stream.offset(), MAX_32BIT_VALUE)?;

        let cd_size: u64 = self
            .entries
            .iter()
            .map(|e| (CentralDirectoryHeader::SIZE + e.name.len()) as u64)
            .sum();
        let cd_size = check_limit(EXCEEDED_CD_SIZE, cd_size, MAX_32BIT_VALUE)?;

        for entry in &self.entries {
            CentralDirectoryHeader::stored(
                entry.crc32,
                entry.size,
                entry.name.len() as u16,
                entry.local_header_offset,
            )
            .write_to(&mut self.stream)?;
            self.stream.write_bytes(&entry.name)?;
        }

        let cd_end = self.stream.offset();
        debug_assert_eq!(cd_end - cd_start, cd_size);
        debug!(
            "central directory at offset {} ({} bytes, {} entries)",
            cd_start,
            cd_end - cd_start,
            self.entries.len()
        );

        let count = self.entries.len() as u16;
        EndOfCentralDirectory::single_disk(count, (cd_end - cd_start) as u32, cd_start as u32)
            .write_to(&mut self.stream)?;
        self.stream.flush()?;

        let summary = ArchiveSummary {
            entries: self.entries,
            central_directory_offset: cd_start as u32,
            central_directory_size: (cd_end - cd_start) as u32,
            total_size: self.stream.offset(),
        };

        Ok((self.stream.into_inner(), summary))
    }
}

/// Encode `entries` into `sink` as a complete archive.
pub fn write_archive<W, I>(sink: W, entries: I) -> Result<(W, ArchiveSummary)>
where
    W: Write,
    I: IntoIterator<Item = ArchiveEntry>,
{
    let mut writer = ArchiveWriter::new(sink);
    for entry in entries {
        writer.add_entry(&entry)?;
    }
    writer.finish()
}

fn validate_name(name: &[u8]) -> Result<()> {
    let reason = if name.is_empty() {
        "name is empty"
    } else if name.contains(&0) {
        "name contains a NUL byte"
    } else {
        return Ok(());
    };

    Err(Error::InvalidName {
        name: String::from_utf8_lossy(name).into_owned(),
        reason,
    })
}

fn check_limit(what: &'static str, value: u64, limit: u64) -> Result<u64> {
    if value > limit {
        return Err(Error::CapacityExceeded { what, value, limit });
    }
    Ok(value)
}
