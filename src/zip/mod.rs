//! ZIP archive encoding and verification.
//!
//! This module writes archives whose entries use the STORED (uncompressed)
//! method, and reads them back to verify them.
//!
//! ## Architecture
//!
//! - [`crc32`]: CRC-32 checksum of entry contents
//! - [`stream`]: Little-endian primitive writer that tracks its offset
//! - [`structures`]: Data structures representing ZIP format elements (EOCD, file headers, etc.)
//! - [`writer`]: Two-pass encoder producing the archive byte stream
//! - [`reader`]: Lists and verifies finished archives
//! - [`archiver`]: High-level API turning named inputs into an archive
//!
//! ## ZIP Format Overview
//!
//! A ZIP file consists of:
//! 1. Local file headers and raw data for each file
//! 2. Central Directory with metadata for all files
//! 3. End of Central Directory (EOCD) record at the end
//!
//! The writer emits the first part entry by entry while remembering each
//! header's offset, then emits the Central Directory and the EOCD.
//!
//! ## Limitations
//!
//! - No compression, only STORED entries
//! - No encryption support
//! - No ZIP64: entries, offsets and sizes beyond the classic limits are rejected
//! - No multi-disk archive support
//! - Timestamps are written as zero and no extra fields are emitted

mod archiver;
pub mod crc32;
mod reader;
mod stream;
mod structures;
mod writer;

pub use archiver::{ArchiveOptions, Archiver, PackReport, SkippedInput};
pub use reader::ArchiveReader;
pub use stream::ArchiveStream;
pub use structures::*;
pub use writer::{ArchiveEntry, ArchiveSummary, ArchiveWriter, WrittenEntry, write_archive};
