//! # stowzip
//!
//! A Rust zip utility that packs files into uncompressed ZIP archives.
//!
//! This library encodes a list of named inputs into a single ZIP container
//! using the STORED method: every entry gets a local file header followed by
//! its raw bytes, then a central directory and an end-of-central-directory
//! record close the archive. Inputs are read from the local filesystem; inputs that
//! cannot be read are skipped without aborting the rest of the batch.
//!
//! ## Features
//!
//! - Table-driven CRC-32 (the zlib polynomial), computed at compile time
//! - Single-pass encoding to any [`std::io::Write`] sink
//! - Explicit rejection of anything that would need ZIP64
//! - Read-back verification of finished archives
//!
//! ## Example
//!
//! ```
//! use stowzip::zip::{ArchiveEntry, ArchiveWriter};
//!
//! let mut writer = ArchiveWriter::new(Vec::<u8>::new());
//! writer.add_entry(&ArchiveEntry::new("a.txt", "hello"))?;
//! writer.add_entry(&ArchiveEntry::new("b.txt", ""))?;
//! let (bytes, summary) = writer.finish()?;
//!
//! assert_eq!(summary.entries.len(), 2);
//! assert_eq!(&bytes[0..4], b"PK\x03\x04");
//! # Ok::<(), stowzip::Error>(())
//! ```

pub mod cli;
pub mod error;
pub mod io;
pub mod zip;

pub use cli::Cli;
pub use error::{Error, Result};
pub use io::{EntrySource, LocalFileSource};
pub use zip::{ArchiveEntry, ArchiveReader, ArchiveWriter, Archiver, write_archive};
