/// Errors produced while encoding or reading an archive.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid entry name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("{what} ({value}) exceeds the ZIP limit of {limit}")]
    CapacityExceeded {
        what: &'static str,
        value: u64,
        limit: u64,
    },

    #[error("Invalid zip file: {0}")]
    InvalidZipFile(String),

    #[error("Unsupported compression method: {0} (only STORED/uncompressed is supported)")]
    UnsupportedCompression(u16),

    #[error("CRC mismatch for {name}: expected {expected:08x}, got {actual:08x}")]
    ChecksumMismatch {
        name: String,
        expected: u32,
        actual: u32,
    },

    #[error("ZIP64 archives are not supported")]
    Zip64Unsupported,
}

impl Error {
    /// Whether the error only concerns the entry being added.
    ///
    /// Such errors leave the output stream untouched, so the caller may skip
    /// the entry and carry on with the rest of the batch.
    pub fn is_entry_local(&self) -> bool {
        match self {
            Error::InvalidName { .. } => true,
            Error::CapacityExceeded { what, .. } => {
                *what == EXCEEDED_ENTRY_SIZE || *what == EXCEEDED_NAME_LENGTH
            }
            _ => false,
        }
    }
}

pub(crate) const EXCEEDED_ENTRY_SIZE: &str = "entry size";
pub(crate) const EXCEEDED_NAME_LENGTH: &str = "entry name length";
pub(crate) const EXCEEDED_ENTRY_COUNT: &str = "entry count";
pub(crate) const EXCEEDED_OFFSET: &str = "archive offset";
pub(crate) const EXCEEDED_CD_SIZE: &str = "central directory size";

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_local_errors() {
        let err = Error::InvalidName {
            name: "a\0b".to_string(),
            reason: "contains a NUL byte",
        };
        assert!(err.is_entry_local());

        let err = Error::CapacityExceeded {
            what: EXCEEDED_ENTRY_SIZE,
            value: 1 << 32,
            limit: 0xFFFF_FFFE,
        };
        assert!(err.is_entry_local());
    }

    #[test]
    fn archive_wide_errors_are_fatal() {
        let err = Error::CapacityExceeded {
            what: EXCEEDED_ENTRY_COUNT,
            value: 0xFFFF,
            limit: 0xFFFE,
        };
        assert!(!err.is_entry_local());

        let err = Error::Io(std::io::Error::other("disk full"));
        assert!(!err.is_entry_local());
        assert_eq!(err.to_string(), "disk full");
    }
}
