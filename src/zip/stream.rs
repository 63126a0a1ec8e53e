use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{self, Write};

/// Append-only output sink that tracks how many bytes it has accepted.
///
/// Every multi-byte integer of the archive goes through [`write_u16`] or
/// [`write_u32`], which always emit little-endian. The offset only advances
/// once the sink accepted the whole value, and it always equals the number of
/// bytes written so far.
///
/// A failed write may have reached the sink partially, after which the offset
/// no longer describes the output. The stream is then poisoned: every later
/// write or flush fails without touching the sink.
///
/// [`write_u16`]: ArchiveStream::write_u16
/// [`write_u32`]: ArchiveStream::write_u32
pub struct ArchiveStream<W: Write> {
    inner: W,
    offset: u64,
    poisoned: bool,
}

impl<W: Write> ArchiveStream<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            offset: 0,
            poisoned: false,
        }
    }

    /// Number of bytes written so far, i.e. the position of the next byte.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Whether an earlier write or flush failed.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Fail if the stream is poisoned.
    pub fn ensure_healthy(&self) -> io::Result<()> {
        if self.poisoned {
            return Err(io::Error::other(
                "archive stream is unusable after an earlier write failure",
            ));
        }
        Ok(())
    }

    pub fn write_u16(&mut self, value: u16) -> io::Result<()> {
        self.ensure_healthy()?;
        let result = self.inner.write_u16::<LittleEndian>(value);
        self.advance(result, 2)
    }

    pub fn write_u32(&mut self, value: u32) -> io::Result<()> {
        self.ensure_healthy()?;
        let result = self.inner.write_u32::<LittleEndian>(value);
        self.advance(result, 4)
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.ensure_healthy()?;
        let result = self.inner.write_all(bytes);
        self.advance(result, bytes.len() as u64)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.ensure_healthy()?;
        let result = self.inner.flush();
        self.advance(result, 0)
    }

    fn advance(&mut self, result: io::Result<()>, len: u64) -> io::Result<()> {
        match result {
            Ok(()) => {
                self.offset += len;
                Ok(())
            }
            Err(e) => {
                self.poisoned = true;
                Err(e)
            }
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}
