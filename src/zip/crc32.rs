//! CRC-32 (ISO-HDLC, the zlib polynomial) as required by the ZIP format.
//!
//! The lookup table is computed at compile time, so there is no runtime
//! initialization step and nothing shared can ever be mutated.

use std::io;

/// Bit-reflected form of the CRC-32 polynomial `0x04C11DB7`.
pub const POLYNOMIAL: u32 = 0xEDB8_8320;

static TABLE: [u32; 256] = build_table();

const fn build_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut c = i as u32;
        let mut bit = 0;
        while bit < 8 {
            c = if c & 1 != 0 { POLYNOMIAL ^ (c >> 1) } else { c >> 1 };
            bit += 1;
        }
        table[i] = c;
        i += 1;
    }
    table
}

/// The 256-entry lookup table used by [`checksum`] and [`Crc32`].
pub fn table() -> &'static [u32; 256] {
    &TABLE
}

/// Compute the CRC-32 of `bytes`. An empty buffer yields 0.
pub fn checksum(bytes: &[u8]) -> u32 {
    let mut hasher = Crc32::new();
    hasher.update(bytes);
    hasher.finalize()
}

/// Incremental CRC-32 hasher.
///
/// Feeding data in several chunks gives the same result as a single
/// [`checksum`] call over the concatenated input. The hasher also implements
/// [`io::Write`], so a reader can be hashed with [`io::copy`].
#[derive(Debug, Clone, Copy)]
pub struct Crc32 {
    state: u32,
}

impl Crc32 {
    pub fn new() -> Self {
        Self { state: 0xFFFF_FFFF }
    }

    pub fn update(&mut self, bytes: &[u8]) {
        let mut crc = self.state;
        for &byte in bytes {
            let index = ((crc ^ byte as u32) & 0xFF) as usize;
            crc = TABLE[index] ^ (crc >> 8);
        }
        self.state = crc;
    }

    pub fn finalize(&self) -> u32 {
        !self.state
    }
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

impl io::Write for Crc32 {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(bytes: &[u8]) -> u32 {
        let mut crc = flate2::Crc::new();
        crc.update(bytes);
        crc.sum()
    }

    #[test]
    fn known_values() {
        assert_eq!(checksum(b""), 0);
        assert_eq!(checksum(b"123456789"), 0xCBF4_3926);
        assert_eq!(checksum(b"hello"), 0x3610_A686);
        assert_eq!(
            checksum(b"The quick brown fox jumps over the lazy dog"),
            0x414F_A339
        );
    }

    #[test]
    fn table_entries() {
        let table = table();
        assert_eq!(table[0], 0);
        assert_eq!(table[1], 0x7707_3096);
        assert_eq!(table[128], POLYNOMIAL);
        assert_eq!(table[255], 0x2D02_EF8D);
    }

    #[test]
    fn matches_zlib() {
        let mut data = Vec::with_capacity(4096);
        let mut seed: u32 = 0x1234_5678;
        for _ in 0..4096 {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            data.push((seed >> 16) as u8);
        }

        for len in [0, 1, 3, 7, 64, 255, 1000, 4096] {
            assert_eq!(checksum(&data[..len]), reference(&data[..len]), "len {len}");
        }
    }

    #[test]
    fn incremental_matches_one_shot() {
        let data = b"stored entries are checksummed over their raw bytes";
        let mut hasher = Crc32::new();
        for chunk in data.chunks(5) {
            hasher.update(chunk);
        }
        assert_eq!(hasher.finalize(), checksum(data));
    }

    #[test]
    fn hashes_through_io_copy() {
        let data = vec![0xA5u8; 10_000];
        let mut hasher = Crc32::default();
        let copied = io::copy(&mut data.as_slice(), &mut hasher).unwrap();
        assert_eq!(copied, 10_000);
        assert_eq!(hasher.finalize(), reference(&data));
    }
}
