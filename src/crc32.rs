//! Bit-serial CRC-32/MPEG-2 (ISO/IEC 13818-1 annex A).

use crate::constants::{CRC32_INIT, CRC32_POLYNOMIAL};

/// Computes the CRC-32/MPEG-2 of `data`.
///
/// MSB-first, no reflection, no final XOR. The empty buffer yields the
/// initial register value.
pub fn compute_crc32(data: &[u8]) -> u32 {
    let mut crc = CRC32_INIT;
    for &byte in data {
        for i in 0..8 {
            let bit = (byte >> (7 - i)) & 0x01 == 1;
            let top = crc & 0x8000_0000 != 0;
            crc <<= 1;
            if bit != top {
                crc ^= CRC32_POLYNOMIAL;
            }
        }
    }
    crc
}
