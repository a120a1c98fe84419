//! TS packet view and PSI field decoders

use crate::constants::{TS_HEADER_SIZE, TS_PACKET_SIZE, TS_SYNC_BYTE};
use crate::error::{PickError, Result};

/// Decodes a 13-bit PID, dropping the TEI / PUSI / priority bits.
#[inline]
pub fn decode_pid(high: u8, low: u8) -> u16 {
    (((high & 0x1F) as u16) << 8) | (low as u16)
}

/// Decodes a 12-bit section (or descriptor loop) length.
#[inline]
pub fn decode_section_length(high: u8, low: u8) -> u16 {
    (((high & 0x0F) as u16) << 8) | (low as u16)
}

/// Read-only view over exactly one 188-byte packet slot.
///
/// Offset accessors are bounded to the packet and report
/// [`PickError::MalformedSection`] instead of reading past it.
#[derive(Debug, Clone, Copy)]
pub struct TsPacket<'a> {
    data: &'a [u8],
    pid: u16,
}

impl<'a> TsPacket<'a> {
    pub fn new(data: &'a [u8]) -> Result<Self> {
        if data.len() < TS_PACKET_SIZE {
            return Err(PickError::InputTruncated { actual: data.len() });
        }
        let data = &data[..TS_PACKET_SIZE];
        Ok(Self {
            data,
            pid: decode_pid(data[1], data[2]),
        })
    }

    pub fn pid(&self) -> u16 {
        self.pid
    }

    pub fn sync_ok(&self) -> bool {
        self.data[0] == TS_SYNC_BYTE
    }

    /// The whole packet, as read.
    pub fn bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Sync, PID, flags and pointer field.
    pub fn header(&self) -> &'a [u8] {
        &self.data[..TS_HEADER_SIZE]
    }

    pub fn slice(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
        let end = offset
            .checked_add(len)
            .filter(|&end| end <= TS_PACKET_SIZE)
            .ok_or(PickError::MalformedSection { pid: self.pid, offset })?;
        Ok(&self.data[offset..end])
    }

    pub fn byte_at(&self, offset: usize) -> Result<u8> {
        Ok(self.slice(offset, 1)?[0])
    }

    pub fn pid_at(&self, offset: usize) -> Result<u16> {
        let b = self.slice(offset, 2)?;
        Ok(decode_pid(b[0], b[1]))
    }

    pub fn section_length_at(&self, offset: usize) -> Result<u16> {
        let b = self.slice(offset, 2)?;
        Ok(decode_section_length(b[0], b[1]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MAX_PID;

    #[test]
    fn test_decode_pid_bounds() {
        assert_eq!(decode_pid(0x00, 0x00), 0);
        assert_eq!(decode_pid(0xFF, 0xFF), MAX_PID);
        for high in 0..=255u8 {
            for low in [0x00, 0x01, 0x7F, 0xFF] {
                assert!(decode_pid(high, low) <= MAX_PID);
            }
        }
    }

    #[test]
    fn test_decode_pid_masks_flags() {
        // PUSI set, PID 0x0020
        assert_eq!(decode_pid(0x40, 0x20), 0x0020);
        // reserved bits set, PID 0x1000
        assert_eq!(decode_pid(0xF0, 0x00), 0x1000);
    }

    #[test]
    fn test_decode_section_length() {
        assert_eq!(decode_section_length(0xB0, 0x11), 0x011);
        assert_eq!(decode_section_length(0xFF, 0xFF), 0x0FFF);
        assert_eq!(decode_section_length(0xF0, 0x00), 0);
    }

    #[test]
    fn test_packet_too_short() {
        let data = [0x47u8; 100];
        assert!(matches!(
            TsPacket::new(&data),
            Err(PickError::InputTruncated { actual: 100 })
        ));
    }

    #[test]
    fn test_bounded_accessors() {
        let mut data = [0xFFu8; TS_PACKET_SIZE];
        data[0] = TS_SYNC_BYTE;
        data[1] = 0x40;
        data[2] = 0x21;
        let pkt = TsPacket::new(&data).unwrap();
        assert_eq!(pkt.pid(), 0x0021);
        assert!(pkt.sync_ok());
        assert_eq!(pkt.header().len(), TS_HEADER_SIZE);
        assert_eq!(pkt.pid_at(186).unwrap(), 0x1FFF);
        assert!(matches!(
            pkt.pid_at(187),
            Err(PickError::MalformedSection { pid: 0x0021, offset: 187 })
        ));
        assert!(pkt.byte_at(TS_PACKET_SIZE).is_err());
        assert!(pkt.slice(usize::MAX, 2).is_err());
    }
}
