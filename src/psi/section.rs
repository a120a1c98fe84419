// psi/section.rs
//! Generic PSI section reader with CRC-32 (MPEG-2) validation.

use anyhow::bail;
use bitstream_io::{BigEndian, BitRead, BitReader};
use crc::{Crc, CRC_32_MPEG_2};

/// Returned by [`SectionReader::new`].
pub struct SectionReader<'a> {
    pub table_id:      u8,
    pub version:       u8,
    pub current_next:  bool,
    pub section_number:u8,
    pub last_section:  u8,
    pub table_id_ext:  u16,        // transport_stream_id (PAT) / program_number (PMT)
    pub body:          &'a [u8],   // bytes between fixed header & CRC
}

const CRC_MPEG: Crc<u32> = Crc::<u32>::new(&CRC_32_MPEG_2);

/// section_length must at least cover the 5 fixed bytes and the CRC.
const MIN_SECTION_LENGTH: usize = 5 + 4;

impl<'a> SectionReader<'a> {
    /// `payload` starts at the pointer field. Validates pointer, length and CRC-32.
    pub fn new(payload: &'a [u8]) -> anyhow::Result<Self> {
        let Some(&pointer) = payload.first() else { bail!("payload empty") };
        let start = 1 + pointer as usize;
        if payload.len() < start + 8 { bail!("short section") }

        let mut br = BitReader::endian(&payload[start..start + 8], BigEndian);
        let table_id = br.read::<8, u8>()?;
        let syntax   = br.read_bit()?;
        br.skip(3)?;                                    // '0' + reserved
        let sec_len  = br.read::<12, u16>()? as usize;
        let table_id_ext = br.read::<16, u16>()?;
        br.skip(2)?;                                    // reserved
        let version  = br.read::<5, u8>()?;
        let current_next = br.read_bit()?;
        let section_number = br.read::<8, u8>()?;
        let last_section   = br.read::<8, u8>()?;

        if !syntax { bail!("section_syntax_indicator not set") }
        if sec_len < MIN_SECTION_LENGTH { bail!("invalid section_length {sec_len}") }
        let end = start + 3 + sec_len;
        if end > payload.len() { bail!("truncated section") }

        let crc_calc = CRC_MPEG.checksum(&payload[start..end - 4]);
        let crc_pkt  = u32::from_be_bytes(payload[end - 4..end].try_into()?);
        if crc_calc != crc_pkt {
            bail!("CRC-32 mismatch: 0x{crc_pkt:08x} in section, 0x{crc_calc:08x} computed");
        }

        Ok(Self {
            table_id,
            version,
            current_next,
            section_number,
            last_section,
            table_id_ext,
            body: &payload[start + 8..end - 4],
        })
    }
}
