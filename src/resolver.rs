//! PAT rewrite and PMT scan producing the retained PID set.
//!
//! Field positions are absolute packet offsets; a zero pointer field and no
//! adaptation field are assumed on PSI packets. Only the first packet of a
//! PMT section is looked at, sections spanning several packets are not
//! reassembled.

use bytes::{BufMut, BytesMut};
use tracing::{debug, trace};

use crate::constants::*;
use crate::crc32::compute_crc32;
use crate::error::Result;
use crate::packet::{decode_pid, decode_section_length, TsPacket};
use crate::program::{RetainedPidSet, RewrittenPatSection};

/// What the PAT packet yields: the PMT PID to look for and the
/// replacement payload for every PAT packet.
#[derive(Debug, Clone)]
pub struct PatRewrite {
    pub pmt_pid: u16,
    /// The first loop slot is program 0 (the network PID).
    pub network_slot: bool,
    pub section: RewrittenPatSection,
}

/// Builds the single-program PAT from the first PAT packet.
///
/// The first 16 section bytes (header plus the network slot and the first
/// program slot) are kept, the section length is forced to 0x011 and a new
/// CRC is appended. The rest of the 183-byte payload is stuffing.
pub fn rewrite_pat(pkt: &TsPacket<'_>) -> Result<PatRewrite> {
    let pmt_pid = pkt.pid_at(PAT_PROGRAM_PID_OFFSET)?;
    let first_slot = pkt.slice(PAT_FIRST_PROGRAM_NUMBER_OFFSET, 2)?;
    let network_slot = first_slot == [0, 0];
    if !network_slot {
        debug!(
            "PAT has no leading network entry (program {}); PMT PID 0x{pmt_pid:04x} is taken from the second slot",
            u16::from_be_bytes([first_slot[0], first_slot[1]])
        );
    }

    let mut head = [0u8; PAT_COPY_LEN];
    head.copy_from_slice(pkt.slice(PAT_SECTION_OFFSET, PAT_COPY_LEN)?);
    head[PAT_LENGTH_LOW_INDEX - 1] &= 0xF0;
    head[PAT_LENGTH_LOW_INDEX] = SINGLE_PROGRAM_SECTION_LENGTH;
    let crc = compute_crc32(&head);

    let mut buf = BytesMut::with_capacity(REWRITTEN_PAT_SIZE);
    buf.put_slice(&head);
    buf.put_u32(crc);
    buf.resize(REWRITTEN_PAT_SIZE, STUFFING_BYTE);

    debug!("PAT rewritten for PMT PID 0x{pmt_pid:04x}, CRC 0x{crc:08x}");
    Ok(PatRewrite {
        pmt_pid,
        network_slot,
        section: RewrittenPatSection::from_bytes(buf.freeze()),
    })
}

/// Scans the elementary stream loop of a PMT packet.
///
/// Entries with stream type [`EXCLUDED_STREAM_TYPE`] are skipped.
pub fn resolve_pmt(pkt: &TsPacket<'_>, pmt_pid: u16) -> Result<RetainedPidSet> {
    let section_length = pkt.section_length_at(PMT_SECTION_LENGTH_OFFSET)? as usize;
    let pcr_pid = pkt.pid_at(PMT_PCR_PID_OFFSET)?;
    let program_info_len = pkt.section_length_at(PMT_PROGRAM_INFO_LENGTH_OFFSET)? as usize;

    // loop ends where the CRC starts
    let loop_end = (section_length + PMT_SECTION_PREFIX).saturating_sub(CRC_SIZE);
    let mut idx = program_info_len + PMT_LOOP_BASE;
    let mut elementary = Vec::new();

    while idx < loop_end {
        let entry = pkt.slice(idx, PMT_ENTRY_HEADER_LEN)?;
        let stream_type = entry[0];
        let pid = decode_pid(entry[1], entry[2]);
        let es_info_len = decode_section_length(entry[3], entry[4]) as usize;

        if stream_type == EXCLUDED_STREAM_TYPE {
            trace!("skipping PID 0x{pid:04x} (stream type 0x0d)");
        } else {
            elementary.push(pid);
        }
        idx += PMT_ENTRY_HEADER_LEN + es_info_len;
    }

    Ok(RetainedPidSet::new(pmt_pid, pcr_pid, elementary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PickError;
    use crate::testutil::{pat_packet, pmt_packet, psi_packet, scenario_pat};
    use crc::{Crc, CRC_32_MPEG_2};

    #[test]
    fn test_rewrite_pat_layout() {
        let raw = scenario_pat();
        let pkt = TsPacket::new(&raw).unwrap();
        let rewrite = rewrite_pat(&pkt).unwrap();
        let z = rewrite.section.as_bytes();

        assert_eq!(rewrite.pmt_pid, 0x0020);
        assert!(rewrite.network_slot);
        assert_eq!(z.len(), REWRITTEN_PAT_SIZE);
        assert_eq!(z[0], 0x00);
        assert_eq!(z[1], 0xB0);
        assert_eq!(z[2], 0x11);
        // untouched header and slots
        assert_eq!(&z[3..16], &raw[8..21]);
        let crc = Crc::<u32>::new(&CRC_32_MPEG_2).checksum(&z[..16]);
        assert_eq!(&z[16..20], &crc.to_be_bytes());
        assert!(z[20..].iter().all(|&b| b == STUFFING_BYTE));
    }

    #[test]
    fn test_rewrite_pat_without_network_entry() {
        // no program 0: the second slot is still the one kept
        let raw = pat_packet(&[(0x0001, 0x0020), (0x0002, 0x0030)]);
        let pkt = TsPacket::new(&raw).unwrap();
        let rewrite = rewrite_pat(&pkt).unwrap();
        assert!(!rewrite.network_slot);
        assert_eq!(rewrite.pmt_pid, 0x0030);
    }

    #[test]
    fn test_rewrite_pat_clears_high_length_bits() {
        let mut raw = scenario_pat();
        raw[6] = 0xB1;
        let pkt = TsPacket::new(&raw).unwrap();
        let z = rewrite_pat(&pkt).unwrap().section;
        assert_eq!(&z.as_bytes()[1..3], &[0xB0, 0x11]);
    }

    #[test]
    fn test_resolve_pmt_order() {
        let raw = pmt_packet(
            0x0100,
            0x01FF,
            &[0x09, 0x04, 0x00, 0x05, 0xE0, 0x10],
            &[(0x02, 0x0111, &[0x52, 0x01, 0x00]), (0x0F, 0x0112, &[]), (0x06, 0x0113, &[])],
        );
        let pkt = TsPacket::new(&raw).unwrap();
        let set = resolve_pmt(&pkt, 0x0100).unwrap();
        assert_eq!(set.as_slice(), &[0x0100, 0x01FF, 0x0111, 0x0112, 0x0113]);
    }

    #[test]
    fn test_resolve_pmt_skips_type_0x0d() {
        let raw = pmt_packet(
            0x0020,
            0x0021,
            &[],
            &[(0x02, 0x0022, &[]), (0x0D, 0x0023, &[0x13, 0x01, 0x00]), (0x0F, 0x0024, &[])],
        );
        let pkt = TsPacket::new(&raw).unwrap();
        let set = resolve_pmt(&pkt, 0x0020).unwrap();
        assert_eq!(set.as_slice(), &[0x0020, 0x0021, 0x0022, 0x0024]);
        assert!(!set.contains(0x0023));
    }

    #[test]
    fn test_resolve_pmt_keeps_duplicates() {
        let raw = pmt_packet(0x0020, 0x0022, &[], &[(0x02, 0x0022, &[]), (0x02, 0x0022, &[])]);
        let pkt = TsPacket::new(&raw).unwrap();
        let set = resolve_pmt(&pkt, 0x0020).unwrap();
        assert_eq!(set.as_slice(), &[0x0020, 0x0022, 0x0022, 0x0022]);
    }

    #[test]
    fn test_resolve_pmt_overrunning_lengths() {
        // section_length 0xFFF, ES_info_length pushes the next entry past the packet
        let section = [
            0x02, 0xBF, 0xFF, 0x04, 0x08, 0xC1, 0x00, 0x00,
            0xE0, 0x21, 0xF0, 0x00,
            0x02, 0xE0, 0x22, 0xF0, 0xA8,
        ];
        let raw = psi_packet(0x0020, &section);
        let pkt = TsPacket::new(&raw).unwrap();
        let err = resolve_pmt(&pkt, 0x0020).unwrap_err();
        assert!(matches!(err, PickError::MalformedSection { pid: 0x0020, .. }));
    }

    #[test]
    fn test_resolve_pmt_program_info_past_packet() {
        let section = [
            0x02, 0xB0, 0x20, 0x04, 0x08, 0xC1, 0x00, 0x00,
            0xE0, 0x21, 0xF0, 0xFF,
        ];
        let raw = psi_packet(0x0020, &section);
        let pkt = TsPacket::new(&raw).unwrap();
        // loop start (272) is already past the loop end (36)
        let set = resolve_pmt(&pkt, 0x0020).unwrap();
        assert_eq!(set.as_slice(), &[0x0020, 0x0021]);
    }
}
