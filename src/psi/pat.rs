use anyhow::bail;

use crate::packet::decode_pid;
use crate::psi::section::SectionReader;

/// ─────────── PAT ───────────
#[derive(Debug, Clone)]
pub struct PatSection {
    pub transport_stream_id: u16,
    pub version:      u8,
    pub current_next: bool,
    pub section_number: u8,
    pub last_section: u8,
    pub network_pid:  Option<u16>,
    pub programs:     Vec<PatEntry>,
}
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatEntry {
    pub program_number: u16,
    pub pmt_pid:        u16,
}

/// `payload` starts at the pointer field.
pub fn parse_pat(payload:&[u8]) -> anyhow::Result<PatSection> {
    let sec = SectionReader::new(payload)?;
    if sec.table_id != 0x00 { bail!("not PAT"); }

    let mut network_pid = None;
    let mut programs = Vec::new();
    for entry in sec.body.chunks_exact(4) {
        let pn  = u16::from_be_bytes([entry[0], entry[1]]);
        let pid = decode_pid(entry[2], entry[3]);
        if pn == 0 {
            network_pid = Some(pid);
        } else {
            programs.push(PatEntry{ program_number:pn, pmt_pid:pid });
        }
    }
    Ok(PatSection{
        transport_stream_id: sec.table_id_ext,
        version: sec.version,
        current_next: sec.current_next,
        section_number: sec.section_number,
        last_section: sec.last_section,
        network_pid,
        programs,
    })
}
