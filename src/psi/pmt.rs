use anyhow::bail;

use crate::packet::{decode_pid, decode_section_length};
use crate::psi::section::SectionReader;

/// ─────────── PMT ───────────
#[derive(Debug, Clone)]
pub struct PmtSection {
    pub version:        u8,
    pub program_number: u16,
    pub pcr_pid:        u16,
    pub streams:        Vec<StreamInfo>,
}
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamInfo {
    pub stream_type:   u8,
    pub elementary_pid:u16,
}

/// `payload` starts at the pointer field.
pub fn parse_pmt(payload:&[u8]) -> anyhow::Result<PmtSection> {
    let sec = SectionReader::new(payload)?;
    if sec.table_id != 0x02 { bail!("not PMT"); }
    let b = sec.body;
    if b.len() < 4 { bail!("short PMT body") }

    /* ── fixed header inside the body ── */
    let pcr_pid       = decode_pid(b[0], b[1]);
    let prog_info_len = decode_section_length(b[2], b[3]) as usize;
    let mut idx       = 4 + prog_info_len;          // skip program descriptors

    /* ── ES loop ── */
    let mut streams = Vec::new();
    while idx + 5 <= b.len() {
        let stype = b[idx];
        let pid   = decode_pid(b[idx+1], b[idx+2]);
        let eslen = decode_section_length(b[idx+3], b[idx+4]) as usize;
        streams.push(StreamInfo{ stream_type:stype, elementary_pid:pid });
        idx += 5 + eslen;                          // skip ES descriptors
    }

    Ok(PmtSection{ version:sec.version,
                   program_number:sec.table_id_ext,
                   pcr_pid,
                   streams })
}
