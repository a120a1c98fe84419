//! Re-reads a filtered stream and checks it against the resolved program.
//!
//! The PAT must parse with a valid CRC and declare exactly the one program
//! that was resolved; every packet must be on the PAT PID or a retained PID.
//! The PMT is passed through untouched, so its CRC is reported, not required.
//! When it does parse, its PCR PID and elementary PIDs must be the retained ones.

use std::io::{ErrorKind, Read};

use serde::Serialize;
use tracing::{debug, warn};

use crate::constants::{EXCLUDED_STREAM_TYPE, PAT_PID, TS_PACKET_SIZE};
use crate::packet::TsPacket;
use crate::program::ResolvedProgram;
use crate::psi::{parse_pat, parse_pmt, PmtSection};

/// Outcome of [`verify_output`]
#[derive(Debug, Clone, Default, Serialize)]
pub struct VerifyReport {
    pub packets: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pat_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pat_transport_stream_id: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pat_version: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pat_current: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pat_sections: Option<(u8, u8)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pat_programs: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pat_pmt_pid: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pmt_crc_ok: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pmt_matches: Option<bool>,
    pub foreign_pids: Vec<u16>,
    pub ok: bool,
}

pub fn verify_output<R: Read>(mut reader: R, program: &ResolvedProgram) -> anyhow::Result<VerifyReport> {
    let mut report = VerifyReport::default();
    let mut pat_seen = false;
    let mut buf = [0u8; TS_PACKET_SIZE];

    loop {
        match reader.read_exact(&mut buf) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e.into()),
        }
        let pkt = TsPacket::new(&buf)?;
        let pid = pkt.pid();
        report.packets += 1;

        if pid == PAT_PID {
            if pat_seen { continue }
            pat_seen = true;
            match parse_pat(&buf[4..]) {
                Ok(pat) => {
                    report.pat_transport_stream_id = Some(pat.transport_stream_id);
                    report.pat_version = Some(pat.version);
                    report.pat_current = Some(pat.current_next);
                    report.pat_sections = Some((pat.section_number, pat.last_section));
                    report.pat_programs = Some(pat.programs.len());
                    report.pat_pmt_pid = pat.programs.first().map(|p| p.pmt_pid);
                }
                Err(e) => report.pat_error = Some(e.to_string()),
            }
        } else if !program.pids.contains(pid) {
            if !report.foreign_pids.contains(&pid) {
                report.foreign_pids.push(pid);
            }
        } else if pid == program.pmt_pid() && report.pmt_crc_ok.is_none() {
            match parse_pmt(&buf[4..]) {
                Ok(pmt) => {
                    report.pmt_crc_ok = Some(true);
                    report.pmt_matches = Some(pmt_matches(&pmt, program));
                }
                Err(e) => {
                    debug!("PMT in output does not parse: {e}");
                    report.pmt_crc_ok = Some(false);
                }
            }
        }
    }

    if !pat_seen {
        report.pat_error = Some("no PAT in output".to_string());
    }
    report.ok = report.pat_error.is_none()
        && report.pat_sections == Some((0, 0))
        && report.pat_programs == Some(1)
        && report.pat_pmt_pid == Some(program.pmt_pid())
        && report.pmt_matches != Some(false)
        && report.foreign_pids.is_empty();

    if !report.ok {
        warn!(?report, "output verification failed");
    }
    Ok(report)
}

/// PCR PID and the non-excluded elementary PIDs, in loop order, against the
/// retained set.
fn pmt_matches(pmt: &PmtSection, program: &ResolvedProgram) -> bool {
    let elementary = pmt
        .streams
        .iter()
        .filter(|s| s.stream_type != EXCLUDED_STREAM_TYPE)
        .map(|s| s.elementary_pid);
    pmt.pcr_pid == program.pids.pcr_pid() && elementary.eq(program.pids.elementary().iter().copied())
}
