//! Two-pass program filter.
//!
//! Pass 1 scans for the first PAT and then the first packet on its PMT PID,
//! producing a [`ResolvedProgram`]. Pass 2 rewinds and writes the PAT
//! (rewritten), the PMT, the PCR PID and every kept elementary PID.

use std::io::Write;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::constants::{PAT_PID, TS_PACKET_SIZE};
use crate::error::{PickError, Result};
use crate::packet::TsPacket;
use crate::program::ResolvedProgram;
use crate::resolver::{resolve_pmt, rewrite_pat, PatRewrite};
use crate::source::PacketSource;

/// Pass 1 progress.
enum ScanState {
    ScanningForPat,
    ScanningForPmt(PatRewrite),
    Resolved(ResolvedProgram),
}

/// Counters for pass 2
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterStats {
    pub packets_read: u64,
    pub packets_written: u64,
    pub pat_rewritten: u64,
    pub packets_dropped: u64,
    pub trailing_bytes: usize,
}

/// Pass 1: resolves the program from the start of `source`.
///
/// The source is rewound first, so a source that cannot seek fails here
/// before anything is read. First PAT wins, first matching PMT wins.
pub fn resolve<S: PacketSource>(source: &mut S) -> Result<ResolvedProgram> {
    source.rewind()?;

    let mut buf = [0u8; TS_PACKET_SIZE];
    let mut state = ScanState::ScanningForPat;
    let mut index = 0u64;

    while source.read_packet(&mut buf)? {
        let pkt = TsPacket::new(&buf)?;
        if !pkt.sync_ok() {
            debug!(index, "sync byte mismatch");
        }

        state = match state {
            ScanState::ScanningForPat if pkt.pid() == PAT_PID => {
                let rewrite = rewrite_pat(&pkt)?;
                debug!(index, "PAT found, PMT PID 0x{:04x}", rewrite.pmt_pid);
                ScanState::ScanningForPmt(rewrite)
            }
            ScanState::ScanningForPmt(rewrite) if pkt.pid() == rewrite.pmt_pid => {
                let pids = resolve_pmt(&pkt, rewrite.pmt_pid)?;
                debug!(index, "PMT found");
                ScanState::Resolved(ResolvedProgram {
                    pids,
                    pat: rewrite.section,
                })
            }
            other => other,
        };
        index += 1;

        if matches!(state, ScanState::Resolved(_)) {
            break;
        }
    }

    match state {
        ScanState::Resolved(program) => {
            info!("{}", program.pids);
            Ok(program)
        }
        ScanState::ScanningForPmt(rewrite) => Err(PickError::PmtNotFound {
            pmt_pid: rewrite.pmt_pid,
        }),
        ScanState::ScanningForPat => Err(PickError::PatNotFound),
    }
}

/// Pass 2: rewinds `source` and writes the packets of `program` to `sink`.
pub fn write_filtered<S: PacketSource, W: Write>(
    program: &ResolvedProgram,
    source: &mut S,
    sink: &mut W,
) -> Result<FilterStats> {
    source.rewind()?;

    let mut buf = [0u8; TS_PACKET_SIZE];
    let mut stats = FilterStats::default();

    while source.read_packet(&mut buf)? {
        let pkt = TsPacket::new(&buf)?;
        stats.packets_read += 1;

        if pkt.pid() == PAT_PID {
            sink.write_all(pkt.header())?;
            sink.write_all(program.pat.as_bytes())?;
            stats.pat_rewritten += 1;
        } else if program.pids.contains(pkt.pid()) {
            sink.write_all(pkt.bytes())?;
        } else {
            stats.packets_dropped += 1;
            continue;
        }
        stats.packets_written += 1;
    }
    sink.flush()?;

    stats.trailing_bytes = source.discarded();
    if stats.trailing_bytes > 0 {
        warn!(bytes = stats.trailing_bytes, "partial trailing packet discarded");
    }
    debug!(?stats, "filter pass done");
    Ok(stats)
}

/// Runs both passes. Nothing is written when pass 1 fails.
pub fn run<S: PacketSource, W: Write>(
    source: &mut S,
    sink: &mut W,
) -> Result<(ResolvedProgram, FilterStats)> {
    let program = resolve(source)?;
    let stats = write_filtered(&program, source, sink)?;
    Ok((program, stats))
}
