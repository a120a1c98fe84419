//! Values produced by the scan pass and consumed by the filter pass

use std::fmt;

use bytes::Bytes;

/// PIDs kept in the output: PMT, PCR, then elementary streams in PMT order.
///
/// Duplicates listed by the PMT are kept as separate slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetainedPidSet {
    pids: Vec<u16>,
}

impl RetainedPidSet {
    pub fn new(pmt_pid: u16, pcr_pid: u16, elementary: impl IntoIterator<Item = u16>) -> Self {
        let mut pids = vec![pmt_pid, pcr_pid];
        pids.extend(elementary);
        Self { pids }
    }

    pub fn pmt_pid(&self) -> u16 {
        self.pids[0]
    }

    pub fn pcr_pid(&self) -> u16 {
        self.pids[1]
    }

    pub fn elementary(&self) -> &[u16] {
        &self.pids[2..]
    }

    pub fn as_slice(&self) -> &[u16] {
        &self.pids
    }

    pub fn contains(&self, pid: u16) -> bool {
        self.pids.iter().any(|&p| p == pid)
    }
}

impl fmt::Display for RetainedPidSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Extract pids")?;
        for pid in &self.pids {
            write!(f, ", 0x{pid:04x}")?;
        }
        Ok(())
    }
}

/// Single-program PAT payload substituted for bytes 5..188 of every PAT packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewrittenPatSection(Bytes);

impl RewrittenPatSection {
    pub(crate) fn from_bytes(bytes: Bytes) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Result of the scan pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProgram {
    pub pids: RetainedPidSet,
    pub pat: RewrittenPatSection,
}

impl ResolvedProgram {
    pub fn pmt_pid(&self) -> u16 {
        self.pids.pmt_pid()
    }
}
