//! Packet sources for the two-pass filter

use std::io::{ErrorKind, Read, Seek, SeekFrom};

use tracing::debug;

use crate::constants::TS_PACKET_SIZE;
use crate::error::{PickError, Result};

/// A re-readable source of 188-byte packets.
pub trait PacketSource {
    /// Fills `buf` with the next packet. Returns `false` at end of input,
    /// including when only a partial packet remains.
    fn read_packet(&mut self, buf: &mut [u8; TS_PACKET_SIZE]) -> Result<bool>;

    /// Moves back to the first packet.
    fn rewind(&mut self) -> Result<()>;

    /// Bytes of a partial trailing packet dropped by the last read.
    fn discarded(&self) -> usize {
        0
    }
}

/// [`PacketSource`] over any seekable reader.
pub struct PacketReader<R> {
    inner: R,
    discarded: usize,
}

impl<R: Read + Seek> PacketReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, discarded: 0 }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn fill(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }
}

impl<R: Read + Seek> PacketSource for PacketReader<R> {
    fn read_packet(&mut self, buf: &mut [u8; TS_PACKET_SIZE]) -> Result<bool> {
        let n = self.fill(buf)?;
        if n == TS_PACKET_SIZE {
            return Ok(true);
        }
        if n > 0 {
            let truncated = PickError::InputTruncated { actual: n };
            debug!("{truncated}, discarding trailing bytes");
        }
        self.discarded = n;
        Ok(false)
    }

    fn rewind(&mut self) -> Result<()> {
        self.inner
            .seek(SeekFrom::Start(0))
            .map_err(PickError::NotSeekable)?;
        self.discarded = 0;
        Ok(())
    }

    fn discarded(&self) -> usize {
        self.discarded
    }
}
