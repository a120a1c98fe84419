use thiserror::Error;

/// Errors that can occur while resolving or filtering a program
#[derive(Error, Debug)]
pub enum PickError {
    #[error("Input truncated: expected 188 bytes, got {actual}")]
    InputTruncated { actual: usize },

    #[error("PAT not found before end of input")]
    PatNotFound,

    #[error("PMT (PID 0x{pmt_pid:04x}) not found before end of input")]
    PmtNotFound { pmt_pid: u16 },

    #[error("Malformed section on PID 0x{pid:04x}: read at offset {offset} leaves the packet")]
    MalformedSection { pid: u16, offset: usize },

    #[error("Input is not seekable: {0}")]
    NotSeekable(#[source] std::io::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PickError>;
