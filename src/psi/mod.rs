//! CRC-validating PAT / PMT parsers, used to check produced output.

pub mod section;
pub mod pat;
pub mod pmt;

pub use pat::{parse_pat, PatSection};
pub use pmt::{parse_pmt, PmtSection};
