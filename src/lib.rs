// src/lib.rs
pub mod picker {
    /// What the command line asks for
    pub struct Options {
        /// Input path, or `-` for standard input
        pub source: String,
        /// Output file or directory, `-` for standard output
        pub dest: Option<String>,
        pub force: bool,
        pub verify: bool,
        pub json: bool,
    }

    /// Entry point of the `tspick` binary; returns once the output is written.
    pub fn run(opts: Options) -> anyhow::Result<()> {
        crate::shell::run(opts)
    }
}

pub mod constants;
pub mod crc32;
pub mod error;
pub mod packet;
pub mod program;
pub mod resolver;
pub mod source;
pub mod filter;
pub mod psi;
pub mod verify;
pub mod report;
mod shell;

#[cfg(test)]
mod testutil;

pub use error::{PickError, Result};
pub use filter::{resolve, run, write_filtered, FilterStats};
pub use program::{ResolvedProgram, RetainedPidSet, RewrittenPatSection};
pub use source::{PacketReader, PacketSource};
