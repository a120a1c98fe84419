use clap::Parser;
use tracing::Level;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};
use tspick::picker::{run, Options};

/// Keeps one program of an MPEG-TS file: its PMT, PCR and elementary
/// streams, with the PAT rewritten to list only that program.
#[derive(Parser)]
#[command(version)]
struct Opt {
    /// Source TS file (`-` for standard input)
    source: String,

    /// Output file or directory (`-` for standard output).
    /// Defaults to <source>_tspick.<ext> next to the source
    dest: Option<String>,

    /// Overwrite an existing output without asking
    #[clap(short, long, default_value_t = false)]
    force: bool,

    /// Re-read the written file and check the PAT and PIDs
    #[clap(long, default_value_t = false)]
    verify: bool,

    /// Print a JSON run report
    #[clap(long, default_value_t = false)]
    json: bool,

    /// Debug logging
    #[clap(short, long, default_value_t = false)]
    verbose: bool,

    /// Errors only
    #[clap(short, long, default_value_t = false, conflicts_with = "verbose")]
    quiet: bool,
}

fn init_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false).with_level(verbose))
        .with(filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    let opt = Opt::parse();
    init_logging(opt.verbose, opt.quiet);

    run(Options {
        source: opt.source,
        dest: opt.dest,
        force: opt.force,
        verify: opt.verify,
        json: opt.json,
    })
}
