//! File handling around the filter: output naming, overwrite checks,
//! opening files or the standard streams.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use tracing::{info, warn};

use crate::constants::OUTPUT_SUFFIX;
use crate::filter::{self, FilterStats};
use crate::picker::Options;
use crate::program::ResolvedProgram;
use crate::report::Reporter;
use crate::source::PacketReader;
use crate::verify::{verify_output, VerifyReport};

/// `-` selects the standard stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Std,
    Path(PathBuf),
}

impl Endpoint {
    pub fn parse(arg: &str) -> Self {
        if arg == "-" { Endpoint::Std } else { Endpoint::Path(PathBuf::from(arg)) }
    }

    fn display(&self) -> String {
        match self {
            Endpoint::Std => "-".to_string(),
            Endpoint::Path(p) => p.display().to_string(),
        }
    }
}

/// Output path for `source` when no destination is given:
/// `dir/name_tspick.ext` beside the source.
pub fn suffixed_path(source: &Path) -> PathBuf {
    let stem = source.file_stem().unwrap_or_default().to_string_lossy();
    let name = match source.extension() {
        Some(ext) => format!("{stem}{OUTPUT_SUFFIX}.{}", ext.to_string_lossy()),
        None => format!("{stem}{OUTPUT_SUFFIX}"),
    };
    source.with_file_name(name)
}

/// Resolves the output location from the source and the optional destination.
///
/// A destination that is an existing directory receives a file with the
/// source's name.
pub fn derive_output(source: &Endpoint, dest: Option<&str>) -> anyhow::Result<Endpoint> {
    match (source, dest.map(Endpoint::parse)) {
        (_, Some(Endpoint::Std)) => Ok(Endpoint::Std),
        (Endpoint::Path(src), None) => Ok(Endpoint::Path(suffixed_path(src))),
        (Endpoint::Std, None) => bail!("a destination is required when reading standard input"),
        (source, Some(Endpoint::Path(dest))) if dest.is_dir() => match source {
            Endpoint::Path(src) => {
                let name = src.file_name().context("source has no file name")?;
                Ok(Endpoint::Path(dest.join(name)))
            }
            Endpoint::Std => bail!("{} is a directory", dest.display()),
        },
        (_, Some(dest)) => Ok(dest),
    }
}

#[cfg(unix)]
fn open_stdin() -> anyhow::Result<File> {
    use std::os::fd::AsFd;
    // A duplicated descriptor seeks like a file when stdin is redirected from one.
    let fd = io::stdin().as_fd().try_clone_to_owned().context("duplicating standard input")?;
    Ok(File::from(fd))
}

#[cfg(not(unix))]
fn open_stdin() -> anyhow::Result<File> {
    bail!("reading standard input is only supported on Unix")
}

fn open_source(source: &Endpoint) -> anyhow::Result<File> {
    match source {
        Endpoint::Std => open_stdin(),
        Endpoint::Path(p) => {
            if !p.is_file() {
                bail!("Can't open input file: {}", p.display());
            }
            File::open(p).with_context(|| format!("Can't open input file: {}", p.display()))
        }
    }
}

/// Whether the opened input and `out` are the same file. Comparing the open
/// descriptor also catches standard input redirected from `out`.
#[cfg(unix)]
fn same_file(_source: &Endpoint, input: &File, out: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;
    match (input.metadata(), fs::metadata(out)) {
        (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn same_file(source: &Endpoint, _input: &File, out: &Path) -> bool {
    let Endpoint::Path(src) = source else { return false };
    match (fs::canonicalize(src), fs::canonicalize(out)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Asks on the terminal whether `path` may be overwritten.
pub fn confirm_overwrite<R: BufRead, W: Write>(path: &Path, mut input: R, mut prompt: W) -> io::Result<bool> {
    write!(prompt, "overwrite {}? [y/N] ", path.display())?;
    prompt.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "Yes"))
}

fn check_output(source: &Endpoint, input: &File, output: &Endpoint, force: bool) -> anyhow::Result<()> {
    let Endpoint::Path(out) = output else { return Ok(()) };
    if same_file(source, input, out) {
        bail!("output {} is the input file", out.display());
    }
    if !out.exists() || force {
        return Ok(());
    }
    if *source == Endpoint::Std {
        bail!("{} exists; use --force to overwrite it", out.display());
    }
    if !confirm_overwrite(out, io::stdin().lock(), io::stderr())? {
        bail!("{} exists, not overwritten", out.display());
    }
    Ok(())
}

fn write_output(
    program: &ResolvedProgram,
    source: &mut PacketReader<BufReader<File>>,
    output: &Endpoint,
) -> anyhow::Result<FilterStats> {
    match output {
        Endpoint::Std => {
            let mut sink = BufWriter::new(io::stdout().lock());
            Ok(filter::write_filtered(program, source, &mut sink)?)
        }
        Endpoint::Path(path) => {
            info!("Output file: {}", path.display());
            let file = File::create(path)
                .with_context(|| format!("Can't open output file: {}", path.display()))?;
            let mut sink = BufWriter::new(file);
            match filter::write_filtered(program, source, &mut sink) {
                Ok(stats) => Ok(stats),
                Err(e) => {
                    drop(sink);
                    if let Err(rm) = fs::remove_file(path) {
                        warn!("could not remove partial output {}: {rm}", path.display());
                    }
                    Err(e).context("filtering failed, partial output removed")
                }
            }
        }
    }
}

/// Runs the whole tool for `opts`.
pub fn run(opts: Options) -> anyhow::Result<()> {
    let source_ep = Endpoint::parse(&opts.source);
    let output_ep = derive_output(&source_ep, opts.dest.as_deref())?;
    let file = open_source(&source_ep)?;
    check_output(&source_ep, &file, &output_ep, opts.force)?;

    let mut source = PacketReader::new(BufReader::new(file));

    // The output is only created once the program is known.
    let program = filter::resolve(&mut source)
        .with_context(|| format!("resolving program in {}", source_ep.display()))?;
    let stats = write_output(&program, &mut source, &output_ep)?;
    info!(
        written = stats.packets_written,
        dropped = stats.packets_dropped,
        "done"
    );

    let verify: Option<VerifyReport> = match (&output_ep, opts.verify) {
        (Endpoint::Path(path), true) => {
            let file = File::open(path)
                .with_context(|| format!("Can't open output file for verification: {}", path.display()))?;
            let report = verify_output(BufReader::new(file), &program)?;
            Some(report)
        }
        (Endpoint::Std, true) => {
            warn!("--verify is ignored when writing to standard output");
            None
        }
        _ => None,
    };

    if opts.json {
        let json = Reporter::run_json(
            &source_ep.display(),
            &output_ep.display(),
            &program,
            &stats,
            verify.as_ref(),
        )?;
        match output_ep {
            Endpoint::Std => eprintln!("{json}"),
            Endpoint::Path(_) => println!("{json}"),
        }
    }

    if let Some(report) = verify {
        if !report.ok {
            bail!("output verification failed");
        }
    }
    Ok(())
}
