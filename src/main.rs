//! hipdelta CLI - builds a patch archive holding the differences between
//! two HIP archives.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;

use hipdelta::prelude::*;
use hipdelta::{Error, Side};

/// hipdelta - build a HIP patch archive from an original and a modified archive
#[derive(Parser)]
#[command(name = "hipdelta")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// The unmodified archive
    original: PathBuf,

    /// The modified archive
    modified: PathBuf,

    /// Where to write the patch archive
    #[arg(default_value = "output.hip")]
    output: PathBuf,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Usage errors must exit with 1, not clap's default of 2.
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    // RUST_LOG still wins over the flags.
    let level = match (cli.verbose, cli.quiet) {
        (0, true) => "error",
        (0, false) => "warn",
        (1, _) => "info",
        (2, _) => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path)
        .with_context(|| format!("Could not open file {} for reading", path.display()))?;
    Ok(BufReader::new(file))
}

fn run(cli: &Cli) -> Result<()> {
    let original = open(&cli.original)?;
    let modified = open(&cli.modified)?;

    let mut session = DeltaSession::new(original, modified);
    let delta = session
        .plan(&mut |event| println!("{event}"))
        .map_err(|e| {
            let context = match &e {
                Error::Input { side: Side::Original, .. } => {
                    format!("Could not read {}", cli.original.display())
                }
                Error::Input { side: Side::Modified, .. } => {
                    format!("Could not read {}", cli.modified.display())
                }
                _ => format!(
                    "Could not build a delta of {} and {}",
                    cli.original.display(),
                    cli.modified.display()
                ),
            };
            anyhow::Error::new(e).context(context)
        })?;

    let output = File::create(&cli.output).with_context(|| {
        format!("Could not open file {} for writing", cli.output.display())
    })?;
    let summary = session
        .write(delta, BufWriter::new(output))
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;

    log::info!(
        "{} new or changed, {} dummied, {} layer(s), {} data bytes",
        summary.real_assets,
        summary.dummy_assets,
        summary.written.layer_count,
        summary.written.data_len
    );

    println!("\nWritten to {}", cli.output.display());
    Ok(())
}
