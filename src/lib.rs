//! dupescan - multi-stage duplicate file finder.
//!
//! Finds byte-identical regular files under one or more directory trees.
//! Candidates are narrowed by size, then by a SHA-256 of their first 4 KiB,
//! then confirmed with a SHA-256 of the full content. Files are reported,
//! never modified.
//!
//! # Example
//!
//! ```no_run
//! let duplicates = dupescan::find_duplicates(&["/data"], &["/data/tmp"]).unwrap();
//! for (hash, group) in &duplicates {
//!     println!("{hash}: {} bytes, {:?}", group.size, group.paths);
//! }
//! ```

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, IsTerminal, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::{Cli, Commands, OutputFormat, ScanArgs};
use crate::config::Config;
use crate::duplicates::{by_hash, DuplicateFinder, DuplicateGroup, FinderError};
use crate::error::ExitCode;
use crate::output::{JsonOutput, ScriptOutput, TextOutput};
use crate::progress::Progress;

/// Find duplicate files with default settings.
///
/// Returns confirmed duplicate sets keyed by lowercase hex SHA-256. Sets with
/// a single member never appear, and neither do zero-byte files.
///
/// # Errors
///
/// Returns [`FinderError::NoValidRoots`] if no scan root is an existing
/// directory. Unreadable files are skipped, not reported as errors; use
/// [`DuplicateFinder`] to inspect them.
pub fn find_duplicates<S, E>(
    scan_roots: &[S],
    exclude_roots: &[E],
) -> Result<BTreeMap<String, DuplicateGroup>, FinderError>
where
    S: AsRef<Path>,
    E: AsRef<Path>,
{
    let (groups, _summary) =
        DuplicateFinder::with_defaults().find_duplicates(scan_roots, exclude_roots)?;
    Ok(by_hash(groups))
}

/// Run the command line application.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded, the scan aborts
/// (see [`FinderError`]) or the report cannot be written.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    if cli.no_color {
        yansi::disable();
    }

    let mut config = match cli.config {
        Some(ref path) => {
            if !path.is_file() {
                anyhow::bail!("Configuration file not found: {}", path.display());
            }
            Config::try_load_from_path(path)?
        }
        None => Config::load(),
    };

    match cli.command {
        Commands::Scan(ref args) => {
            config.merge_scan_args(args);
            run_scan(&cli, args, &config)
        }
    }
}

fn run_scan(cli: &Cli, args: &ScanArgs, config: &Config) -> Result<ExitCode> {
    let handler = signal::install_handler()?;
    let progress = Arc::new(Progress::new(cli.quiet));

    let finder_config = config
        .finder_config()
        .with_shutdown_flag(handler.get_flag())
        .with_progress_callback(progress);

    let (groups, summary) =
        DuplicateFinder::new(finder_config).find_duplicates(&args.paths, &config.exclude)?;

    let exit_code = ExitCode::from_summary(&summary);

    let (mut writer, to_terminal): (Box<dyn Write>, bool) = match config.output_file {
        Some(ref path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file {}", path.display()))?;
            (Box::new(BufWriter::new(file)), false)
        }
        None => (Box::new(io::stdout().lock()), io::stdout().is_terminal()),
    };

    match config.output {
        OutputFormat::Json => JsonOutput::new(&groups, &summary, exit_code)
            .write_to(&mut writer, true)
            .context("Failed to write JSON report")?,
        OutputFormat::Text => {
            TextOutput::new(&groups, &summary, config.keep, to_terminal && !cli.no_color)
                .write_to(&mut writer)
                .context("Failed to write report")?;
        }
        OutputFormat::Script => ScriptOutput::new(&groups, config.keep)
            .write_to(&mut writer)
            .context("Failed to write deletion script")?,
    }
    writer.flush()?;

    if let Some(ref path) = config.output_file {
        log::info!("Report written to {}", path.display());
    }

    Ok(exit_code)
}
