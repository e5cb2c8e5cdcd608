//! Command-line interface definitions.
//!
//! # Example
//!
//! ```bash
//! # Report duplicates under two trees, skipping a scratch directory
//! dupescan scan ~/Pictures /mnt/backup/Pictures --exclude ~/Pictures/tmp
//!
//! # JSON report written to a file
//! dupescan scan /data --output json --output-file report.json
//!
//! # Review script removing every copy but the one with the shortest path
//! dupescan scan /data --output script --output-file cleanup.sh
//!
//! # Debug logging
//! dupescan -v scan /data
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::output::selection::KeepPolicy;

/// Multi-stage duplicate file finder.
///
/// Finds byte-identical regular files by size, then a SHA-256 of the first
/// 4 KiB, then a SHA-256 of the full content. Files are only reported,
/// never modified or deleted; `--output script` writes removals to a shell
/// script for review instead.
#[derive(Debug, Parser)]
#[command(name = "dupescan")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Print fatal errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Configuration file (default: platform config dir)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan directories for duplicate files
    Scan(ScanArgs),
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directories to scan. Nested roots are collapsed.
    #[arg(value_name = "PATH", required = true, num_args = 1..)]
    pub paths: Vec<PathBuf>,

    /// Directory whose contents are skipped (can be specified multiple times)
    #[arg(short = 'x', long = "exclude", value_name = "PATH")]
    pub exclude: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Which copy of each set to keep in reports and scripts
    #[arg(short, long, value_enum)]
    pub keep: Option<KeepPolicy>,

    /// Worker threads for stat and hash stages (0 = one per CPU)
    ///
    /// Lower values reduce disk thrashing on HDDs.
    #[arg(long, value_name = "N")]
    pub io_threads: Option<usize>,

    /// Write the report to FILE instead of stdout
    #[arg(long, value_name = "FILE")]
    pub output_file: Option<PathBuf>,
}

/// Output format for scan results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable listing
    #[default]
    Text,
    /// JSON for scripting
    Json,
    /// POSIX shell script removing every copy not kept
    Script,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Script => write!(f, "script"),
        }
    }
}
