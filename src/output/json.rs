//! JSON output formatter for duplicate scan results.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "duplicates": {
//!     "2cf24dba...": { "paths": ["/data/x.txt", "/data/y.txt"], "size": 5 }
//!   },
//!   "summary": {
//!     "scan_roots": ["/data"],
//!     "exclude_roots": [],
//!     "total_files": 3,
//!     "duplicate_groups": 1,
//!     "reclaimable_space": 5,
//!     "wasted_percentage": 33.333333333333336,
//!     "scan_errors": [],
//!     "exit_code": 0,
//!     "exit_code_name": "RD000",
//!     "generated_at": "2024-01-01T00:00:00Z"
//!   }
//! }
//! ```
//!
//! `duplicates` is keyed by lowercase hex SHA-256, like
//! [`crate::find_duplicates`].

use std::collections::BTreeMap;
use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::duplicates::{DuplicateGroup, ScanSummary};
use crate::error::ExitCode;

/// A single duplicate set in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateGroup {
    /// Member paths, sorted
    pub paths: Vec<String>,
    /// Size in bytes of each member
    pub size: u64,
}

impl From<&DuplicateGroup> for JsonDuplicateGroup {
    fn from(group: &DuplicateGroup) -> Self {
        Self {
            paths: group
                .paths
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect(),
            size: group.size,
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Normalized scan roots
    pub scan_roots: Vec<String>,
    /// Normalized exclude roots
    pub exclude_roots: Vec<String>,
    /// Files discovered
    pub total_files: usize,
    /// Bytes across every stat'ed file
    pub total_size: u64,
    /// Zero-byte files skipped
    pub empty_files: usize,
    /// Files eliminated by size
    pub eliminated_by_size: usize,
    /// Files eliminated by the 4 KiB prehash
    pub eliminated_by_prehash: usize,
    /// Files eliminated by full hash
    pub eliminated_by_fullhash: usize,
    /// Confirmed duplicate sets
    pub duplicate_groups: usize,
    /// Redundant copies (members beyond the first of each set)
    pub duplicate_files: usize,
    /// Bytes held by redundant copies
    pub reclaimable_space: u64,
    /// Share of scanned bytes held by redundant copies, in percent
    pub wasted_percentage: f64,
    /// Sets dropped during assembly
    pub dropped_sets: usize,
    /// Scan wall time in milliseconds
    pub scan_duration_ms: u64,
    /// Non-fatal errors, one message each
    pub scan_errors: Vec<String>,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "RD000")
    pub exit_code_name: String,
    /// Report creation time
    pub generated_at: DateTime<Utc>,
}

impl JsonSummary {
    /// Create a JSON summary from a ScanSummary and an exit code.
    #[must_use]
    pub fn from_scan_summary(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        let paths = |v: &[std::path::PathBuf]| {
            v.iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect::<Vec<_>>()
        };
        Self {
            scan_roots: paths(&summary.scan_roots),
            exclude_roots: paths(&summary.exclude_roots),
            total_files: summary.total_files,
            total_size: summary.total_size,
            empty_files: summary.empty_files,
            eliminated_by_size: summary.eliminated_by_size,
            eliminated_by_prehash: summary.eliminated_by_prehash,
            eliminated_by_fullhash: summary.eliminated_by_fullhash,
            duplicate_groups: summary.duplicate_groups,
            duplicate_files: summary.duplicate_files,
            reclaimable_space: summary.reclaimable_space,
            wasted_percentage: summary.wasted_percentage(),
            dropped_sets: summary.dropped_sets,
            scan_duration_ms: u64::try_from(summary.scan_duration.as_millis()).unwrap_or(u64::MAX),
            scan_errors: summary.scan_errors.iter().map(ToString::to_string).collect(),
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
            generated_at: Utc::now(),
        }
    }
}

/// Complete JSON report.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Duplicate sets keyed by hex hash
    pub duplicates: BTreeMap<String, JsonDuplicateGroup>,
    /// Scan summary statistics
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Build a report from scan results.
    ///
    /// ```
    /// use dupescan::duplicates::{DuplicateGroup, ScanSummary};
    /// use dupescan::error::ExitCode;
    /// use dupescan::output::json::JsonOutput;
    /// use std::path::PathBuf;
    ///
    /// let groups = vec![DuplicateGroup::new(
    ///     [0u8; 32],
    ///     5,
    ///     vec![PathBuf::from("/x.txt"), PathBuf::from("/y.txt")],
    /// )];
    /// let output = JsonOutput::new(&groups, &ScanSummary::default(), ExitCode::Success);
    /// assert_eq!(output.duplicates.len(), 1);
    /// ```
    #[must_use]
    pub fn new(groups: &[DuplicateGroup], summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            duplicates: groups
                .iter()
                .map(|g| (g.hash_hex(), JsonDuplicateGroup::from(g)))
                .collect(),
            summary: JsonSummary::from_scan_summary(summary, exit_code),
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error while writing JSON: {0}")]
    Io(#[from] std::io::Error),
}
