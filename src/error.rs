//! Exit codes and structured error reporting for the binary.

use serde::Serialize;

use crate::duplicates::{FinderError, ScanSummary};

/// Process exit codes.
///
/// - 0: duplicates found
/// - 1: unexpected failure
/// - 2: scan completed, nothing duplicated
/// - 3: scan completed but some files or sets were dropped
/// - 4: no usable scan root
/// - 130: interrupted (128 + SIGINT)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Scan completed and duplicates were found.
    Success = 0,
    /// An unexpected error occurred.
    GeneralError = 1,
    /// Scan completed but no duplicates were found.
    NoDuplicates = 2,
    /// Scan completed with per-file or per-set errors.
    PartialSuccess = 3,
    /// None of the requested scan roots is an existing directory.
    InvalidConfiguration = 4,
    /// Scan was interrupted by user (Ctrl+C).
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "RD000",
            Self::GeneralError => "RD001",
            Self::NoDuplicates => "RD002",
            Self::PartialSuccess => "RD003",
            Self::InvalidConfiguration => "RD004",
            Self::Interrupted => "RD130",
        }
    }

    /// Exit code for a completed scan.
    ///
    /// Dropped files take priority over the "no duplicates" outcome so that
    /// callers notice incomplete results.
    #[must_use]
    pub fn from_summary(summary: &ScanSummary) -> Self {
        if summary.has_errors() {
            Self::PartialSuccess
        } else if summary.duplicate_groups == 0 {
            Self::NoDuplicates
        } else {
            Self::Success
        }
    }

    /// Exit code for an error that aborted the run.
    #[must_use]
    pub fn from_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<FinderError>() {
            Some(FinderError::Interrupted) => Self::Interrupted,
            Some(FinderError::NoValidRoots) => Self::InvalidConfiguration,
            _ => Self::GeneralError,
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "RD004")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
    /// Whether the operation was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}
