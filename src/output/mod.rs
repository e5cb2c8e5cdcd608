//! Report formatters for scan results.
//!
//! - [`json`]: machine-readable report keyed by content hash
//! - [`text`]: human-readable listing with keep/delete markers
//! - [`script`]: POSIX shell script removing every copy not kept
//!
//! [`selection`] decides which copy of each set is kept.
//!
//! # Example
//!
//! ```no_run
//! use dupescan::duplicates::DuplicateFinder;
//! use dupescan::error::ExitCode;
//! use dupescan::output::JsonOutput;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (groups, summary) = finder.find_duplicates(&["."], &["./target"]).unwrap();
//!
//! let output = JsonOutput::new(&groups, &summary, ExitCode::from_summary(&summary));
//! println!("{}", output.to_json_pretty().unwrap());
//! ```

pub mod json;
pub mod script;
pub mod selection;
pub mod text;

pub use json::JsonOutput;
pub use script::ScriptOutput;
pub use selection::{CleanupStats, KeepPolicy};
pub use text::TextOutput;
