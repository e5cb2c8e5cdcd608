//! POSIX shell script that removes redundant copies.
//!
//! dupescan never deletes anything itself. This formatter writes the
//! removals implied by a [`KeepPolicy`] as a script for the user to review
//! and run:
//!
//! * the script is a dry run unless invoked with `--confirm`
//! * paths are single-quoted, so spaces, `$` and backticks are inert
//! * unreviewed sets are listed as comments and produce no `rm` line
//!
//! # Usage
//!
//! ```rust,ignore
//! use dupescan::output::script::ScriptOutput;
//! use dupescan::output::selection::KeepPolicy;
//!
//! let output = ScriptOutput::new(&groups, KeepPolicy::Shortest);
//! output.write_to(&mut std::io::stdout())?;
//! ```

use std::io::{self, Write};
use std::path::Path;

use bytesize::ByteSize;

use super::selection::{CleanupStats, KeepPolicy};
use crate::duplicates::DuplicateGroup;

/// Number of hash characters shown in set comments.
const HASH_PREFIX_LEN: usize = 12;

/// Formatter for the deletion script.
pub struct ScriptOutput<'a> {
    groups: &'a [DuplicateGroup],
    keep: KeepPolicy,
}

impl<'a> ScriptOutput<'a> {
    /// Create a formatter that keeps one copy per set according to `keep`.
    #[must_use]
    pub fn new(groups: &'a [DuplicateGroup], keep: KeepPolicy) -> Self {
        Self { groups, keep }
    }

    /// Write the script.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let stats = CleanupStats::new(self.groups, self.keep);

        writeln!(writer, "#!/bin/sh")?;
        writeln!(writer, "# dupescan deletion script")?;
        writeln!(
            writer,
            "# Generated on: {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        )?;
        writeln!(writer, "#")?;
        writeln!(writer, "# WARNING: This script will PERMANENTLY DELETE files.")?;
        writeln!(writer, "# Please review carefully before executing.")?;
        writeln!(writer, "#")?;
        writeln!(writer, "# Files to keep: {}", stats.files_to_keep)?;
        writeln!(writer, "# Files to delete: {}", stats.files_to_delete)?;
        writeln!(writer, "# Space saved: {}", ByteSize::b(stats.space_saved))?;
        if stats.unreviewed_sets > 0 {
            writeln!(
                writer,
                "# Unreviewed sets (nothing removed): {}",
                stats.unreviewed_sets
            )?;
        }
        writeln!(writer)?;

        writeln!(writer, "DRY_RUN=1")?;
        writeln!(writer, "if [ \"$1\" = \"--confirm\" ]; then")?;
        writeln!(writer, "    DRY_RUN=0")?;
        writeln!(writer, "fi")?;
        writeln!(writer)?;
        writeln!(writer, "DELETED_COUNT=0")?;
        writeln!(writer, "RECLAIMED_BYTES=0")?;
        writeln!(writer)?;

        for (i, group) in self.groups.iter().enumerate() {
            self.write_group(writer, i + 1, group)?;
        }

        writeln!(writer, "if [ \"$DRY_RUN\" -eq 0 ]; then")?;
        writeln!(
            writer,
            "    echo \"Deletion complete. Deleted $DELETED_COUNT files, reclaimed $RECLAIMED_BYTES bytes.\""
        )?;
        writeln!(writer, "else")?;
        writeln!(
            writer,
            "    echo \"Dry run complete. Run with --confirm to delete.\""
        )?;
        writeln!(writer, "fi")?;

        Ok(())
    }

    fn write_group<W: Write>(
        &self,
        writer: &mut W,
        index: usize,
        group: &DuplicateGroup,
    ) -> io::Result<()> {
        let hex = group.hash_hex();
        writeln!(
            writer,
            "# Set {}: {}... ({} x {})",
            index,
            &hex[..HASH_PREFIX_LEN],
            ByteSize::b(group.size),
            group.len()
        )?;

        let Some(keep) = self.keep.keeper(group) else {
            writeln!(writer, "# UNREVIEWED, nothing removed:")?;
            for path in &group.paths {
                writeln!(writer, "#   {}", escape_posix(path))?;
            }
            return writeln!(writer);
        };

        writeln!(writer, "# KEEP:   {}", escape_posix(keep))?;
        for path in self.keep.removals(group) {
            let quoted = escape_posix(path);
            writeln!(writer, "if [ \"$DRY_RUN\" -eq 0 ]; then")?;
            writeln!(writer, "    rm {quoted} && \\")?;
            writeln!(writer, "    DELETED_COUNT=$((DELETED_COUNT + 1)) && \\")?;
            writeln!(
                writer,
                "    RECLAIMED_BYTES=$((RECLAIMED_BYTES + {}))",
                group.size
            )?;
            writeln!(writer, "else")?;
            writeln!(writer, "    echo would delete: {quoted}")?;
            writeln!(writer, "fi")?;
        }
        writeln!(writer)
    }
}

/// Single-quote `path` for a POSIX shell.
fn escape_posix(path: &Path) -> String {
    let s = path.to_string_lossy();
    format!("'{}'", s.replace('\'', "'\\''"))
}
