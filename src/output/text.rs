//! Human-readable report.
//!
//! ```text
//! 2cf24dba5fb0a30e... (5 B x 2)
//!   [KEEP]   /data/x.txt
//!   [DELETE] /data/y.txt
//!
//! Scan complete. Found 1 sets of duplicates.
//! 3 files scanned (20 B), 1 redundant copies, 5 B reclaimable (25.0%)
//! Keeping 1, deleting 1, saving 5 B
//! ```

use std::io::{self, Write};

use bytesize::ByteSize;
use yansi::{Condition, Paint};

use super::selection::{CleanupStats, KeepPolicy, Mark};
use crate::duplicates::{DuplicateGroup, ScanSummary};

/// Number of hash characters shown in group headers.
const HASH_PREFIX_LEN: usize = 16;

/// Plain-text formatter for scan results.
pub struct TextOutput<'a> {
    groups: &'a [DuplicateGroup],
    summary: &'a ScanSummary,
    keep: KeepPolicy,
    color: Condition,
}

impl<'a> TextOutput<'a> {
    /// Create a formatter. `keep` decides the member markers; `color`
    /// enables ANSI styling.
    #[must_use]
    pub fn new(
        groups: &'a [DuplicateGroup],
        summary: &'a ScanSummary,
        keep: KeepPolicy,
        color: bool,
    ) -> Self {
        Self {
            groups,
            summary,
            keep,
            color: if color {
                Condition::ALWAYS
            } else {
                Condition::NEVER
            },
        }
    }

    /// Write the listing followed by the summary.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for group in self.groups {
            self.write_group(writer, group)?;
        }
        self.write_summary(writer)
    }

    fn write_group<W: Write>(&self, writer: &mut W, group: &DuplicateGroup) -> io::Result<()> {
        let hex = group.hash_hex();
        let header = format!(
            "{}... ({} x {})",
            &hex[..HASH_PREFIX_LEN],
            ByteSize::b(group.size),
            group.len()
        );
        writeln!(writer, "{}", header.bold().whenever(self.color))?;
        for path in &group.paths {
            let mark = self.keep.mark(group, path);
            let label = format!("{:<8}", mark.label());
            let label = match mark {
                Mark::Keep => label.green(),
                Mark::Delete => label.red(),
                Mark::Unreviewed => label.yellow(),
            };
            writeln!(
                writer,
                "  {} {}",
                label.whenever(self.color),
                path.display()
            )?;
        }
        writeln!(writer)
    }

    fn write_summary<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let s = self.summary;
        let headline = format!(
            "Scan complete. Found {} sets of duplicates.",
            s.duplicate_groups
        );
        let headline = if s.duplicate_groups == 0 {
            headline.yellow()
        } else {
            headline.green()
        };
        writeln!(writer, "{}", headline.whenever(self.color))?;
        writeln!(
            writer,
            "{} files scanned ({}), {} redundant copies, {} reclaimable ({:.1}%)",
            s.total_files,
            s.total_size_display(),
            s.duplicate_files,
            s.reclaimable_display(),
            s.wasted_percentage()
        )?;

        let cleanup = CleanupStats::new(self.groups, self.keep);
        if cleanup.files_found > 0 {
            writeln!(
                writer,
                "Keeping {}, deleting {}, saving {}",
                cleanup.files_to_keep,
                cleanup.files_to_delete,
                ByteSize::b(cleanup.space_saved)
            )?;
        }
        if cleanup.unreviewed_sets > 0 {
            writeln!(
                writer,
                "{} sets left unreviewed",
                cleanup.unreviewed_sets
            )?;
        }

        if s.has_errors() {
            let warning = format!(
                "{} files or sets skipped because of errors (run with -v for details)",
                s.scan_errors.len()
            );
            writeln!(writer, "{}", warning.red().whenever(self.color))?;
        }
        Ok(())
    }
}
