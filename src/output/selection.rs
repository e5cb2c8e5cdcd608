//! Choosing which copy of each duplicate set to keep.
//!
//! Selection never touches the filesystem. It only decides how the text
//! report marks each member and which removals the deletion script lists.
//!
//! # Example
//!
//! ```
//! use std::path::{Path, PathBuf};
//! use dupescan::duplicates::DuplicateGroup;
//! use dupescan::output::selection::{KeepPolicy, Mark};
//!
//! let group = DuplicateGroup::new(
//!     [0u8; 32],
//!     5,
//!     vec![PathBuf::from("/data/backup/x.txt"), PathBuf::from("/data/x.txt")],
//! );
//!
//! assert_eq!(KeepPolicy::Shortest.keeper(&group), Some(Path::new("/data/x.txt")));
//! assert_eq!(KeepPolicy::Shortest.mark(&group, Path::new("/data/backup/x.txt")), Mark::Delete);
//! ```

use std::path::Path;

use clap::ValueEnum;

use crate::duplicates::DuplicateGroup;
use crate::scanner::path_utils::normalize_path_str;

/// Rule for picking the copy to keep in each set.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Hash,
    ValueEnum,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum KeepPolicy {
    /// Keep the member with the shortest path.
    ///
    /// Length is counted in characters of the NFC form, so the choice does
    /// not depend on how the filesystem stored accented names. Ties go to the
    /// first member in sorted order.
    #[default]
    Shortest,

    /// Select nothing. Every set is left for manual review and no removal
    /// is generated for it.
    Manual,
}

/// How a member of a duplicate set is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    /// The copy that stays.
    Keep,
    /// A redundant copy.
    Delete,
    /// Nothing in the set has been selected.
    Unreviewed,
}

impl Mark {
    /// Bracketed label used in reports.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Mark::Keep => "[KEEP]",
            Mark::Delete => "[DELETE]",
            Mark::Unreviewed => "[UNREVIEWED]",
        }
    }
}

impl KeepPolicy {
    /// The member to keep, or `None` when the set is left unreviewed.
    #[must_use]
    pub fn keeper<'g>(self, group: &'g DuplicateGroup) -> Option<&'g Path> {
        match self {
            KeepPolicy::Shortest => group
                .paths
                .iter()
                .min_by_key(|path| display_len(path))
                .map(|path| path.as_path()),
            KeepPolicy::Manual => None,
        }
    }

    /// Mark for `path` within `group`.
    #[must_use]
    pub fn mark(self, group: &DuplicateGroup, path: &Path) -> Mark {
        match self.keeper(group) {
            Some(keep) if keep == path => Mark::Keep,
            Some(_) => Mark::Delete,
            None => Mark::Unreviewed,
        }
    }

    /// Members to remove, in sorted order. Empty for unreviewed sets.
    #[must_use]
    pub fn removals<'g>(self, group: &'g DuplicateGroup) -> Vec<&'g Path> {
        match self.keeper(group) {
            Some(keep) => group
                .paths
                .iter()
                .map(|path| path.as_path())
                .filter(|path| *path != keep)
                .collect(),
            None => Vec::new(),
        }
    }
}

fn display_len(path: &Path) -> usize {
    normalize_path_str(&path.to_string_lossy()).chars().count()
}

/// Outcome of applying a [`KeepPolicy`] to every set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupStats {
    /// Members across all sets
    pub files_found: usize,
    /// Copies marked to keep
    pub files_to_keep: usize,
    /// Copies marked for deletion
    pub files_to_delete: usize,
    /// Sets with no selection; their members are neither kept nor deleted
    pub unreviewed_sets: usize,
    /// Bytes freed by deleting every marked copy
    pub space_saved: u64,
}

impl CleanupStats {
    /// Tally the selection over `groups`.
    #[must_use]
    pub fn new(groups: &[DuplicateGroup], policy: KeepPolicy) -> Self {
        let mut stats = Self::default();
        for group in groups {
            stats.files_found += group.len();
            if policy.keeper(group).is_none() {
                stats.unreviewed_sets += 1;
                continue;
            }
            let removed = policy.removals(group).len();
            stats.files_to_keep += group.len() - removed;
            stats.files_to_delete += removed;
            stats.space_saved += group.size * removed as u64;
        }
        stats
    }
}
