//! Size grouping and confirmed duplicate groups.
//!
//! # Overview
//!
//! Size grouping is the first filtering stage of duplicate detection. Files
//! with different sizes cannot be duplicates, so only sizes shared by two or
//! more files move on to hashing. Zero-byte files are dropped here: every
//! empty file is trivially identical to every other, and they are never
//! reported.
//!
//! # Example
//!
//! ```
//! use dupescan::scanner::FileEntry;
//! use dupescan::duplicates::group_by_size;
//! use std::path::PathBuf;
//!
//! let files = vec![
//!     FileEntry::new(PathBuf::from("/file1.txt"), 1024),
//!     FileEntry::new(PathBuf::from("/file2.txt"), 1024),
//!     FileEntry::new(PathBuf::from("/file3.txt"), 2048),
//!     FileEntry::new(PathBuf::from("/empty1.txt"), 0),
//!     FileEntry::new(PathBuf::from("/empty2.txt"), 0),
//! ];
//!
//! let (groups, stats) = group_by_size(files);
//!
//! assert_eq!(stats.total_files, 5);
//! assert_eq!(stats.empty_files, 2);
//! assert_eq!(stats.potential_duplicates, 2);
//! assert_eq!(groups.len(), 1);
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use crate::scanner::{hash_to_hex, FileEntry, Hash};

/// Statistics from size grouping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Files that entered grouping
    pub total_files: usize,
    /// Zero-byte files dropped by policy
    pub empty_files: usize,
    /// Files whose size no other file shares
    pub eliminated_unique: usize,
    /// Files remaining in groups of two or more
    pub potential_duplicates: usize,
    /// Number of size groups with two or more files
    pub duplicate_groups: usize,
}

impl GroupingStats {
    /// Percentage of files eliminated by size grouping.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            let eliminated = self.total_files - self.potential_duplicates;
            (eliminated as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Group files by exact size, keeping only sizes shared by 2+ files.
///
/// Zero-byte files are excluded before grouping.
#[must_use]
pub fn group_by_size(files: Vec<FileEntry>) -> (HashMap<u64, Vec<FileEntry>>, GroupingStats) {
    let mut stats = GroupingStats {
        total_files: files.len(),
        ..Default::default()
    };

    let mut by_size: HashMap<u64, Vec<FileEntry>> = HashMap::new();
    for file in files {
        if file.size == 0 {
            log::trace!("Skipping empty file: {}", file.path.display());
            stats.empty_files += 1;
            continue;
        }
        by_size.entry(file.size).or_default().push(file);
    }

    by_size.retain(|_, group| {
        if group.len() > 1 {
            stats.potential_duplicates += group.len();
            stats.duplicate_groups += 1;
            true
        } else {
            stats.eliminated_unique += group.len();
            false
        }
    });

    (by_size, stats)
}

/// A confirmed set of byte-identical files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// SHA-256 of the full file content
    pub hash: Hash,
    /// Size in bytes shared by every member
    pub size: u64,
    /// Member paths, sorted
    pub paths: Vec<PathBuf>,
}

impl DuplicateGroup {
    /// Create a new duplicate group. Member paths are sorted.
    #[must_use]
    pub fn new(hash: Hash, size: u64, mut paths: Vec<PathBuf>) -> Self {
        paths.sort();
        Self { hash, size, paths }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Space reclaimable by keeping a single copy.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }

    /// Number of redundant copies (every member but one).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.paths.len().saturating_sub(1)
    }

    /// Hash as hexadecimal string.
    #[must_use]
    pub fn hash_hex(&self) -> String {
        hash_to_hex(&self.hash)
    }
}
