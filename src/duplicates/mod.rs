//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file grouping (Phase 1)
//! - Prehash comparison keyed by size (Phase 2)
//! - Full hash comparison (Phase 3)
//! - Duplicate set assembly (Phase 4)

pub mod finder;
pub mod groups;

use std::collections::BTreeMap;

pub use finder::{
    phase1_size, phase2_prehash, phase3_fullhash, phase4_assemble, DuplicateFinder, FinderConfig,
    FinderError, FullhashStats, PhaseConfig, PrehashStats, ScanSummary, SizeStats,
};
pub use groups::{group_by_size, DuplicateGroup, GroupingStats};

/// Key duplicate groups by their hex-encoded full-content hash.
#[must_use]
pub fn by_hash(groups: Vec<DuplicateGroup>) -> BTreeMap<String, DuplicateGroup> {
    groups.into_iter().map(|g| (g.hash_hex(), g)).collect()
}
