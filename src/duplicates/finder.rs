//! Duplicate finder implementation with multi-phase detection.
//!
//! # Overview
//!
//! This module orchestrates the duplicate detection pipeline:
//! 0. **Discovery**: Walk normalized roots, pruning excluded directories
//! 1. **Phase 1 - Size grouping**: Stat every file, group by size
//! 2. **Phase 2 - Prehash**: Hash the first 4KB of same-size files
//! 3. **Phase 3 - Full hash**: Hash entire content of prehash matches
//! 4. **Phase 4 - Assembly**: Attach the representative size to each set
//!
//! Phases 1-3 fan out over a rayon pool built for the scan. Workers only
//! return `(file, result)` pairs; every grouping map is built by the calling
//! thread after the phase has finished, so each phase is a barrier and no
//! map is shared between threads.
//!
//! # Example
//!
//! ```no_run
//! use dupescan::duplicates::{DuplicateFinder, FinderConfig};
//!
//! let finder = DuplicateFinder::new(FinderConfig::default().with_io_threads(4));
//! let (groups, summary) = finder.find_duplicates(&["/data"], &["/data/tmp"]).unwrap();
//!
//! println!("Found {} duplicate groups", summary.duplicate_groups);
//! for group in &groups {
//!     println!("{} ({} bytes): {:?}", group.hash_hex(), group.size, group.paths);
//! }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use rayon::ThreadPool;

use super::groups::{group_by_size, DuplicateGroup, GroupingStats};
use crate::progress::{
    ProgressCallback, PHASE_FULLHASH, PHASE_PREHASH, PHASE_SIZING, PHASE_WALKING,
};
use crate::scanner::{
    file_size, hash_to_hex, normalize_roots, FileEntry, Hash, HashError, Hasher,
    NormalizedRoots, ScanError, Walker, WalkerConfig,
};

/// Threshold for logging large files.
const LARGE_FILE_THRESHOLD: u64 = 100 * 1024 * 1024; // 100MB

/// Settings shared by the per-file phases.
#[derive(Clone, Default)]
pub struct PhaseConfig {
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for PhaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhaseConfig")
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl PhaseConfig {
    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    fn phase_start(&self, phase: &str, total: usize) {
        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_start(phase, total);
        }
    }

    fn phase_end(&self, phase: &str) {
        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_end(phase);
        }
    }
}

/// Run `op` for every item on the pool.
///
/// Items skipped because of shutdown come back as [`HashError::Interrupted`].
/// Completion order is not preserved.
fn fan_out<I, T, F>(
    pool: &ThreadPool,
    items: Vec<I>,
    config: &PhaseConfig,
    path_of: fn(&I) -> &Path,
    op: F,
) -> Vec<(I, Result<T, HashError>)>
where
    I: Send,
    T: Send,
    F: Fn(&I) -> Result<T, HashError> + Sync,
{
    let completed = AtomicUsize::new(0);

    pool.install(|| {
        items
            .into_par_iter()
            .map(|item| {
                if config.is_shutdown_requested() {
                    let path = path_of(&item).to_path_buf();
                    return (item, Err(HashError::Interrupted(path)));
                }

                let result = op(&item);

                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                if let Some(ref callback) = config.progress_callback {
                    callback.on_progress(done, path_of(&item).to_string_lossy().as_ref());
                }

                (item, result)
            })
            .collect()
    })
}

fn entry_path(entry: &FileEntry) -> &Path {
    &entry.path
}

/// Split worker results into successes, recording failures.
///
/// Returns the successes and whether any item was skipped for shutdown.
fn collect_results<I, T>(
    results: Vec<(I, Result<T, HashError>)>,
    phase: &str,
    failed_files: &mut usize,
    errors: &mut Vec<HashError>,
) -> (Vec<(I, T)>, bool) {
    let mut ok = Vec::with_capacity(results.len());
    let mut interrupted = false;

    for (item, result) in results {
        match result {
            Ok(value) => ok.push((item, value)),
            Err(e) if e.is_interrupted() => interrupted = true,
            Err(e) => {
                match e {
                    HashError::NotFound(_) => log::debug!("{phase}: file vanished: {e}"),
                    _ => log::warn!("{phase}: skipping file: {e}"),
                }
                *failed_files += 1;
                errors.push(e);
            }
        }
    }

    (ok, interrupted)
}

/// Statistics from size indexing.
#[derive(Debug, Clone, Default)]
pub struct SizeStats {
    /// Files that entered Phase 1
    pub input_files: usize,
    /// Files whose size was read
    pub sized_files: usize,
    /// Files that could not be stat'ed
    pub failed_files: usize,
    /// Errors encountered while stat'ing
    pub errors: Vec<HashError>,
    /// Combined size of every sized file
    pub total_size: u64,
    /// Grouping statistics over the sized files
    pub grouping: GroupingStats,
    /// Whether phase was interrupted by shutdown
    pub interrupted: bool,
}

/// Stat every discovered file and group by size (Phase 1).
///
/// Stat failures drop the file. Zero-byte files and sizes shared by fewer
/// than two files are eliminated.
#[must_use]
pub fn phase1_size(
    paths: Vec<PathBuf>,
    pool: &ThreadPool,
    config: &PhaseConfig,
) -> (HashMap<u64, Vec<FileEntry>>, SizeStats) {
    let mut stats = SizeStats {
        input_files: paths.len(),
        ..Default::default()
    };

    if paths.is_empty() {
        log::debug!("Phase 1: No files to process");
        return (HashMap::new(), stats);
    }

    config.phase_start(PHASE_SIZING, paths.len());

    let results = fan_out(pool, paths, config, PathBuf::as_path, |p| file_size(p));
    let (sized, interrupted) =
        collect_results(results, "Phase 1", &mut stats.failed_files, &mut stats.errors);
    stats.interrupted = interrupted || config.is_shutdown_requested();

    let entries: Vec<FileEntry> = sized
        .into_iter()
        .map(|(path, size)| FileEntry::new(path, size))
        .collect();
    stats.sized_files = entries.len();
    stats.total_size = entries.iter().map(|f| f.size).sum();

    let (size_groups, grouping) = group_by_size(entries);
    stats.grouping = grouping;

    config.phase_end(PHASE_SIZING);

    log::info!(
        "Phase 1 complete: {} files → {} potential duplicates ({:.1}% eliminated, {} empty)",
        stats.grouping.total_files,
        stats.grouping.potential_duplicates,
        stats.grouping.elimination_rate(),
        stats.grouping.empty_files
    );

    (size_groups, stats)
}

/// Statistics from prehash phase.
#[derive(Debug, Clone, Default)]
pub struct PrehashStats {
    /// Total files that entered Phase 2
    pub input_files: usize,
    /// Number of files successfully hashed
    pub hashed_files: usize,
    /// Number of files that failed to hash (I/O errors)
    pub failed_files: usize,
    /// Errors encountered during prehash
    pub errors: Vec<HashError>,
    /// Number of files eliminated by a unique prehash
    pub unique_prehashes: usize,
    /// Number of files that could still be duplicates
    pub potential_duplicates: usize,
    /// Number of prehash groups with 2+ files
    pub duplicate_groups: usize,
    /// Whether phase was interrupted by shutdown
    pub interrupted: bool,
}

impl PrehashStats {
    /// Percentage of files eliminated by prehash comparison.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.input_files == 0 {
            0.0
        } else {
            let eliminated = self.input_files - self.potential_duplicates;
            (eliminated as f64 / self.input_files as f64) * 100.0
        }
    }
}

/// Group same-size files by the digest of their first 4KB (Phase 2).
///
/// Groups are keyed by `(size, prehash)`, so files of different sizes that
/// happen to share a header never keep each other alive. Only groups with
/// 2+ files are returned.
#[must_use]
pub fn phase2_prehash(
    size_groups: HashMap<u64, Vec<FileEntry>>,
    hasher: &Hasher,
    pool: &ThreadPool,
    config: &PhaseConfig,
) -> (HashMap<(u64, Hash), Vec<FileEntry>>, PrehashStats) {
    let all_files: Vec<FileEntry> = size_groups.into_values().flatten().collect();
    let mut stats = PrehashStats {
        input_files: all_files.len(),
        ..Default::default()
    };

    if all_files.is_empty() {
        log::debug!("Phase 2: No files to process");
        return (HashMap::new(), stats);
    }

    config.phase_start(PHASE_PREHASH, all_files.len());

    let results = fan_out(
        pool,
        all_files,
        config,
        entry_path,
        |f| hasher.prehash(&f.path),
    );
    let (hashed, interrupted) =
        collect_results(results, "Phase 2", &mut stats.failed_files, &mut stats.errors);
    stats.interrupted = interrupted || config.is_shutdown_requested();
    stats.hashed_files = hashed.len();

    let mut prehash_groups: HashMap<(u64, Hash), Vec<FileEntry>> = HashMap::new();
    for (file, prehash) in hashed {
        prehash_groups
            .entry((file.size, prehash))
            .or_default()
            .push(file);
    }

    prehash_groups.retain(|(_, hash), files| {
        if files.len() == 1 {
            stats.unique_prehashes += 1;
            log::trace!(
                "Eliminated unique prehash {}: {}",
                hash_to_hex(hash),
                files[0].path.display()
            );
            false
        } else {
            stats.potential_duplicates += files.len();
            stats.duplicate_groups += 1;
            true
        }
    });

    config.phase_end(PHASE_PREHASH);

    log::info!(
        "Phase 2 complete: {} files → {} potential duplicates ({:.1}% eliminated)",
        stats.input_files,
        stats.potential_duplicates,
        stats.elimination_rate()
    );

    (prehash_groups, stats)
}

/// Statistics from full hash phase.
#[derive(Debug, Clone, Default)]
pub struct FullhashStats {
    /// Total files that entered Phase 3
    pub input_files: usize,
    /// Number of files successfully hashed
    pub hashed_files: usize,
    /// Number of files that failed to hash (I/O errors)
    pub failed_files: usize,
    /// Errors encountered during full hash
    pub errors: Vec<HashError>,
    /// Total bytes hashed across all files
    pub bytes_hashed: u64,
    /// Number of files eliminated by a unique full hash
    pub unique_hashes: usize,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Whether phase was interrupted by shutdown
    pub interrupted: bool,
}

/// Confirm duplicates by hashing entire file contents (Phase 3).
///
/// Returns full-hash groups with 2+ files. Members of a group are
/// byte-identical up to SHA-256 collision; no further comparison is made.
#[must_use]
pub fn phase3_fullhash(
    prehash_groups: HashMap<(u64, Hash), Vec<FileEntry>>,
    hasher: &Hasher,
    pool: &ThreadPool,
    config: &PhaseConfig,
) -> (HashMap<Hash, Vec<FileEntry>>, FullhashStats) {
    let all_files: Vec<FileEntry> = prehash_groups.into_values().flatten().collect();
    let mut stats = FullhashStats {
        input_files: all_files.len(),
        ..Default::default()
    };

    if all_files.is_empty() {
        log::debug!("Phase 3: No files to process");
        return (HashMap::new(), stats);
    }

    config.phase_start(PHASE_FULLHASH, all_files.len());

    let results = fan_out(
        pool,
        all_files,
        config,
        entry_path,
        |f| {
            if f.size > LARGE_FILE_THRESHOLD {
                log::debug!(
                    "Hashing large file ({} MB): {}",
                    f.size / (1024 * 1024),
                    f.path.display()
                );
            }
            let hash = hasher.full_hash(&f.path)?;
            if let Some(ref callback) = config.progress_callback {
                callback.on_item_completed(f.size);
            }
            Ok(hash)
        },
    );
    let (hashed, interrupted) =
        collect_results(results, "Phase 3", &mut stats.failed_files, &mut stats.errors);
    stats.interrupted = interrupted || config.is_shutdown_requested();
    stats.hashed_files = hashed.len();

    let mut fullhash_groups: HashMap<Hash, Vec<FileEntry>> = HashMap::new();
    for (file, hash) in hashed {
        stats.bytes_hashed += file.size;
        fullhash_groups.entry(hash).or_default().push(file);
    }

    fullhash_groups.retain(|_, files| {
        if files.len() > 1 {
            stats.duplicate_groups += 1;
            true
        } else {
            stats.unique_hashes += 1;
            false
        }
    });

    config.phase_end(PHASE_FULLHASH);

    log::info!(
        "Phase 3 complete: {} files → {} duplicate groups ({} bytes hashed)",
        stats.input_files,
        stats.duplicate_groups,
        stats.bytes_hashed
    );

    (fullhash_groups, stats)
}

/// Build final duplicate groups (Phase 4).
///
/// Members are sorted and the first one is re-stat'ed for the group size.
/// When that fails the whole set is dropped and reported as
/// [`ScanError::Assembly`]. Groups are returned sorted by hash.
#[must_use]
pub fn phase4_assemble(
    fullhash_groups: HashMap<Hash, Vec<FileEntry>>,
) -> (Vec<DuplicateGroup>, Vec<ScanError>) {
    let mut groups = Vec::with_capacity(fullhash_groups.len());
    let mut errors = Vec::new();

    for (hash, files) in fullhash_groups {
        let mut paths: Vec<PathBuf> = files.into_iter().map(|f| f.path).collect();
        paths.sort();

        let Some(representative) = paths.first() else {
            continue;
        };

        match file_size(representative) {
            Ok(size) => {
                log::debug!(
                    "Duplicate group {}: {} files, {} bytes each",
                    hash_to_hex(&hash),
                    paths.len(),
                    size
                );
                groups.push(DuplicateGroup::new(hash, size, paths));
            }
            Err(source) => {
                log::warn!(
                    "Dropping duplicate set {}: representative unavailable: {}",
                    hash_to_hex(&hash),
                    source
                );
                errors.push(ScanError::Assembly {
                    hash: hash_to_hex(&hash),
                    source,
                });
            }
        }
    }

    groups.sort_by(|a, b| a.hash.cmp(&b.hash));
    (groups, errors)
}

// ============================================================================
// DuplicateFinder - Pipeline Orchestrator
// ============================================================================

/// Configuration for the duplicate finder.
#[derive(Clone, Default)]
pub struct FinderConfig {
    /// Number of worker threads for stat and hash phases.
    /// 0 lets rayon pick one per available CPU.
    pub io_threads: usize,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("io_threads", &self.io_threads)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl FinderConfig {
    /// Set the worker thread count (0 = automatic).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn phase_config(&self) -> PhaseConfig {
        PhaseConfig {
            shutdown_flag: self.shutdown_flag.clone(),
            progress_callback: self.progress_callback.clone(),
        }
    }
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    /// Scan roots after normalization
    pub scan_roots: Vec<PathBuf>,
    /// Exclude roots after normalization
    pub exclude_roots: Vec<PathBuf>,
    /// Number of files discovered by the walker
    pub total_files: usize,
    /// Total size of all files that could be stat'ed
    pub total_size: u64,
    /// Zero-byte files skipped by policy
    pub empty_files: usize,
    /// Files eliminated by size grouping (unique sizes)
    pub eliminated_by_size: usize,
    /// Files eliminated by prehash (different first 4KB)
    pub eliminated_by_prehash: usize,
    /// Files eliminated by full hash
    pub eliminated_by_fullhash: usize,
    /// Confirmed sets dropped during assembly
    pub dropped_sets: usize,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Total number of redundant copies (one member per group is kept)
    pub duplicate_files: usize,
    /// Total space that can be reclaimed by removing duplicates
    pub reclaimable_space: u64,
    /// Duration of the entire scan
    pub scan_duration: Duration,
    /// Per-file and per-set errors; none of them aborted the scan
    pub scan_errors: Vec<ScanError>,
}

impl ScanSummary {
    /// Whether any file or set was dropped because of an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.scan_errors.is_empty()
    }

    /// Percentage of scanned bytes taken up by redundant copies.
    #[must_use]
    pub fn wasted_percentage(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            (self.reclaimable_space as f64 / self.total_size as f64) * 100.0
        }
    }

    /// Format reclaimable space as human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        bytesize::ByteSize::b(self.reclaimable_space).to_string()
    }

    /// Format total size as human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        bytesize::ByteSize::b(self.total_size).to_string()
    }
}

/// Errors that can abort a duplicate scan.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// None of the scan roots resolves to an existing directory.
    #[error("No valid scan roots: none of the given paths is an existing directory")]
    NoValidRoots,

    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// The worker pool could not be created.
    #[error("Failed to create worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Duplicate finder that orchestrates the multi-phase detection pipeline.
///
/// The finder holds no state between scans: every call builds its own worker
/// pool and returns owned results.
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Hasher,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let mut hasher = Hasher::new();
        if let Some(ref flag) = config.shutdown_flag {
            hasher = hasher.with_shutdown_flag(Arc::clone(flag));
        }
        Self { config, hasher }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    fn is_shutdown_requested(&self) -> bool {
        self.config
            .shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    fn check_shutdown(&self) -> Result<(), FinderError> {
        if self.is_shutdown_requested() {
            log::info!("Scan interrupted by shutdown signal");
            Err(FinderError::Interrupted)
        } else {
            Ok(())
        }
    }

    /// Find duplicate files under the scan roots, skipping exclude roots.
    ///
    /// Roots are normalized first (see
    /// [`normalize_roots`](crate::scanner::path_utils::normalize_roots)).
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if:
    /// - No scan root is an existing directory (no phase runs)
    /// - The scan is interrupted by shutdown signal
    /// - The worker pool cannot be created
    pub fn find_duplicates<S, E>(
        &self,
        scan_roots: &[S],
        exclude_roots: &[E],
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError>
    where
        S: AsRef<Path>,
        E: AsRef<Path>,
    {
        let roots = normalize_roots(scan_roots, exclude_roots);
        self.find_duplicates_in(&roots)
    }

    /// Find duplicate files under already normalized roots.
    ///
    /// # Errors
    ///
    /// Same as [`DuplicateFinder::find_duplicates`].
    pub fn find_duplicates_in(
        &self,
        roots: &NormalizedRoots,
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        let start_time = Instant::now();

        if !roots.has_scan_roots() {
            log::error!("No valid directories to scan after path normalization");
            return Err(FinderError::NoValidRoots);
        }
        self.check_shutdown()?;

        let mut summary = ScanSummary {
            scan_roots: roots.scan_roots.clone(),
            exclude_roots: roots.exclude_roots.clone(),
            ..Default::default()
        };

        log::info!(
            "Scanning {} root(s): {:?}, excluding {:?}",
            roots.scan_roots.len(),
            roots.scan_roots.iter().map(|p| p.display()).collect::<Vec<_>>(),
            roots
                .exclude_roots
                .iter()
                .map(|p| p.display())
                .collect::<Vec<_>>()
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.io_threads)
            .thread_name(|i| format!("dupescan-io-{i}"))
            .build()?;
        let phase_config = self.config.phase_config();

        // Stage 0: discovery
        log::info!("Stage 0: Discovering and filtering files...");
        phase_config.phase_start(PHASE_WALKING, 0);

        let mut walker = Walker::new(
            &roots.scan_roots,
            WalkerConfig::new(roots.exclude_roots.clone()),
        );
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(Arc::clone(flag));
        }

        let mut paths = Vec::new();
        for result in walker.walk() {
            match result {
                Ok(path) => {
                    if let Some(ref callback) = self.config.progress_callback {
                        callback.on_progress(paths.len() + 1, path.to_string_lossy().as_ref());
                    }
                    paths.push(path);
                }
                Err(e) => summary.scan_errors.push(e),
            }
        }
        phase_config.phase_end(PHASE_WALKING);
        self.check_shutdown()?;

        summary.total_files = paths.len();
        log::info!("Found {} files", summary.total_files);

        // Stage 1: size indexing
        log::info!("Stage 1: Indexing files by size...");
        let (size_groups, size_stats) = phase1_size(paths, &pool, &phase_config);
        summary.total_size = size_stats.total_size;
        summary.empty_files = size_stats.grouping.empty_files;
        summary.eliminated_by_size = size_stats.grouping.eliminated_unique;
        summary
            .scan_errors
            .extend(size_stats.errors.into_iter().map(ScanError::from));
        if size_stats.interrupted {
            return Err(FinderError::Interrupted);
        }
        self.check_shutdown()?;

        // Stage 2: partial hashing
        log::info!("Stage 2: Performing partial hash check...");
        let (prehash_groups, prehash_stats) =
            phase2_prehash(size_groups, &self.hasher, &pool, &phase_config);
        summary.eliminated_by_prehash = prehash_stats.unique_prehashes;
        summary
            .scan_errors
            .extend(prehash_stats.errors.into_iter().map(ScanError::from));
        if prehash_stats.interrupted {
            return Err(FinderError::Interrupted);
        }
        self.check_shutdown()?;

        // Stage 3: full hashing
        log::info!("Stage 3: Performing full hash on remaining candidates...");
        let (fullhash_groups, fullhash_stats) =
            phase3_fullhash(prehash_groups, &self.hasher, &pool, &phase_config);
        summary.eliminated_by_fullhash = fullhash_stats.unique_hashes;
        summary
            .scan_errors
            .extend(fullhash_stats.errors.into_iter().map(ScanError::from));
        if fullhash_stats.interrupted {
            return Err(FinderError::Interrupted);
        }
        self.check_shutdown()?;

        // Stage 4: assembly
        let (groups, assembly_errors) = phase4_assemble(fullhash_groups);
        summary.dropped_sets = assembly_errors.len();
        summary.scan_errors.extend(assembly_errors);

        summary.duplicate_groups = groups.len();
        summary.duplicate_files = groups.iter().map(DuplicateGroup::duplicate_count).sum();
        summary.reclaimable_space = groups.iter().map(DuplicateGroup::wasted_space).sum();
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Scan complete. Found {} sets of duplicates ({} reclaimable, {} errors).",
            summary.duplicate_groups,
            summary.reclaimable_display(),
            summary.scan_errors.len()
        );

        Ok((groups, summary))
    }
}
