//! Directory walker built on walkdir.
//!
//! # Overview
//!
//! [`Walker`] enumerates regular files under a set of normalized scan roots.
//! Traversal is sequential and deterministic (entries sorted by file name).
//!
//! # Features
//!
//! - Excluded directories are pruned before they are descended into
//! - Symbolic links are never followed and never yielded
//! - Unreadable entries are yielded as [`ScanError`] values, not fatal errors
//! - Graceful shutdown via atomic flag
//!
//! # Example
//!
//! ```no_run
//! use dupescan::scanner::{Walker, WalkerConfig};
//! use std::path::PathBuf;
//!
//! let roots = vec![PathBuf::from("/home/user/Downloads")];
//! let walker = Walker::new(&roots, WalkerConfig::default());
//! let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
//! println!("Found {} files", files.len());
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use walkdir::WalkDir;

use super::{ScanError, WalkerConfig};

/// Sequential directory walker over one or more roots.
#[derive(Debug)]
pub struct Walker {
    /// Canonical roots to walk, already collapsed
    roots: Vec<PathBuf>,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Walker {
    /// Create a walker over the given roots.
    ///
    /// Roots are expected to come from
    /// [`normalize_roots`](super::path_utils::normalize_roots).
    #[must_use]
    pub fn new(roots: &[PathBuf], config: WalkerConfig) -> Self {
        Self {
            roots: roots.to_vec(),
            config,
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set to `true`, the walker stops yielding entries.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// The roots this walker visits.
    #[must_use]
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Walk every root, yielding paths of regular files.
    ///
    /// Errors are yielded as [`ScanError`] values rather than stopping
    /// iteration.
    pub fn walk(&self) -> impl Iterator<Item = Result<PathBuf, ScanError>> + '_ {
        self.roots
            .iter()
            .flat_map(move |root| self.walk_root(root))
            .take_while(move |_| {
                if self.is_shutdown_requested() {
                    log::debug!("Walker: Shutdown requested, stopping iteration");
                    false
                } else {
                    true
                }
            })
    }

    fn walk_root<'a>(
        &'a self,
        root: &'a Path,
    ) -> impl Iterator<Item = Result<PathBuf, ScanError>> + 'a {
        WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| {
                if entry.file_type().is_dir() && self.config.is_excluded(entry.path()) {
                    log::trace!("Pruning excluded directory: {}", entry.path().display());
                    return false;
                }
                true
            })
            .filter_map(move |entry_result| match entry_result {
                Ok(entry) => {
                    let file_type = entry.file_type();
                    if file_type.is_symlink() {
                        log::trace!("Skipping symlink: {}", entry.path().display());
                        return None;
                    }
                    if !file_type.is_file() {
                        return None;
                    }
                    Some(Ok(entry.into_path()))
                }
                Err(e) => Some(Err(Self::convert_error(root, e))),
            })
    }

    /// Convert a walkdir error to a [`ScanError`].
    fn convert_error(root: &Path, error: walkdir::Error) -> ScanError {
        let path = error.path().map_or_else(|| root.to_path_buf(), Path::to_path_buf);
        let scan_error = match error.into_io_error() {
            Some(io_error) => ScanError::from_io(&path, io_error),
            None => ScanError::Io {
                path: path.clone(),
                source: Arc::new(std::io::Error::other("filesystem loop detected")),
            },
        };
        match &scan_error {
            ScanError::NotFound(_) => {
                log::debug!("Entry vanished during walk: {}", path.display());
            }
            other => log::warn!("Walker error: {}", other),
        }
        scan_error
    }
}
