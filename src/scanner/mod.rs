//! Scanner module for root normalization, directory traversal and file hashing.
//!
//! This module provides functionality for:
//! - Canonicalizing and collapsing scan/exclude roots
//! - Sequential directory walking with exclude pruning
//! - Content hashing with SHA-256 (partial and full)
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`path_utils`]: Root normalization and boundary-aware path prefix tests
//! - [`walker`]: Directory traversal and file discovery
//! - [`hasher`]: SHA-256 file hashing (prefix and streaming)
//!
//! # Example
//!
//! ```no_run
//! use dupescan::scanner::{normalize_roots, Walker, WalkerConfig};
//!
//! let roots = normalize_roots(&["."], &["./target"]);
//! let walker = Walker::new(&roots.scan_roots, WalkerConfig::new(roots.exclude_roots.clone()));
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(path) => println!("{}", path.display()),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod hasher;
pub mod path_utils;
pub mod walker;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

// Re-export main types
pub use hasher::{hash_to_hex, Hash, Hasher, FULL_HASH_CHUNK_SIZE, PREHASH_SIZE};
pub use path_utils::{is_within, normalize_root, normalize_roots, NormalizedRoots};
pub use walker::Walker;

/// A candidate file with its size.
///
/// Produced by the size indexing stage from paths yielded by the [`Walker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Absolute path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

impl FileEntry {
    /// Create a new FileEntry.
    #[must_use]
    pub fn new(path: PathBuf, size: u64) -> Self {
        Self { path, size }
    }
}

/// Configuration for directory walking.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Canonical directories whose contents are never visited.
    pub exclude_roots: Vec<PathBuf>,
}

impl WalkerConfig {
    /// Create a configuration that prunes the given exclude roots.
    #[must_use]
    pub fn new(exclude_roots: Vec<PathBuf>) -> Self {
        Self { exclude_roots }
    }

    /// Check whether a directory lies under one of the exclude roots.
    #[must_use]
    pub fn is_excluded(&self, path: &Path) -> bool {
        self.exclude_roots.iter().any(|root| is_within(path, root))
    }
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug, Clone)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: Arc<io::Error>,
    },

    /// A file could not be stat'ed or hashed.
    #[error(transparent)]
    Hash(#[from] HashError),

    /// A confirmed duplicate set was dropped because its representative vanished.
    #[error("Dropped duplicate set {hash}: {source}")]
    Assembly {
        /// Full-content hash of the dropped set (hex)
        hash: String,
        /// Failure reading the representative member
        #[source]
        source: HashError,
    },
}

impl ScanError {
    /// Classify an I/O error raised while walking `path`.
    #[must_use]
    pub fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: Arc::new(error),
            },
        }
    }
}

/// Errors that can occur while stat'ing or hashing a single file.
#[derive(thiserror::Error, Debug, Clone)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The path no longer refers to a regular file.
    #[error("Not a regular file: {0}")]
    NotAFile(PathBuf),

    /// Hashing was abandoned because shutdown was requested.
    #[error("Interrupted while reading {0}")]
    Interrupted(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: Arc<io::Error>,
    },
}

impl HashError {
    /// Classify an I/O error raised while reading `path`.
    #[must_use]
    pub fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: Arc::new(error),
            },
        }
    }

    /// The file this error refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p) | Self::PermissionDenied(p) | Self::NotAFile(p) => p,
            Self::Interrupted(p) => p,
            Self::Io { path, .. } => path,
        }
    }

    /// Whether this error was caused by cancellation rather than file access.
    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted(_))
    }
}

/// Read the byte size of a regular file without following symlinks.
///
/// # Errors
///
/// Returns [`HashError`] if the file cannot be stat'ed or is not a regular file.
pub fn file_size(path: &Path) -> Result<u64, HashError> {
    let metadata = std::fs::symlink_metadata(path).map_err(|e| HashError::from_io(path, e))?;
    if !metadata.is_file() {
        return Err(HashError::NotAFile(path.to_path_buf()));
    }
    Ok(metadata.len())
}
