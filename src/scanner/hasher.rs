//! SHA-256 file hasher with prefix and streaming modes.
//!
//! # Overview
//!
//! [`Hasher::prehash`] digests only the first [`PREHASH_SIZE`] bytes of a file
//! and is used as a cheap filter. [`Hasher::full_hash`] streams the whole file
//! in [`FULL_HASH_CHUNK_SIZE`] blocks and is the authoritative equality proof.
//!
//! # Example
//!
//! ```no_run
//! use dupescan::scanner::{hash_to_hex, Hasher};
//! use std::path::Path;
//!
//! let hasher = Hasher::new();
//! let hash = hasher.full_hash(Path::new("Cargo.toml")).unwrap();
//! println!("{}", hash_to_hex(&hash));
//! ```

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use sha2::{Digest, Sha256};

use super::HashError;

/// A SHA-256 digest.
pub type Hash = [u8; 32];

/// Number of leading bytes digested by [`Hasher::prehash`].
pub const PREHASH_SIZE: usize = 4096;

/// Read block size used by [`Hasher::full_hash`].
pub const FULL_HASH_CHUNK_SIZE: usize = 65536;

/// Computes partial and full SHA-256 digests of files.
///
/// The hasher holds no per-file state and can be shared across worker threads.
#[derive(Debug, Clone, Default)]
pub struct Hasher {
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Hasher {
    /// Create a new hasher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort in-progress full hashes when the flag is set.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Digest the first [`PREHASH_SIZE`] bytes of a file.
    ///
    /// Files shorter than the prefix are digested in full.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or read.
    pub fn prehash(&self, path: &Path) -> Result<Hash, HashError> {
        let mut file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        let mut buffer = [0u8; PREHASH_SIZE];
        let mut filled = 0;

        // A single read may return fewer bytes than available.
        while filled < PREHASH_SIZE {
            match file.read(&mut buffer[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(HashError::from_io(path, e)),
            }
        }

        Ok(Sha256::digest(&buffer[..filled]).into())
    }

    /// Digest the entire content of a file.
    ///
    /// The shutdown flag is checked between blocks; the file handle is
    /// released as soon as cancellation is observed.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be read, or
    /// [`HashError::Interrupted`] if shutdown was requested mid-file.
    pub fn full_hash(&self, path: &Path) -> Result<Hash, HashError> {
        let mut file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        let mut hasher = Sha256::new();
        let mut buffer = vec![0u8; FULL_HASH_CHUNK_SIZE];

        loop {
            if self.is_shutdown_requested() {
                return Err(HashError::Interrupted(path.to_path_buf()));
            }
            match file.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => hasher.update(&buffer[..n]),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(HashError::from_io(path, e)),
            }
        }

        Ok(hasher.finalize().into())
    }
}

/// Format a digest as lowercase hexadecimal.
#[must_use]
pub fn hash_to_hex(hash: &Hash) -> String {
    hash.iter().map(|b| format!("{b:02x}")).collect()
}
