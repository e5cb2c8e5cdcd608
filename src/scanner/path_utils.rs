//! Root path normalization.
//!
//! Turns the raw scan and exclude arguments into canonical, deduplicated
//! roots before any traversal starts:
//!
//! - every root is made absolute, `.`/`..` segments are resolved and the
//!   result is canonicalized on disk; roots that do not resolve are dropped
//! - exclude roots that equal a scan root are discarded
//! - scan roots nested inside another scan root are collapsed into the
//!   outermost one, so no file is visited twice
//!
//! Roots are compared as canonical paths, byte for byte. Two directories
//! whose names differ only in Unicode normalization form are distinct on
//! most filesystems and are both kept.
//!
//! # Example
//!
//! ```no_run
//! use dupescan::scanner::path_utils::normalize_roots;
//!
//! let roots = normalize_roots(&["/data", "/data/photos"], &["/data/tmp"]);
//! assert_eq!(roots.scan_roots.len(), 1);
//! ```

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use unicode_normalization::UnicodeNormalization;

/// Canonical scan and exclude roots for one scan invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedRoots {
    /// Outermost canonical directories to scan, sorted.
    pub scan_roots: Vec<PathBuf>,
    /// Canonical directories to skip, sorted and deduplicated.
    pub exclude_roots: Vec<PathBuf>,
}

impl NormalizedRoots {
    /// Whether at least one scan root survived normalization.
    #[must_use]
    pub fn has_scan_roots(&self) -> bool {
        !self.scan_roots.is_empty()
    }
}

/// Normalize a string to NFC (Composed) form.
#[must_use]
pub fn normalize_path_str(s: &str) -> String {
    s.nfc().collect()
}

/// Resolve `.` and `..` components without touching the filesystem.
///
/// `..` at the root stays at the root.
#[must_use]
pub fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                // Relative path escaping its start; keep the marker.
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Check whether `path` is `root` or lies beneath it.
///
/// The test works on whole path components, so `/a/bc` is not inside `/a/b`.
/// Comparison is case-insensitive on Windows.
#[must_use]
pub fn is_within(path: &Path, root: &Path) -> bool {
    if cfg!(windows) {
        let p = PathBuf::from(path.to_string_lossy().to_lowercase());
        let r = PathBuf::from(root.to_string_lossy().to_lowercase());
        p.starts_with(r)
    } else {
        path.starts_with(root)
    }
}

/// Canonicalize a single root argument.
///
/// Returns `None` when the path is empty or does not resolve on disk; callers
/// treat such roots as absent.
#[must_use]
pub fn normalize_root<P: AsRef<Path>>(raw: P) -> Option<PathBuf> {
    let raw = raw.as_ref();
    if raw.as_os_str().is_empty() {
        return None;
    }

    let absolute = match std::path::absolute(raw) {
        Ok(p) => lexical_normalize(&p),
        Err(e) => {
            log::debug!("Cannot make {} absolute: {}", raw.display(), e);
            return None;
        }
    };

    match std::fs::canonicalize(&absolute) {
        Ok(canonical) => Some(canonical),
        Err(e) => {
            log::debug!("Cannot resolve {}: {}", absolute.display(), e);
            None
        }
    }
}

/// Canonicalize, deduplicate and collapse scan and exclude roots.
///
/// Scan roots that do not resolve to an existing directory are dropped with a
/// warning. The result may have no scan roots; the finder treats that as a
/// configuration error.
#[must_use]
pub fn normalize_roots<S, E>(scan: &[S], exclude: &[E]) -> NormalizedRoots
where
    S: AsRef<Path>,
    E: AsRef<Path>,
{
    let mut scan_set: BTreeSet<PathBuf> = BTreeSet::new();

    for raw in scan {
        let raw = raw.as_ref();
        match normalize_root(raw) {
            Some(root) if root.is_dir() => {
                scan_set.insert(root);
            }
            Some(root) => log::warn!("Not a directory, skipping: {}", root.display()),
            None => log::warn!("Path not found, skipping: {}", raw.display()),
        }
    }

    let mut exclude_set: BTreeSet<PathBuf> = BTreeSet::new();
    for raw in exclude {
        let raw = raw.as_ref();
        let Some(root) = normalize_root(raw) else {
            log::debug!("Exclude root does not resolve, ignoring: {}", raw.display());
            continue;
        };
        if scan_set.contains(&root) {
            log::info!(
                "Ignoring exclude {} because it is also a scan root",
                root.display()
            );
            continue;
        }
        exclude_set.insert(root);
    }

    // BTreeSet order puts every ancestor before its descendants.
    let mut scan_roots: Vec<PathBuf> = Vec::with_capacity(scan_set.len());
    for root in scan_set {
        if let Some(parent) = scan_roots.iter().find(|kept| is_within(&root, kept)) {
            log::debug!(
                "Collapsing {} into already scanned root {}",
                root.display(),
                parent.display()
            );
            continue;
        }
        scan_roots.push(root);
    }

    NormalizedRoots {
        scan_roots,
        exclude_roots: exclude_set.into_iter().collect(),
    }
}
