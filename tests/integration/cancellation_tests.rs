use dupescan::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use dupescan::progress::{ProgressCallback, PHASE_PREHASH};
use dupescan::signal::ShutdownHandler;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tempfile::tempdir;

const NO_EXCLUDES: &[PathBuf] = &[];

/// Sets the shutdown flag as soon as a given phase starts.
struct CancelOnPhase {
    phase: &'static str,
    flag: Arc<AtomicBool>,
}

impl ProgressCallback for CancelOnPhase {
    fn on_phase_start(&self, phase: &str, _total: usize) {
        if phase == self.phase {
            self.flag.store(true, Ordering::SeqCst);
        }
    }

    fn on_progress(&self, _current: usize, _path: &str) {}

    fn on_phase_end(&self, _phase: &str) {}
}

fn populated_dir() -> tempfile::TempDir {
    let dir = tempdir().unwrap();
    for i in 0..20 {
        fs::write(dir.path().join(format!("dup{i}.bin")), [1u8; 10_000]).unwrap();
    }
    dir
}

#[test]
fn test_cancel_before_scan() {
    let dir = populated_dir();
    let handler = ShutdownHandler::new();
    handler.request_shutdown();

    let finder = DuplicateFinder::new(FinderConfig::default().with_shutdown_flag(handler.get_flag()));
    let result = finder.find_duplicates(&[dir.path()], NO_EXCLUDES);

    assert!(matches!(result, Err(FinderError::Interrupted)));
}

#[test]
fn test_cancel_during_prehash_discards_results() {
    let dir = populated_dir();
    let flag = Arc::new(AtomicBool::new(false));
    let callback = Arc::new(CancelOnPhase {
        phase: PHASE_PREHASH,
        flag: Arc::clone(&flag),
    });

    let finder = DuplicateFinder::new(
        FinderConfig::default()
            .with_shutdown_flag(Arc::clone(&flag))
            .with_progress_callback(callback),
    );
    let result = finder.find_duplicates(&[dir.path()], NO_EXCLUDES);

    assert!(matches!(result, Err(FinderError::Interrupted)));
}

#[test]
fn test_finder_reusable_after_reset() {
    let dir = populated_dir();
    let handler = ShutdownHandler::new();
    let finder = DuplicateFinder::new(FinderConfig::default().with_shutdown_flag(handler.get_flag()));

    handler.request_shutdown();
    assert!(finder.find_duplicates(&[dir.path()], NO_EXCLUDES).is_err());

    handler.reset();
    let (groups, _) = finder.find_duplicates(&[dir.path()], NO_EXCLUDES).unwrap();
    assert_eq!(groups[0].len(), 20);
}
