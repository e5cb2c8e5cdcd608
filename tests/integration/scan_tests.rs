use dupescan::duplicates::{DuplicateFinder, FinderConfig};
use dupescan::progress::{ProgressCallback, PHASE_FULLHASH, PHASE_PREHASH};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

const NO_EXCLUDES: &[PathBuf] = &[];

fn write(path: &Path, content: &[u8]) {
    File::create(path).unwrap().write_all(content).unwrap();
}

fn file_names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

/// Remembers which files each phase touched.
#[derive(Default)]
struct PhaseRecorder {
    current: Mutex<String>,
    touched: Mutex<Vec<(String, String)>>,
}

impl PhaseRecorder {
    fn paths_in(&self, phase: &str) -> Vec<String> {
        self.touched
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| p == phase)
            .map(|(_, path)| path.clone())
            .collect()
    }
}

impl ProgressCallback for PhaseRecorder {
    fn on_phase_start(&self, phase: &str, _total: usize) {
        *self.current.lock().unwrap() = phase.to_string();
    }

    fn on_progress(&self, _current: usize, path: &str) {
        let phase = self.current.lock().unwrap().clone();
        self.touched.lock().unwrap().push((phase, path.to_string()));
    }

    fn on_phase_end(&self, _phase: &str) {}
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let finder = DuplicateFinder::with_defaults();

    let (groups, summary) = finder.find_duplicates(&[dir.path()], NO_EXCLUDES).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.duplicate_groups, 0);
    assert!(!summary.has_errors());
}

#[test]
fn test_scan_unique_files() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"content a");
    write(&dir.path().join("b.txt"), b"content b");
    write(&dir.path().join("c.txt"), b"content c");

    let finder = DuplicateFinder::with_defaults();
    let (groups, summary) = finder.find_duplicates(&[dir.path()], NO_EXCLUDES).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.eliminated_by_prehash, 3);
}

#[test]
fn test_scan_hello_world() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("x.txt"), b"hello");
    write(&dir.path().join("y.txt"), b"hello");
    write(&dir.path().join("z.txt"), b"world");

    let duplicates = dupescan::find_duplicates(&[dir.path()], NO_EXCLUDES).unwrap();

    assert_eq!(duplicates.len(), 1);
    let (hash, group) = duplicates.iter().next().unwrap();
    assert_eq!(
        hash,
        "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
    );
    assert_eq!(group.size, 5);
    assert_eq!(file_names(&group.paths), vec!["x.txt", "y.txt"]);
}

#[test]
fn test_scan_reports_nested_duplicates_with_absolute_paths() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("a").join("b");
    fs::create_dir_all(&nested).unwrap();
    write(&dir.path().join("top.bin"), &[42u8; 9000]);
    write(&nested.join("deep.bin"), &[42u8; 9000]);

    let finder = DuplicateFinder::with_defaults();
    let (groups, _) = finder.find_duplicates(&[dir.path()], NO_EXCLUDES).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].size, 9000);
    assert!(groups[0].paths.iter().all(|p| p.is_absolute()));
}

#[test]
fn test_scan_members_are_byte_identical() {
    let dir = tempdir().unwrap();
    for i in 0..4 {
        write(&dir.path().join(format!("same{i}.bin")), &[7u8; 70_000]);
    }
    let mut near = vec![7u8; 70_000];
    near[69_999] = 8;
    write(&dir.path().join("near.bin"), &near);

    let finder = DuplicateFinder::new(FinderConfig::default().with_io_threads(3));
    let (groups, summary) = finder.find_duplicates(&[dir.path()], NO_EXCLUDES).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 4);
    assert_eq!(summary.eliminated_by_fullhash, 1);
    assert_eq!(summary.reclaimable_space, 3 * 70_000);

    let first = fs::read(&groups[0].paths[0]).unwrap();
    for path in &groups[0].paths[1..] {
        assert_eq!(fs::read(path).unwrap(), first);
    }
}

#[test]
fn test_scan_never_reports_empty_files() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("e1"), b"");
    write(&dir.path().join("e2"), b"");
    write(&dir.path().join("e3"), b"");

    let finder = DuplicateFinder::with_defaults();
    let (groups, summary) = finder.find_duplicates(&[dir.path()], NO_EXCLUDES).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.empty_files, 3);
}

#[test]
fn test_different_prefix_never_reaches_full_hash() {
    let dir = tempdir().unwrap();
    let mut a = vec![0u8; 8192];
    let mut b = vec![0u8; 8192];
    a[0] = 1;
    b[0] = 2;
    write(&dir.path().join("a.bin"), &a);
    write(&dir.path().join("b.bin"), &b);

    let recorder = Arc::new(PhaseRecorder::default());
    let finder =
        DuplicateFinder::new(FinderConfig::default().with_progress_callback(recorder.clone()));
    let (groups, summary) = finder.find_duplicates(&[dir.path()], NO_EXCLUDES).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.eliminated_by_prehash, 2);
    assert_eq!(recorder.paths_in(PHASE_PREHASH).len(), 2);
    assert!(recorder.paths_in(PHASE_FULLHASH).is_empty());
}

#[test]
fn test_scan_is_idempotent() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"same bytes");
    write(&dir.path().join("b.txt"), b"same bytes");
    write(&dir.path().join("c.txt"), b"other bytes");
    fs::create_dir(dir.path().join("sub")).unwrap();
    write(&dir.path().join("sub").join("d.txt"), b"same bytes");

    let first = dupescan::find_duplicates(&[dir.path()], NO_EXCLUDES).unwrap();
    let second = dupescan::find_duplicates(&[dir.path()], NO_EXCLUDES).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.values().next().unwrap().len(), 3);
}

#[test]
fn test_scan_accepts_relative_root() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"dup");
    write(&dir.path().join("b.txt"), b"dup");

    let cwd = std::env::current_dir().unwrap();
    let relative = pathdiff(dir.path(), &cwd);

    let duplicates = dupescan::find_duplicates(&[relative], NO_EXCLUDES).unwrap();
    assert_eq!(duplicates.len(), 1);
    assert!(duplicates
        .values()
        .all(|g| g.paths.iter().all(|p| p.is_absolute())));
}

/// Relative path from `base` to `target` built from `..` components.
fn pathdiff(target: &Path, base: &Path) -> PathBuf {
    let target = fs::canonicalize(target).unwrap();
    let base = fs::canonicalize(base).unwrap();
    let common = target
        .components()
        .zip(base.components())
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in base.components().skip(common) {
        relative.push("..");
    }
    for component in target.components().skip(common) {
        relative.push(component);
    }
    relative
}
