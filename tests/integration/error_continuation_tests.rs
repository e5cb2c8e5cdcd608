use dupescan::duplicates::{
    phase1_size, phase4_assemble, DuplicateFinder, FinderError, PhaseConfig,
};
use dupescan::scanner::{FileEntry, HashError, ScanError};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

const NO_EXCLUDES: &[PathBuf] = &[];

fn pool() -> rayon::ThreadPool {
    rayon::ThreadPoolBuilder::new()
        .num_threads(2)
        .build()
        .unwrap()
}

#[test]
fn test_only_missing_roots_is_configuration_error() {
    let result = DuplicateFinder::with_defaults().find_duplicates(
        &["/nonexistent/dupescan/a", "/nonexistent/dupescan/b"],
        NO_EXCLUDES,
    );

    assert!(matches!(result, Err(FinderError::NoValidRoots)));
}

#[test]
fn test_no_roots_at_all_is_configuration_error() {
    let result = dupescan::find_duplicates(NO_EXCLUDES, NO_EXCLUDES);
    assert!(matches!(result, Err(FinderError::NoValidRoots)));
}

#[test]
fn test_file_as_only_root_is_configuration_error() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("file.txt");
    fs::write(&file, b"content").unwrap();

    let result = dupescan::find_duplicates(&[file], NO_EXCLUDES);
    assert!(matches!(result, Err(FinderError::NoValidRoots)));
}

#[test]
fn test_vanished_files_are_dropped_and_counted() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    fs::write(&a, b"same").unwrap();
    fs::write(&b, b"same").unwrap();

    let (groups, stats) = phase1_size(
        vec![a, b, dir.path().join("vanished.txt")],
        &pool(),
        &PhaseConfig::default(),
    );

    assert_eq!(groups[&4].len(), 2);
    assert_eq!(stats.failed_files, 1);
    assert!(matches!(stats.errors[0], HashError::NotFound(_)));
}

#[test]
fn test_set_with_vanished_representative_is_dropped() {
    let dir = tempdir().unwrap();
    let survivor = dir.path().join("b.txt");
    fs::write(&survivor, b"data").unwrap();

    let mut confirmed = HashMap::new();
    confirmed.insert(
        [9u8; 32],
        vec![
            FileEntry::new(survivor, 4),
            FileEntry::new(dir.path().join("a.txt"), 4),
        ],
    );

    let (groups, errors) = phase4_assemble(confirmed);

    assert!(groups.is_empty());
    match &errors[..] {
        [ScanError::Assembly { hash, source }] => {
            assert_eq!(hash, &"09".repeat(32));
            assert!(matches!(source, HashError::NotFound(_)));
        }
        other => panic!("Expected one assembly error, got: {other:?}"),
    }
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_does_not_abort_scan() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"dup").unwrap();
    fs::write(dir.path().join("b.txt"), b"dup").unwrap();
    let locked = dir.path().join("locked.txt");
    fs::write(&locked, b"dup").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Root ignores permission bits; nothing to observe then.
    if fs::read(&locked).is_ok() {
        return;
    }

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(&[dir.path()], NO_EXCLUDES)
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
    assert!(summary.has_errors());
    assert!(summary
        .scan_errors
        .iter()
        .any(|e| matches!(e, ScanError::Hash(HashError::PermissionDenied(_)))));

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();
}

#[cfg(unix)]
#[test]
fn test_unreadable_directory_is_reported_and_skipped() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"dup").unwrap();
    fs::write(dir.path().join("b.txt"), b"dup").unwrap();
    let closed = dir.path().join("closed");
    fs::create_dir(&closed).unwrap();
    fs::write(closed.join("c.txt"), b"dup").unwrap();
    fs::set_permissions(&closed, fs::Permissions::from_mode(0o000)).unwrap();

    if fs::read_dir(&closed).is_ok() {
        fs::set_permissions(&closed, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(&[dir.path()], NO_EXCLUDES)
        .unwrap();

    fs::set_permissions(&closed, fs::Permissions::from_mode(0o755)).unwrap();

    assert_eq!(groups[0].len(), 2);
    assert!(summary
        .scan_errors
        .iter()
        .any(|e| matches!(e, ScanError::PermissionDenied(_))));
}
