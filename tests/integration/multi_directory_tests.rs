use dupescan::duplicates::DuplicateFinder;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

const NO_EXCLUDES: &[PathBuf] = &[];

#[test]
fn test_duplicates_across_roots() {
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    fs::write(first.path().join("photo.jpg"), b"jpeg bytes").unwrap();
    fs::write(second.path().join("backup.jpg"), b"jpeg bytes").unwrap();
    fs::write(second.path().join("other.jpg"), b"different!").unwrap();

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(&[first.path(), second.path()], NO_EXCLUDES)
        .unwrap();

    assert_eq!(summary.scan_roots.len(), 2);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
}

#[test]
fn test_nested_roots_collapse_to_ancestor() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("b");
    fs::create_dir(&nested).unwrap();
    fs::write(dir.path().join("one.txt"), b"twin").unwrap();
    fs::write(nested.join("two.txt"), b"twin").unwrap();

    let finder = DuplicateFinder::with_defaults();
    let (collapsed, summary) = finder
        .find_duplicates(&[dir.path(), nested.as_path()], NO_EXCLUDES)
        .unwrap();
    let (single, _) = finder.find_duplicates(&[dir.path()], NO_EXCLUDES).unwrap();

    assert_eq!(summary.scan_roots.len(), 1);
    assert_eq!(summary.total_files, 2);
    assert_eq!(collapsed, single);
    assert_eq!(collapsed[0].len(), 2);
}

#[test]
fn test_duplicate_roots_walk_once() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"only one").unwrap();
    let spelled_differently = dir.path().join(".");

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(&[dir.path(), spelled_differently.as_path()], NO_EXCLUDES)
        .unwrap();

    assert_eq!(summary.total_files, 1);
    assert!(groups.is_empty());
}

#[test]
fn test_invalid_roots_are_skipped_when_one_is_valid() {
    let dir = tempdir().unwrap();
    let file_root = dir.path().join("not_a_dir.txt");
    fs::write(&file_root, b"x").unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir(&sub).unwrap();
    fs::write(sub.join("a"), b"dup").unwrap();
    fs::write(sub.join("b"), b"dup").unwrap();

    let roots = vec![
        PathBuf::from("/nonexistent/dupescan/root"),
        file_root,
        PathBuf::new(),
        sub.clone(),
    ];
    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(&roots, NO_EXCLUDES)
        .unwrap();

    assert_eq!(summary.scan_roots, vec![fs::canonicalize(&sub).unwrap()]);
    assert_eq!(groups.len(), 1);
}

#[test]
#[cfg(unix)]
fn test_symlinked_root_resolves_to_target() {
    let dir = tempdir().unwrap();
    let real = dir.path().join("real");
    fs::create_dir(&real).unwrap();
    fs::write(real.join("a"), b"dup").unwrap();
    fs::write(real.join("b"), b"dup").unwrap();
    let link = dir.path().join("link");
    std::os::unix::fs::symlink(&real, &link).unwrap();

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(&[&link, &real], NO_EXCLUDES)
        .unwrap();

    assert_eq!(summary.scan_roots.len(), 1);
    assert_eq!(groups[0].len(), 2);
}

#[test]
fn test_roots_differing_only_in_normalization_form_are_both_scanned() {
    let dir = tempdir().unwrap();
    let composed = dir.path().join("caf\u{e9}");
    let decomposed = dir.path().join("cafe\u{301}");
    fs::create_dir(&composed).unwrap();
    if fs::create_dir(&decomposed).is_err() || fs::read_dir(dir.path()).unwrap().count() != 2 {
        return;
    }
    fs::write(composed.join("a.bin"), b"identical").unwrap();
    fs::write(decomposed.join("b.bin"), b"identical").unwrap();

    let dups = dupescan::find_duplicates(&[composed, decomposed], NO_EXCLUDES).unwrap();

    assert_eq!(dups.len(), 1);
    assert_eq!(dups.values().next().unwrap().len(), 2);
}
