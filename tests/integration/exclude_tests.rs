use dupescan::duplicates::DuplicateFinder;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

/// `data/` with `a.txt`, `tmp/a_copy.txt` and `tmpfiles/b.txt`, all identical.
fn data_tree() -> (TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    let data = fs::canonicalize(dir.path()).unwrap().join("data");
    fs::create_dir_all(data.join("tmp")).unwrap();
    fs::create_dir_all(data.join("tmpfiles")).unwrap();
    fs::write(data.join("a.txt"), b"payload").unwrap();
    fs::write(data.join("tmp").join("a_copy.txt"), b"payload").unwrap();
    fs::write(data.join("tmpfiles").join("b.txt"), b"payload").unwrap();
    (dir, data)
}

fn all_paths(scan: &Path, exclude: &[PathBuf]) -> Vec<PathBuf> {
    dupescan::find_duplicates(&[scan], exclude)
        .unwrap()
        .into_values()
        .flat_map(|g| g.paths)
        .collect()
}

#[test]
fn test_excluded_directory_contents_never_reported() {
    let (_dir, data) = data_tree();

    let paths = all_paths(&data, &[data.join("tmp")]);

    assert_eq!(paths.len(), 2);
    assert!(paths.iter().all(|p| !p.starts_with(data.join("tmp"))));
}

#[test]
fn test_exclude_does_not_match_sibling_with_shared_prefix() {
    let (_dir, data) = data_tree();

    let paths = all_paths(&data, &[data.join("tmp")]);

    assert!(paths.contains(&data.join("tmpfiles").join("b.txt")));
}

#[test]
fn test_exclude_leaves_single_file_unreported() {
    let (_dir, data) = data_tree();
    fs::remove_file(data.join("tmpfiles").join("b.txt")).unwrap();

    let result = dupescan::find_duplicates(&[&data], &[data.join("tmp")]).unwrap();
    assert!(result.is_empty());
}

#[test]
fn test_exclude_with_trailing_separator_and_dots() {
    let (_dir, data) = data_tree();
    let messy = PathBuf::from(format!("{}/./tmpfiles/../tmp/", data.display()));

    let paths = all_paths(&data, &[messy]);
    assert_eq!(paths.len(), 2);
}

#[test]
fn test_exclude_equal_to_scan_root_is_ignored() {
    let (_dir, data) = data_tree();

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(&[&data], &[&data])
        .unwrap();

    assert!(summary.exclude_roots.is_empty());
    assert_eq!(groups[0].len(), 3);
}

#[test]
fn test_nonexistent_exclude_is_ignored() {
    let (_dir, data) = data_tree();

    let paths = all_paths(&data, &[data.join("missing")]);
    assert_eq!(paths.len(), 3);
}

#[test]
fn test_exclude_outside_scan_roots_has_no_effect() {
    let (_dir, data) = data_tree();
    let elsewhere = tempdir().unwrap();

    let paths = all_paths(&data, &[elsewhere.path().to_path_buf()]);
    assert_eq!(paths.len(), 3);
}
