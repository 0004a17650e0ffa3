mod common;
use crate::common::{fixed_salt, init_tracing};

use std::path::{Path, PathBuf};

use reloadwatch::fs::mock::MockFileSystem;
use reloadwatch::watch::{compute_salted_hash, scan, HashAlgorithm, PathSpec, TrackedFileTable};

fn data_fs() -> MockFileSystem {
    let fs = MockFileSystem::new();
    fs.add_file("/data/app.conf", b"A".to_vec());
    fs.add_file("/data/db.conf", b"db".to_vec());
    fs.add_file("/data/readme.md", b"docs".to_vec());
    fs.add_file("/data/nested/deep.conf", b"deep".to_vec());
    fs.add_dir("/empty");
    fs.add_file("/other/notes.txt", b"n".to_vec());
    fs
}

#[test]
fn scan_tracks_matching_files_with_salted_digests() {
    init_tracing();
    let fs = data_fs();
    let alg = HashAlgorithm::Sha256;
    let salt = fixed_salt(alg);
    let table = TrackedFileTable::new();

    let report = scan(&fs, &[PathSpec::dir("/data", ["*.conf"])], alg, &salt, &table);

    assert_eq!(report.tracked_files, 2);
    assert_eq!(report.watch_dirs, vec![PathBuf::from("/data")]);
    assert_eq!(
        table.paths(),
        vec![PathBuf::from("/data/app.conf"), PathBuf::from("/data/db.conf")]
    );

    for path in table.paths() {
        let expected = compute_salted_hash(&fs, &path, alg, &salt).unwrap();
        assert_eq!(table.get(&path), Some(expected));
    }
}

#[test]
fn scan_does_not_descend_into_subdirectories() {
    let fs = data_fs();
    let alg = HashAlgorithm::Sha1;
    let table = TrackedFileTable::new();

    let report = scan(&fs, &[PathSpec::dir("/data", Vec::<String>::new())], alg, &fixed_salt(alg), &table);

    assert_eq!(report.tracked_files, 3);
    assert!(!table.contains(Path::new("/data/nested/deep.conf")));
    assert!(!table.contains(Path::new("/data/nested")));
}

#[test]
fn directories_without_matches_are_not_watched() {
    let fs = data_fs();
    let alg = HashAlgorithm::Sha256;
    let table = TrackedFileTable::new();

    let specs = [
        PathSpec::dir("/empty", Vec::<String>::new()),
        PathSpec::dir("/other", ["*.conf"]),
        PathSpec::file("/data/app.conf"),
    ];
    let report = scan(&fs, &specs, alg, &fixed_salt(alg), &table);

    assert_eq!(report.tracked_files, 1);
    assert_eq!(report.watch_dirs, vec![PathBuf::from("/data")]);
}

#[test]
fn bad_specs_are_skipped_and_the_rest_still_scanned() {
    init_tracing();
    let fs = data_fs();
    let alg = HashAlgorithm::Blake3;
    let table = TrackedFileTable::new();

    let specs = [
        PathSpec::default(),
        PathSpec::dir("/data", ["[broken"]),
        PathSpec::dir("/does/not/exist", ["*.conf"]),
        PathSpec::file("/other/notes.txt"),
    ];
    let report = scan(&fs, &specs, alg, &fixed_salt(alg), &table);

    assert_eq!(report.tracked_files, 1);
    assert_eq!(report.watch_dirs, vec![PathBuf::from("/other")]);
    assert!(table.contains(Path::new("/other/notes.txt")));
}

#[test]
fn same_directory_is_listed_once() {
    let fs = data_fs();
    let alg = HashAlgorithm::Sha256;
    let table = TrackedFileTable::new();

    let specs = [
        PathSpec::file("/data/app.conf"),
        PathSpec::file("/data/db.conf"),
    ];
    let report = scan(&fs, &specs, alg, &fixed_salt(alg), &table);

    assert_eq!(report.tracked_files, 2);
    assert_eq!(report.watch_dirs, vec![PathBuf::from("/data")]);
}
