mod common;
use crate::common::{fixed_salt, init_tracing};

use std::path::Path;

use sha2::{Digest, Sha256};

use reloadwatch::errors::ReloadwatchError;
use reloadwatch::fs::mock::MockFileSystem;
use reloadwatch::watch::{compute_salted_hash, HashAlgorithm, Salt};

#[test]
fn known_algorithms_parse_case_insensitively() {
    assert_eq!("sha1".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha1);
    assert_eq!("SHA256".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha256);
    assert_eq!(" blake3 ".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Blake3);
    assert_eq!(HashAlgorithm::default(), HashAlgorithm::Sha256);
}

#[test]
fn unknown_algorithm_is_an_error_not_a_panic() {
    match "md5".parse::<HashAlgorithm>() {
        Err(ReloadwatchError::UnsupportedAlgorithm(name)) => assert_eq!(name, "md5"),
        other => panic!("expected UnsupportedAlgorithm, got {other:?}"),
    }
}

#[test]
fn block_and_output_sizes() {
    for alg in [HashAlgorithm::Sha1, HashAlgorithm::Sha256, HashAlgorithm::Blake3] {
        assert_eq!(alg.block_size(), 64, "{alg}");
        assert_eq!(alg.digester().finalize().len(), alg.output_size(), "{alg}");
    }
}

#[test]
fn generated_salt_has_block_size_and_differs_between_watchers() {
    let a = Salt::generate(HashAlgorithm::Sha256);
    let b = Salt::generate(HashAlgorithm::Sha256);
    assert_eq!(a.len(), 64);
    assert_eq!(b.len(), 64);
    assert_ne!(a, b);
    // Debug output must not leak the bytes.
    assert_eq!(format!("{a:?}"), "Salt(64 bytes)");
}

#[test]
fn unsalted_digests_match_reference_vectors() {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_file("/t/abc", b"abc".to_vec());
    fs.add_file("/t/hello", b"hello world".to_vec());
    let empty = Salt::from_bytes(Vec::new());

    assert_eq!(
        compute_salted_hash(&fs, Path::new("/t/abc"), HashAlgorithm::Sha256, &empty).unwrap(),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
    assert_eq!(
        compute_salted_hash(&fs, Path::new("/t/abc"), HashAlgorithm::Sha1, &empty).unwrap(),
        "a9993e364706816aba3e25717850c26c9cd0d89d"
    );
    assert_eq!(
        compute_salted_hash(&fs, Path::new("/t/hello"), HashAlgorithm::Blake3, &empty).unwrap(),
        "d74981efa70a0c880b8d8c1985d075dbcbf679b99a5f9914e5aaf96b831a9e24"
    );
}

#[test]
fn salted_digest_is_hash_of_salt_then_content() {
    init_tracing();
    let fs = MockFileSystem::new();
    // Larger than one read chunk so streaming is exercised.
    let content: Vec<u8> = (0..20_000u32).map(|i| (i % 251) as u8).collect();
    fs.add_file("/data/big.bin", content.clone());

    let salt = fixed_salt(HashAlgorithm::Sha256);
    let got =
        compute_salted_hash(&fs, Path::new("/data/big.bin"), HashAlgorithm::Sha256, &salt).unwrap();

    let mut reference = Sha256::new();
    reference.update(salt.as_bytes());
    reference.update(&content);
    assert_eq!(got, hex::encode(reference.finalize()));
}

#[test]
fn different_salts_give_different_digests_for_same_content() {
    let fs = MockFileSystem::new();
    fs.add_file("/data/app.conf", b"A".to_vec());
    let path = Path::new("/data/app.conf");

    let a = compute_salted_hash(&fs, path, HashAlgorithm::Sha256, &Salt::generate(HashAlgorithm::Sha256)).unwrap();
    let b = compute_salted_hash(&fs, path, HashAlgorithm::Sha256, &Salt::generate(HashAlgorithm::Sha256)).unwrap();
    assert_ne!(a, b);
}

#[test]
fn missing_file_is_file_unreadable() {
    let fs = MockFileSystem::new();
    let salt = fixed_salt(HashAlgorithm::Sha1);
    match compute_salted_hash(&fs, Path::new("/nope"), HashAlgorithm::Sha1, &salt) {
        Err(ReloadwatchError::FileUnreadable { path, .. }) => assert_eq!(path, Path::new("/nope")),
        other => panic!("expected FileUnreadable, got {other:?}"),
    }
}
