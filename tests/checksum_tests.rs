//! Content hashing and comparison tests

mod common;

use common::write_file;
use std::fs;
use tempfile::TempDir;
use treeops::aggregate::{checksum_of, Checksum, ChecksumScope};
use treeops::compare::content_equals;
use treeops::copy::{copy_file, CopyOptions};
use treeops::fs::StdFs;
use treeops::TreeError;

fn hash_file(path: &std::path::Path) -> treeops::Result<blake3::Hash> {
    let mut hasher = blake3::Hasher::new();
    checksum_of(&StdFs, path, &mut hasher, ChecksumScope::File)
}

#[test]
fn test_checksum_basic() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("test.txt");
    write_file(&path, b"Hello, World!");

    let hash = hash_file(&path).expect("hash");

    assert_eq!(hash, blake3::hash(b"Hello, World!"));
}

#[test]
fn test_checksum_deterministic() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("test.txt");
    write_file(&path, b"Deterministic content");

    assert_eq!(hash_file(&path).expect("first"), hash_file(&path).expect("second"));
}

#[test]
fn test_checksum_different_content() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let a = temp_dir.path().join("a.txt");
    let b = temp_dir.path().join("b.txt");
    write_file(&a, b"Content A");
    write_file(&b, b"Content B");

    assert_ne!(hash_file(&a).expect("a"), hash_file(&b).expect("b"));
}

#[test]
fn test_checksum_empty_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("empty.txt");
    write_file(&path, b"");

    assert_eq!(hash_file(&path).expect("hash"), blake3::hash(b""));
}

#[test]
fn test_checksum_large_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("large.bin");
    let content: Vec<u8> = (0..(3 * 1024 * 1024 + 5)).map(|i| (i % 256) as u8).collect();
    write_file(&path, &content);

    assert_eq!(hash_file(&path).expect("hash"), blake3::hash(&content));
}

#[test]
fn test_checksum_nonexistent_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let error = hash_file(&temp_dir.path().join("missing.txt")).unwrap_err();
    assert!(error.is_not_found());
}

#[test]
fn test_two_files_fed_in_sequence_equal_concatenation() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let a = temp_dir.path().join("a.txt");
    let b = temp_dir.path().join("b.txt");
    write_file(&a, b"first half, ");
    write_file(&b, b"second half");

    let mut hasher = blake3::Hasher::new();
    checksum_of(&StdFs, &a, &mut hasher, ChecksumScope::File).expect("a");
    checksum_of(&StdFs, &b, &mut hasher, ChecksumScope::File).expect("b");

    assert_eq!(hasher.value(), blake3::hash(b"first half, second half"));
}

#[test]
fn test_directory_checksum_requires_opt_in() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write_file(&temp_dir.path().join("b/2.txt"), b"2");
    write_file(&temp_dir.path().join("a.txt"), b"1");

    let mut hasher = blake3::Hasher::new();
    let refused = checksum_of(&StdFs, temp_dir.path(), &mut hasher, ChecksumScope::File);
    assert!(matches!(refused, Err(TreeError::IsADirectory { .. })));

    let mut hasher = blake3::Hasher::new();
    let tree = checksum_of(&StdFs, temp_dir.path(), &mut hasher, ChecksumScope::Tree)
        .expect("tree checksum");
    assert_eq!(tree, blake3::hash(b"12"));
}

/// Counts bytes instead of hashing them
#[derive(Default)]
struct ByteCount(u64);

impl Checksum for ByteCount {
    type Output = u64;

    fn update(&mut self, bytes: &[u8]) {
        self.0 += bytes.len() as u64;
    }

    fn value(&self) -> u64 {
        self.0
    }
}

#[test]
fn test_caller_supplied_checksum() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write_file(&temp_dir.path().join("x/y.bin"), &[0u8; 300]);
    write_file(&temp_dir.path().join("z.bin"), &[0u8; 12]);

    let mut counter = ByteCount::default();
    let total = checksum_of(&StdFs, temp_dir.path(), &mut counter, ChecksumScope::Tree)
        .expect("count");

    assert_eq!(total, 312);
}

#[test]
fn test_copy_then_compare() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let src = temp_dir.path().join("src.bin");
    let dest = temp_dir.path().join("dest.bin");
    let content: Vec<u8> = (0..100_000u32).map(|i| (i * 7 % 256) as u8).collect();
    write_file(&src, &content);

    copy_file(&StdFs, &src, &dest, &CopyOptions::default()).expect("copy");

    assert!(content_equals(&StdFs, &src, &dest).expect("compare"));
    assert_eq!(hash_file(&src).expect("src"), hash_file(&dest).expect("dest"));

    fs::write(&dest, b"tampered").expect("tamper");
    assert!(!content_equals(&StdFs, &src, &dest).expect("compare again"));
}
