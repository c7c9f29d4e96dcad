//! Integration tests for the hipdelta CLI

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use hipdelta_hip::testing::ArchiveBuilder;
use predicates::prelude::*;
use tempfile::TempDir;

fn write_archive(dir: &Path, name: &str, builder: ArchiveBuilder) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, builder.build()).unwrap();
    path
}

/// An original/modified pair with one new and one removed asset.
fn archives(dir: &Path) -> (PathBuf, PathBuf) {
    let original = write_archive(
        dir,
        "hb01.hip",
        ArchiveBuilder::new()
            .asset(1, "a", b"XXXX")
            .asset(2, "b", b"YYYY")
            .layer(3, &[1, 2]),
    );
    let modified = write_archive(
        dir,
        "hb01_mod.hip",
        ArchiveBuilder::new()
            .asset(1, "a", b"XXXX")
            .asset(3, "c", b"ZZZZ")
            .layer(3, &[1, 3]),
    );
    (original, modified)
}

#[test]
fn test_help_command() {
    let mut cmd = Command::cargo_bin("hipdelta").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("<ORIGINAL>"))
        .stdout(predicate::str::contains("<MODIFIED>"))
        .stdout(predicate::str::contains("output.hip"));
}

#[test]
fn test_version_command() {
    let mut cmd = Command::cargo_bin("hipdelta").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("hipdelta"));
}

#[test]
fn test_missing_arguments() {
    let mut cmd = Command::cargo_bin("hipdelta").unwrap();
    cmd.arg("only_one.hip")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_builds_patch_archive() {
    let dir = TempDir::new().unwrap();
    let (original, modified) = archives(dir.path());
    let output = dir.path().join("patch.hip");

    let mut cmd = Command::cargo_bin("hipdelta").unwrap();
    cmd.arg(&original)
        .arg(&modified)
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "2 asset(s) in original file, 2 asset(s) in modified file\n\
             \n\
             Creating new HIP with these assets:\n    \
             Layer 2: [00000003] c\n\
             \n\
             Dummying asset [00000002] b\n",
        ))
        .stdout(predicate::str::ends_with(format!(
            "\nWritten to {}\n",
            output.display()
        )));

    let bytes = fs::read(&output).unwrap();
    assert_eq!(&bytes[..4], b"HIPA");
    // PCNT: two assets in one layer
    assert_eq!(&bytes[0x38..0x40], &[0, 0, 0, 2, 0, 0, 0, 1]);
}

#[test]
fn test_default_output_path() {
    let dir = TempDir::new().unwrap();
    let (original, modified) = archives(dir.path());

    let mut cmd = Command::cargo_bin("hipdelta").unwrap();
    cmd.current_dir(dir.path())
        .arg(&original)
        .arg(&modified)
        .assert()
        .success()
        .stdout(predicate::str::contains("Written to output.hip"));

    assert!(dir.path().join("output.hip").is_file());
}

#[test]
fn test_missing_input_file() {
    let dir = TempDir::new().unwrap();
    let (original, _) = archives(dir.path());
    let missing = dir.path().join("nope.hip");

    let mut cmd = Command::cargo_bin("hipdelta").unwrap();
    cmd.arg(&original)
        .arg(&missing)
        .arg(dir.path().join("out.hip"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Could not open file"))
        .stderr(predicate::str::contains("for reading"));

    assert!(!dir.path().join("out.hip").exists());
}

#[test]
fn test_not_a_hip_file() {
    let dir = TempDir::new().unwrap();
    let (_, modified) = archives(dir.path());
    let bogus = dir.path().join("bogus.hip");
    fs::write(&bogus, b"RIFF\0\0\0\0WAVEfmt ").unwrap();

    let mut cmd = Command::cargo_bin("hipdelta").unwrap();
    cmd.arg(&bogus)
        .arg(&modified)
        .arg(dir.path().join("out.hip"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains(format!(
            "Error: Could not read {}",
            bogus.display()
        )))
        .stderr(predicate::function(|err: &str| {
            err.matches("not a HIP file").count() == 1
        }));
}

#[test]
fn test_platform_mismatch() {
    let dir = TempDir::new().unwrap();
    let (original, _) = archives(dir.path());
    let legacy = write_archive(
        dir.path(),
        "legacy.hip",
        ArchiveBuilder::new()
            .platform(ArchiveBuilder::LEGACY_PLATFORM)
            .asset(1, "a", b"XXXX")
            .layer(3, &[1]),
    );

    let mut cmd = Command::cargo_bin("hipdelta").unwrap();
    cmd.arg(&original)
        .arg(&legacy)
        .arg(dir.path().join("out.hip"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Platform info does not match"));
}

#[test]
fn test_platform_content_mismatch() {
    let dir = TempDir::new().unwrap();
    let (original, _) = archives(dir.path());
    let other = write_archive(
        dir.path(),
        "other.hip",
        ArchiveBuilder::new()
            .platform(b"\0\0\0\x02GCPC\0\0Standarx")
            .asset(1, "a", b"XXXX")
            .layer(3, &[1]),
    );

    let mut cmd = Command::cargo_bin("hipdelta").unwrap();
    cmd.arg(&original)
        .arg(&other)
        .arg(dir.path().join("out.hip"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("first difference at byte 17"))
        .stderr(predicate::str::contains("18 vs 18").not());
}

#[test]
fn test_verbose_logs_debug() {
    let dir = TempDir::new().unwrap();
    let (original, modified) = archives(dir.path());

    let mut cmd = Command::cargo_bin("hipdelta").unwrap();
    cmd.env_remove("RUST_LOG")
        .arg("-vv")
        .arg(&original)
        .arg(&modified)
        .arg(dir.path().join("out.hip"))
        .assert()
        .success()
        .stderr(predicate::str::contains("DEBUG"));
}

#[test]
fn test_default_verbosity_is_quiet() {
    let dir = TempDir::new().unwrap();
    let (original, modified) = archives(dir.path());

    let mut cmd = Command::cargo_bin("hipdelta").unwrap();
    cmd.env_remove("RUST_LOG")
        .arg(&original)
        .arg(&modified)
        .arg(dir.path().join("out.hip"))
        .assert()
        .success()
        .stderr(predicate::str::contains("INFO").not());
}
