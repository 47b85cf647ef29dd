// Integration tests for the `construct-sieve` binary: flags, exit codes, output files.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn sieve(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_construct-sieve"))
        .current_dir(dir)
        .env("RUST_LOG", "warn")
        .args(args)
        .output()
        .expect("run construct-sieve")
}

fn workspace() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("config.json"),
        r#"{ "constructs": { "C1": "a, b, c", "C2": "d, e" } }"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("input.csv"),
        "a,b,c,d,e\n1,1,7,3,3\n3,4,5,6,6\n4,4,4,4,4\n7,1,1,3,4\n5,5,5,5,5\n",
    )
    .unwrap();
    dir
}

// ---------------------------------------------------------------------------
// Usage errors
// ---------------------------------------------------------------------------

#[test]
fn mean_threshold_without_factor_is_a_usage_error() {
    let dir = workspace();
    let out = sieve(dir.path(), &["-i", "input.csv", "-m"]);
    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Factor value is required for mean threshold outlier detection."));
    assert!(!dir.path().join("cleaned_data").exists());
}

#[test]
fn overlap_without_factor_is_a_usage_error() {
    let dir = workspace();
    let out = sieve(dir.path(), &["-i", "input.csv", "-r", "C1,C2"]);
    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Factor value is required for remove overlap constructs detection."));
}

#[test]
fn negative_factor_is_a_usage_error() {
    let dir = workspace();
    let out = sieve(dir.path(), &["-i", "input.csv", "-m", "-f", "-1"]);
    assert_eq!(out.status.code(), Some(2));
}

// ---------------------------------------------------------------------------
// Runs
// ---------------------------------------------------------------------------

#[test]
fn both_filters_write_their_own_tables() {
    let dir = workspace();
    let out = sieve(
        dir.path(),
        &["-i", "input.csv", "-m", "-r", "C1,C2", "-f", "0.5"],
    );
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let cleaned = dir.path().join("cleaned_data");
    assert!(cleaned.join("input_0.5_cleaned.csv").exists());
    assert!(cleaned.join("input_C1,C2_0.5_overlap_cleaned.csv").exists());

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Mean-threshold: kept"));
    assert!(stdout.contains("Overlap: kept 2 rows, discarded 3 rows"));
}

#[test]
fn verbose_run_prints_decisions() {
    let dir = workspace();
    let out = sieve(dir.path(), &["-i", "input.csv", "-m", "-f", "1.0", "-v", "-o", "out"]);
    assert!(out.status.success());

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Row #1: Value 7 exceeds threshold. Marking for discard."));
    assert!(stdout.contains("Row #2: Passed."));
    assert!(stdout.contains("Discarded Rows: [1, 4]"));
    assert!(dir.path().join("out").join("input_1.0_cleaned.csv").exists());
}

#[test]
fn list_data_prints_every_row() {
    let dir = workspace();
    let out = sieve(dir.path(), &["-i", "input.csv", "-l"]);
    assert!(out.status.success());

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Row #1: {C1: {a: 1, b: 1, c: 7}, C2: {d: 3, e: 3}}"));
    assert_eq!(stdout.lines().filter(|l| l.starts_with("Row #")).count(), 5);
    assert!(!dir.path().join("cleaned_data").exists());
}

#[test]
fn unknown_target_fails_before_any_output() {
    let dir = workspace();
    let out = sieve(
        dir.path(),
        &["-i", "input.csv", "-m", "-r", "C1, C9", "-f", "1.0"],
    );
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("The construct 'C9' is not defined"));
    assert!(!dir.path().join("cleaned_data").exists());
}

#[test]
fn single_target_is_an_arity_error() {
    let dir = workspace();
    let out = sieve(dir.path(), &["-i", "input.csv", "-r", "C1", "-f", "1.0"]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("At least two target constructs must be specified"));
}
