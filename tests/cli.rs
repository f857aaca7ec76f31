//! CLI tests: run the compiled binary against local files and assert on
//! its printed output.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn sheetdrop_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("sheetdrop");
    path
}

fn run_sheetdrop(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = sheetdrop_binary();
    let output = Command::new(&binary)
        .current_dir(dir)
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run sheetdrop binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

#[test]
fn process_prints_row_count_and_columns() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("menu.csv"),
        "Name,Price\nFood,3\nDrink,2.5\n",
    )
    .unwrap();

    let (stdout, stderr, success) = run_sheetdrop(tmp.path(), &["process", "menu.csv"]);
    assert!(success, "process failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("rows: 2"));
    assert!(stdout.contains("columns:"));
    for column in ["name", "price", "image_url"] {
        assert!(stdout.contains(column), "missing column {}: {}", column, stdout);
    }
    assert!(stdout.contains("ok"));
}

#[test]
fn process_empty_file_reports_zero_rows() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("empty.csv"), "").unwrap();

    let (stdout, _, success) = run_sheetdrop(tmp.path(), &["process", "empty.csv"]);
    assert!(success);
    assert!(stdout.contains("rows: 0"));
}

#[test]
fn process_rejects_unsupported_format() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("notes.txt"), "hello").unwrap();

    let (_, stderr, success) = run_sheetdrop(tmp.path(), &["process", "notes.txt"]);
    assert!(!success);
    assert!(stderr.contains("unsupported file format"));
}

#[test]
fn search_finds_matching_records() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("menu.csv"),
        "Name,Price\nFood,3\nDrink,2.5\n",
    )
    .unwrap();

    let (stdout, _, success) = run_sheetdrop(tmp.path(), &["search", "menu.csv", "oo"]);
    assert!(success);
    assert!(stdout.contains("matches: 1"));
    assert!(stdout.contains("Food"));
}

#[test]
fn search_with_no_match_prints_no_results() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("menu.csv"), "Name\nFood\n").unwrap();

    let (stdout, _, success) = run_sheetdrop(tmp.path(), &["search", "menu.csv", "zzz"]);
    assert!(success);
    assert!(stdout.contains("No results."));
}
