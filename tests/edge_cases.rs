//! Edge case and error handling tests for grove


use harness::{TestDir, body_lines, run_grove};
use std::os::unix::fs::symlink;

// ============================================================================
// Symlink Edge Cases
// ============================================================================

#[test]
fn test_symlink_to_file_skipped() {
    let dir = TestDir::new();
    dir.add_file("target.txt", "data");
    symlink(dir.join("target.txt"), dir.join("link.txt")).expect("Failed to create symlink");

    let (stdout, _stderr, success) = run_grove(dir.path(), &["walk"]);
    assert!(success, "grove should succeed with symlink");
    assert_eq!(body_lines(&stdout), vec!["target.txt"]);
}

#[test]
fn test_symlink_to_parent_no_infinite_loop() {
    let dir = TestDir::with_dirs(&["subdir"]);
    symlink("..", dir.join("subdir/parent")).expect("Failed to create parent symlink");

    let (stdout, _stderr, success) = run_grove(dir.path(), &["walk", "-a"]);
    assert!(success, "grove should not hang on parent symlink");
    assert_eq!(body_lines(&stdout), vec!["subdir"]);

    let (stdout, _stderr, success) = run_grove(dir.path(), &["sync", "--expand", "3"]);
    assert!(success);
    assert!(!stdout.contains("parent"), "{}", stdout);
}

#[test]
fn test_broken_symlink() {
    let dir = TestDir::with_dirs(&["real"]);
    symlink(dir.join("missing"), dir.join("broken")).expect("Failed to create symlink");

    let (stdout, _stderr, success) = run_grove(dir.path(), &["sync"]);
    assert!(success);
    assert!(!stdout.contains("broken"));
    assert!(stdout.contains("+ real"));
}

// ============================================================================
// Unusual Names
// ============================================================================

#[test]
fn test_directory_with_spaces() {
    let dir = TestDir::with_dirs(&["my docs/old notes"]);
    let (stdout, _stderr, success) = run_grove(dir.path(), &["walk"]);
    assert!(success);
    assert_eq!(body_lines(&stdout), vec!["my docs", "  old notes"]);
}

#[test]
fn test_directory_with_unicode() {
    let dir = TestDir::with_dirs(&["日本語", "émigré"]);
    let (stdout, _stderr, success) = run_grove(dir.path(), &["sync", "--color", "never"]);
    assert!(success);
    assert!(stdout.contains("+ émigré"), "{}", stdout);
    assert!(stdout.contains("+ 日本語"), "{}", stdout);
}

#[test]
fn test_glob_special_chars_in_ignore() {
    let dir = TestDir::with_dirs(&["build-1", "build-2", "src"]);
    let (stdout, _stderr, success) = run_grove(dir.path(), &["walk", "-I", "build-?"]);
    assert!(success);
    assert_eq!(body_lines(&stdout), vec!["src"]);
}

// ============================================================================
// Empty and Degenerate Trees
// ============================================================================

#[test]
fn test_walk_empty_directory() {
    let dir = TestDir::new();
    let (stdout, _stderr, success) = run_grove(dir.path(), &["walk"]);
    assert!(success);
    assert_eq!(stdout, "\n0 nodes visited\n");
}

#[test]
fn test_sync_empty_directory() {
    let dir = TestDir::new();
    let (stdout, _stderr, success) = run_grove(dir.path(), &["sync"]);
    assert!(success);
    assert_eq!(body_lines(&stdout), vec!["no changes"]);
    assert!(stdout.ends_with("1 items, 0 expanded\n"), "{}", stdout);
}

#[test]
fn test_walk_from_last_node() {
    let dir = TestDir::with_dirs(&["a", "z"]);
    let (stdout, _stderr, success) = run_grove(dir.path(), &["walk", "--from", "z"]);
    assert!(success);
    assert_eq!(stdout, "\n0 nodes visited\n");
}

#[test]
fn test_walk_from_missing_node() {
    let dir = TestDir::with_dirs(&["a"]);
    let (_stdout, stderr, success) = run_grove(dir.path(), &["walk", "--from", "nope"]);
    assert!(!success);
    assert!(stderr.contains("cannot access 'nope'"), "{}", stderr);
}

#[test]
fn test_deep_nesting() {
    let dir = TestDir::with_dirs(&["1/2/3/4/5/6/7/8"]);
    let (stdout, _stderr, success) = run_grove(dir.path(), &["walk"]);
    assert!(success);
    let lines = body_lines(&stdout);
    assert_eq!(lines.len(), 8);
    assert_eq!(lines[7], "              8");

    let (stdout, _stderr, success) = run_grove(dir.path(), &["sync", "--expand", "8"]);
    assert!(success);
    assert!(stdout.contains("+ 1/2/3/4/5/6/7/8"), "{}", stdout);
}

#[test]
fn test_walk_file_as_root() {
    let dir = TestDir::new();
    dir.add_file("plain.txt", "x");
    let (stdout, _stderr, success) = run_grove(dir.path(), &["walk", "plain.txt"]);
    assert!(success, "a file is a tree without children");
    assert_eq!(stdout, "\n0 nodes visited\n");
}
