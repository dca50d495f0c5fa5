//! Integration tests for the grove CLI


use assert_cmd::Command;
use harness::{TestDir, body_lines, run_grove};
use predicates::prelude::*;

fn sample_dir() -> TestDir {
    let dir = TestDir::with_dirs(&["a/a1", "b"]);
    dir.add_file("c.txt", "hello");
    dir
}

fn grove() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_grove"));
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_walk_directory_preorder() {
    let dir = sample_dir();
    let (stdout, _stderr, success) = run_grove(dir.path(), &["walk", "--color", "never"]);
    assert!(success, "grove walk should succeed");
    assert_eq!(body_lines(&stdout), vec!["a", "  a1", "b", "c.txt"]);
    assert!(stdout.ends_with("4 nodes visited\n"), "{}", stdout);
}

#[test]
fn test_walk_backward_skip_ancestry() {
    let dir = sample_dir();
    let (stdout, _stderr, success) = run_grove(
        dir.path(),
        &["walk", "--from", "b", "--backward", "--skip-initial-ancestry"],
    );
    assert!(success);
    assert_eq!(body_lines(&stdout), vec!["  a1", "a"]);
}

#[test]
fn test_walk_backward_includes_ancestors() {
    let dir = sample_dir();
    let (stdout, _stderr, success) = run_grove(dir.path(), &["walk", "--from", "b", "--backward"]);
    assert!(success);
    let lines = body_lines(&stdout);
    assert_eq!(lines.len(), 3, "a1, a and the root: {}", stdout);
    assert_eq!(lines[0].trim(), "a1");
    assert_eq!(lines[1].trim(), "a");
}

#[test]
fn test_walk_leaf_glob_stops_descent() {
    let dir = sample_dir();
    let (stdout, _stderr, success) = run_grove(dir.path(), &["walk", "--leaf", "a"]);
    assert!(success);
    assert_eq!(body_lines(&stdout), vec!["a", "b", "c.txt"]);
}

#[test]
fn test_walk_level_limit() {
    let dir = sample_dir();
    let (stdout, _stderr, success) = run_grove(dir.path(), &["walk", "-L", "1"]);
    assert!(success);
    assert!(!stdout.contains("a1"), "a1 is below the level limit: {}", stdout);
}

#[test]
fn test_walk_visit_glob_filters_output() {
    let dir = sample_dir();
    let (stdout, _stderr, success) = run_grove(dir.path(), &["walk", "--visit", "*.txt"]);
    assert!(success);
    assert_eq!(body_lines(&stdout), vec!["c.txt"]);
    assert!(stdout.ends_with("1 nodes visited\n"));
}

#[test]
fn test_walk_root_glob_confines_walk() {
    let dir = sample_dir();
    let (stdout, _stderr, success) =
        run_grove(dir.path(), &["walk", "--from", "a", "--root", "a"]);
    assert!(success);
    assert_eq!(body_lines(&stdout), vec!["a1"]);
}

#[test]
fn test_walk_skip_initial_subtree() {
    let dir = sample_dir();
    let (stdout, _stderr, success) =
        run_grove(dir.path(), &["walk", "--from", "a", "--skip-initial-subtree"]);
    assert!(success);
    assert_eq!(body_lines(&stdout), vec!["b", "c.txt"]);
}

#[test]
fn test_walk_dirs_only() {
    let dir = sample_dir();
    let (stdout, _stderr, success) = run_grove(dir.path(), &["walk", "-d"]);
    assert!(success);
    assert!(!stdout.contains("c.txt"));
    assert!(stdout.contains("a1"));
}

#[test]
fn test_walk_respects_gitignore_and_all() {
    let dir = sample_dir();
    dir.add_file(".gitignore", "b/\n");

    let (stdout, _stderr, success) = run_grove(dir.path(), &["walk"]);
    assert!(success);
    assert!(!body_lines(&stdout).contains(&"b"), "{}", stdout);
    assert!(!stdout.contains(".gitignore"), "hidden files are skipped");

    let (stdout, _stderr, success) = run_grove(dir.path(), &["walk", "-a"]);
    assert!(success);
    assert!(body_lines(&stdout).contains(&"b"));
    assert!(stdout.contains(".gitignore"));
}

#[test]
fn test_walk_ignore_pattern() {
    let dir = sample_dir();
    let (stdout, _stderr, success) = run_grove(dir.path(), &["walk", "-I", "*.txt"]);
    assert!(success);
    assert!(!stdout.contains("c.txt"));
}

#[test]
fn test_walk_outline_with_phases() {
    let dir = TestDir::new();
    dir.add_file("tree.txt", "1\n  2\n    3\n  4\n");
    let (stdout, _stderr, success) = run_grove(
        dir.path(),
        &["walk", "--outline", "tree.txt", "--from", "2", "--phase", "--color", "never"],
    );
    assert!(success);
    assert_eq!(stdout, "descendant   3\nother      4\n\n2 nodes visited\n");
}

#[test]
fn test_walk_outline_unknown_start() {
    let dir = TestDir::new();
    dir.add_file("tree.txt", "1\n  2\n");
    grove()
        .current_dir(dir.path())
        .args(["walk", "--outline", "tree.txt", "--from", "9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no node '9' in outline"));
}

#[test]
fn test_walk_outline_malformed() {
    let dir = TestDir::new();
    dir.add_file("tree.txt", "1\n      2\n");
    grove()
        .current_dir(dir.path())
        .args(["walk", "--outline", "tree.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("grove: line 2"));
}

#[test]
fn test_walk_json() {
    let dir = sample_dir();
    let (stdout, _stderr, success) = run_grove(dir.path(), &["walk", "--json", "-d"]);
    assert!(success);
    let visits: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    let visits = visits.as_array().expect("array of visits");
    assert_eq!(visits.len(), 3);
    assert_eq!(visits[0]["label"], "a");
    assert_eq!(visits[0]["key"], "a");
    assert_eq!(visits[0]["phase"], "descendant");
    assert_eq!(visits[1]["key"], "a/a1");
    assert_eq!(visits[1]["depth"], 2);
}

#[test]
fn test_walk_missing_path() {
    let dir = TestDir::new();
    grove()
        .current_dir(dir.path())
        .args(["walk", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "grove: cannot access 'nope': No such file or directory",
        ));
}

#[test]
fn test_walk_invalid_glob() {
    let dir = sample_dir();
    grove()
        .current_dir(dir.path())
        .args(["walk", "--leaf", "["])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid --leaf pattern"));
}

#[test]
fn test_sync_fresh_tree() {
    let dir = TestDir::with_dirs(&["src", "docs/guide"]);
    dir.add_file("README.md", "# readme");

    let (stdout, _stderr, success) = run_grove(dir.path(), &["sync", "--color", "never"]);
    assert!(success, "grove sync should succeed");
    assert_eq!(body_lines(&stdout), vec!["+ docs", "+ src", "2 added, 0 removed"]);
    assert!(stdout.contains("├── docs\n"), "{}", stdout);
    assert!(stdout.contains("└── src\n"), "{}", stdout);
    assert!(!stdout.contains("README.md"), "sync shows directories only");
    assert!(stdout.ends_with("3 items, 1 expanded\n"), "{}", stdout);
}

#[test]
fn test_sync_expand_levels() {
    let dir = TestDir::with_dirs(&["src", "docs/guide/deep"]);
    let (stdout, _stderr, success) = run_grove(dir.path(), &["sync", "--expand", "2"]);
    assert!(success);
    assert!(stdout.contains("+ docs/guide\n"), "{}", stdout);
    assert!(stdout.contains("│   └── guide\n"), "{}", stdout);
    assert!(!stdout.contains("deep"), "third level stays collapsed: {}", stdout);
}

#[test]
fn test_sync_delay_expansion_marks_collapsed() {
    let dir = TestDir::with_dirs(&["src"]);
    let (stdout, _stderr, success) =
        run_grove(dir.path(), &["sync", "--delay-expansion", "--save", "view.json"]);
    assert!(success);
    assert!(stdout.contains("└── src\n"), "new items carry no marker: {}", stdout);

    let (stdout, _stderr, success) = run_grove(
        dir.path(),
        &["sync", "--delay-expansion", "--snapshot", "view.json"],
    );
    assert!(success);
    assert!(stdout.contains("└── src [+]\n"), "{}", stdout);
}

#[test]
fn test_sync_group_hidden_while_empty() {
    let dir = TestDir::with_dirs(&["src", "pending"]);
    let (stdout, _stderr, success) = run_grove(dir.path(), &["sync", "--group", "pending"]);
    assert!(success);
    assert!(!stdout.contains("pending"), "{}", stdout);

    dir.add_dir("pending/job");
    let (stdout, _stderr, success) = run_grove(dir.path(), &["sync", "--group", "pending"]);
    assert!(success);
    assert!(stdout.contains("+ pending\n"), "{}", stdout);
    assert!(stdout.contains("├── pending"), "{}", stdout);
}

#[test]
fn test_sync_snapshot_round_trip() {
    let dir = TestDir::with_dirs(&["src", "docs"]);
    let (_stdout, _stderr, success) = run_grove(dir.path(), &["sync", "--save", "view.json"]);
    assert!(success);
    assert!(dir.join("view.json").exists());

    let (stdout, _stderr, success) =
        run_grove(dir.path(), &["sync", "--snapshot", "view.json"]);
    assert!(success);
    assert_eq!(body_lines(&stdout), vec!["no changes"]);

    dir.add_dir("new");
    dir.remove("src");
    let (stdout, _stderr, success) =
        run_grove(dir.path(), &["sync", "--snapshot", "view.json"]);
    assert!(success);
    assert_eq!(
        body_lines(&stdout),
        vec!["+ new", "- src", "1 added, 1 removed"]
    );
}

#[test]
fn test_sync_snapshot_from_other_root() {
    let first = TestDir::with_dirs(&["a"]);
    let second = TestDir::with_dirs(&["b"]);
    let snapshot = first.join("view.json");
    let (_stdout, _stderr, success) =
        run_grove(first.path(), &["sync", "--save", snapshot.to_str().unwrap()]);
    assert!(success);

    grove()
        .current_dir(second.path())
        .args(["sync", "--snapshot", snapshot.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("snapshot root key does not match"));
}

#[test]
fn test_sync_corrupt_snapshot() {
    let dir = TestDir::with_dirs(&["a"]);
    dir.add_file("view.json", "{ not json");
    grove()
        .current_dir(dir.path())
        .args(["sync", "--snapshot", "view.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid snapshot JSON"));
}

#[test]
fn test_sync_json_report() {
    let dir = TestDir::with_dirs(&["src", "docs"]);
    let (stdout, _stderr, success) = run_grove(dir.path(), &["sync", "--json"]);
    assert!(success);
    let report: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");

    let edits = report["edits"].as_array().expect("edits array");
    assert_eq!(edits.len(), 2);
    assert!(edits.iter().all(|e| e["op"] == "insert"));

    let root = &report["tree"]["root"];
    assert_eq!(root["expanded"], true);
    let labels: Vec<&str> = root["children"]
        .as_array()
        .expect("children")
        .iter()
        .filter_map(|c| c["label"].as_str())
        .collect();
    assert_eq!(labels, vec!["docs", "src"]);
}

#[test]
fn test_sync_invalid_timeout() {
    let dir = TestDir::new();
    grove()
        .current_dir(dir.path())
        .args(["sync", "--timeout", "soon"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid --timeout duration"));
}

#[test]
fn test_sync_with_timeout() {
    let dir = TestDir::with_dirs(&["src"]);
    grove()
        .current_dir(dir.path())
        .args(["sync", "--timeout", "5s", "--color", "never"])
        .assert()
        .success()
        .stdout(predicate::str::contains("+ src"));
}

#[test]
fn test_verbose_logs_to_stderr() {
    let dir = TestDir::with_dirs(&["src"]);
    let (stdout, stderr, success) = run_grove(dir.path(), &["-vv", "sync", "--json"]);
    assert!(success);
    assert!(serde_json::from_str::<serde_json::Value>(&stdout).is_ok());
    assert!(stderr.contains("DEBUG"), "debug logs go to stderr: {}", stderr);
}
