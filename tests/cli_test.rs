//! Integration tests for the blamelens CLI
//!
//! These run the actual binary against a repository built with libgit2 and
//! check the text and JSON output shapes. Tests skip when the `git` binary
//! is unavailable.

use anyhow::Result;
use git2::Repository;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn create_repo_with_file() -> Result<TempDir> {
    let dir = tempfile::tempdir()?;
    let repo = Repository::init(dir.path())?;

    let mut config = repo.config()?;
    config.set_str("user.name", "Test User")?;
    config.set_str("user.email", "test@example.com")?;

    fs::write(dir.path().join("notes.txt"), "line 1\nline 2\n")?;
    let sig = repo.signature()?;
    let tree_id = {
        let mut index = repo.index()?;
        index.add_path(Path::new("notes.txt"))?;
        index.write()?;
        index.write_tree()?
    };
    let tree = repo.find_tree(tree_id)?;
    repo.commit(Some("HEAD"), &sig, &sig, "Add notes", &tree, &[])?;

    Ok(dir)
}

/// Run the blamelens binary and return (stdout, exit code).
fn run_blamelens(args: &[&str]) -> (String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_blamelens"))
        .args(args)
        .output()
        .expect("binary runs");
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        output.status.code().unwrap_or(-1),
    )
}

#[test]
fn line_command_prints_attribution() -> Result<()> {
    if !git_available() {
        eprintln!("git binary not available; skipping");
        return Ok(());
    }

    let dir = create_repo_with_file()?;
    let file = dir.path().join("notes.txt");

    let (stdout, code) = run_blamelens(&["line", file.to_str().unwrap(), "1"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Test User"));
    assert!(stdout.contains("Add notes"));
    Ok(())
}

#[test]
fn line_command_emits_valid_json() -> Result<()> {
    if !git_available() {
        eprintln!("git binary not available; skipping");
        return Ok(());
    }

    let dir = create_repo_with_file()?;
    let file = dir.path().join("notes.txt");

    let (stdout, code) = run_blamelens(&["line", file.to_str().unwrap(), "2", "-f", "json"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout)?;
    assert_eq!(parsed["line"], 2);
    assert_eq!(parsed["author"], "Test User");
    assert_eq!(parsed["summary"], "Add notes");
    Ok(())
}

#[test]
fn out_of_range_line_reports_nothing_to_show() -> Result<()> {
    if !git_available() {
        eprintln!("git binary not available; skipping");
        return Ok(());
    }

    let dir = create_repo_with_file()?;
    let file = dir.path().join("notes.txt");

    let (stdout, code) = run_blamelens(&["line", file.to_str().unwrap(), "99"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("nothing to show"));
    Ok(())
}

#[test]
fn diff_command_ends_with_placeholder() -> Result<()> {
    if !git_available() {
        eprintln!("git binary not available; skipping");
        return Ok(());
    }

    let dir = create_repo_with_file()?;
    let file = dir.path().join("notes.txt");

    let (stdout, code) = run_blamelens(&["diff", file.to_str().unwrap(), "1"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.lines().last(), Some("..."));
    Ok(())
}
