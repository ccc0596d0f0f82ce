//! Diff retrieval from a git repository.
//!
//! The engine never links a git library; it shells out to the `git` CLI
//! and parses the text it gets back.

use anyhow::{Context, Result, bail};
use std::path::Path;
use std::process::Command;

/// Raw unified diff between `commit` and its first parent, with zero
/// context lines.
///
/// A commit with no parent or an unknown SHA makes git exit non-zero; that
/// is surfaced as a fatal error carrying git's stderr, and aborts the run.
pub fn commit_diff(repo_root: &Path, commit: &str) -> Result<String> {
    let output = Command::new("git")
        .arg("-C")
        .arg(repo_root)
        .arg("diff")
        .arg("-U0")
        .arg(format!("{commit}^"))
        .arg(commit)
        .output()
        .context("failed to run git diff")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("git diff failed for commit {commit}: {}", stderr.trim());
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
