//! Unified-diff parser.
//!
//! Converts raw `git diff -U0` output into per-file [`FileDiff`] records.
//! Zero-context input is assumed: hunks contain only changed lines, which
//! keeps the cursor math simple but means adjacent independent changes show
//! up as separate hunks.
//!
//! ## Algorithm
//!
//! 1. Scan lines sequentially, keeping a current-file accumulator.
//! 2. `diff --git a/<path> b/<path>` flushes the previous accumulator and
//!    starts a new one defaulting to `Mod`.
//! 3. Header markers (`new file mode`, `deleted file mode`, `/dev/null`
//!    sides) refine the change type before the first hunk.
//! 4. `@@ -old[,len] +new[,len] @@` opens a hunk and resets the running
//!    old/new line cursors.
//! 5. `+`/`-`/` ` content lines advance the cursors and record changed
//!    lines; deleted content is always retained because the removed-test
//!    detector needs it even in modified files.

use crate::model::{ChangeType, ChangedLine, FileDiff, Hunk};

/// Per-file parse state, flushed into a [`FileDiff`] at the next file
/// header or end of input.
struct FileAccumulator {
    a_path: String,
    b_path: String,
    diff: FileDiff,
    in_header: bool,
    current_old: i64,
    current_new: i64,
    in_hunk: bool,
}

impl FileAccumulator {
    fn new(a_path: String, b_path: String) -> Self {
        let diff = FileDiff::new(b_path.clone());
        Self {
            a_path,
            b_path,
            diff,
            in_header: true,
            current_old: 0,
            current_new: 0,
            in_hunk: false,
        }
    }

    fn finish(mut self) -> FileDiff {
        // The b/ side of a deleted file is meaningless once truncated to
        // /dev/null; report the pre-commit path instead.
        self.diff.path = match self.diff.change_type {
            ChangeType::Del => self.a_path,
            _ => self.b_path,
        };
        self.diff
    }
}

/// Parse raw unified-diff text into an ordered sequence of [`FileDiff`]s.
pub fn parse(diff_text: &str) -> Vec<FileDiff> {
    let mut files = Vec::new();
    let mut current: Option<FileAccumulator> = None;

    for line in diff_text.lines() {
        if let Some((a_path, b_path)) = parse_file_header(line) {
            if let Some(acc) = current.take() {
                files.push(acc.finish());
            }
            current = Some(FileAccumulator::new(a_path, b_path));
            continue;
        }

        let Some(acc) = current.as_mut() else {
            continue;
        };

        if acc.in_header {
            if line.starts_with("new file mode ") || line.starts_with("--- /dev/null") {
                acc.diff.change_type = ChangeType::Add;
            } else if line.starts_with("deleted file mode ") || line.starts_with("+++ /dev/null") {
                acc.diff.change_type = ChangeType::Del;
            }
        }

        if let Some(hunk) = parse_hunk_header(line) {
            acc.in_header = false;
            acc.in_hunk = true;
            acc.current_old = hunk.old_start;
            acc.current_new = hunk.new_start;
            acc.diff.hunks.push(hunk);
            continue;
        }

        if acc.in_header || !acc.in_hunk {
            continue;
        }

        match line.as_bytes().first() {
            Some(b'+') => {
                // Added content is only meaningful while the file still
                // exists after the commit.
                if acc.diff.change_type != ChangeType::Del {
                    acc.diff.changed_lines.push(ChangedLine {
                        line: acc.current_new,
                        content: line[1..].to_string(),
                        is_deleted: false,
                    });
                }
                acc.current_new += 1;
            }
            Some(b'-') => {
                acc.diff.changed_lines.push(ChangedLine {
                    line: acc.current_old,
                    content: line[1..].to_string(),
                    is_deleted: true,
                });
                acc.current_old += 1;
            }
            Some(b' ') => {
                acc.current_old += 1;
                acc.current_new += 1;
            }
            // "\ No newline at end of file" and anything else.
            _ => {}
        }
    }

    if let Some(acc) = current.take() {
        files.push(acc.finish());
    }

    files
}

/// Match `diff --git a/<path> b/<path>` and return both sides.
fn parse_file_header(line: &str) -> Option<(String, String)> {
    let rest = line.strip_prefix("diff --git a/")?;
    let split = rest.find(" b/")?;
    let a_path = &rest[..split];
    let b_path = &rest[split + 3..];
    if a_path.is_empty() || b_path.is_empty() {
        return None;
    }
    Some((a_path.to_string(), b_path.to_string()))
}

/// Match `@@ -oldStart[,oldLen] +newStart[,newLen] @@`; omitted lengths
/// default to 1 per the unified-diff format.
fn parse_hunk_header(line: &str) -> Option<Hunk> {
    let rest = line.strip_prefix("@@ -")?;
    let plus = rest.find(" +")?;
    let (old_start, old_lines) = parse_range(&rest[..plus])?;
    let tail = &rest[plus + 2..];
    let end = tail.find(" @@")?;
    let (new_start, new_lines) = parse_range(&tail[..end])?;
    Some(Hunk {
        old_start,
        old_lines,
        new_start,
        new_lines,
    })
}

fn parse_range(text: &str) -> Option<(i64, i64)> {
    match text.split_once(',') {
        Some((start, len)) => Some((start.parse().ok()?, len.parse().ok()?)),
        None => Some((text.parse().ok()?, 1)),
    }
}
