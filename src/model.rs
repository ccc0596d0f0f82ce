//! Shared data types for commit diff structure and impact results.

use serde::Serialize;

/// File-level classification derived once from the diff header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeType {
    Add,
    Mod,
    Del,
}

/// One changed line from a unified diff.
///
/// `line` is 1-based in the *new* file for additions, and in the *old* file
/// when `is_deleted` is set (in which case it has no meaning in the
/// post-commit file).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedLine {
    pub line: i64,
    pub content: String,
    pub is_deleted: bool,
}

/// A contiguous region of change as reported by the diff format.
///
/// `new_lines == 0` denotes a pure deletion located structurally at
/// `new_start` in the post-commit file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hunk {
    pub old_start: i64,
    pub old_lines: i64,
    pub new_start: i64,
    pub new_lines: i64,
}

impl Hunk {
    /// Closed-interval span of this hunk in the new file. A pure deletion
    /// collapses to the single point `new_start`.
    pub fn new_span(&self) -> (i64, i64) {
        let end = self.new_start + (self.new_lines - 1).max(0);
        (self.new_start, end)
    }
}

/// Per-file change structure reconstructed from a unified diff.
#[derive(Debug, Clone)]
pub struct FileDiff {
    /// Repo-relative path. For `Del` this is the pre-commit (`a/`-side) path.
    pub path: String,
    pub change_type: ChangeType,
    pub changed_lines: Vec<ChangedLine>,
    /// Ordered by ascending `new_start`.
    pub hunks: Vec<Hunk>,
}

impl FileDiff {
    pub fn new(path: String) -> Self {
        Self {
            path,
            change_type: ChangeType::Mod,
            changed_lines: Vec::new(),
            hunks: Vec::new(),
        }
    }
}

/// A test or suite declaration in a checked-out file, 1-based inclusive.
///
/// Ranges for distinct declarations in the same file may nest (a suite
/// containing its tests); a leaf test's range is wholly contained in its
/// enclosing suite's range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestDeclaration {
    pub test_name: String,
    pub start_line: i64,
    pub end_line: i64,
}

impl TestDeclaration {
    pub fn contains_line(&self, line: i64) -> bool {
        self.start_line <= line && line <= self.end_line
    }
}

/// How a test was affected by the analyzed commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImpactType {
    Added,
    Modified,
    Removed,
    ImpactedByDependency,
}

impl ImpactType {
    /// Merge priority used by the aggregator: stronger direct evidence wins
    /// over weaker indirect evidence. `Removed` never participates in
    /// upgrades (removed tests no longer exist in the post-commit tree).
    pub fn priority(self) -> u8 {
        match self {
            ImpactType::Added => 3,
            ImpactType::Modified => 2,
            ImpactType::ImpactedByDependency => 1,
            ImpactType::Removed => 0,
        }
    }
}

/// One impacted test in the final result list.
///
/// Identity for deduplication is `(file_path, test_name)`. `related_file`
/// is set only for `ImpactedByDependency` and names the changed file that
/// caused the indirect impact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactedTest {
    pub test_name: String,
    pub file_path: String,
    pub impact_type: ImpactType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_file: Option<String>,
}
