//! Impact engine: per-file dispatch and result aggregation.
//!
//! The analyzer owns everything a single run needs (repo root, parsed-file
//! cache) and produces one deduplicated list of impacted tests for one
//! commit. All state is constructed per run; nothing survives between
//! commits.

pub mod direct;
pub mod removed;
pub mod trace;

use crate::diff;
use crate::git;
use crate::model::{ChangeType, FileDiff, ImpactType, ImpactedTest};
use crate::project::{self, Project};
use anyhow::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Paths whose change invalidates every test at once. Matched by suffix so
/// nested copies (`apps/web/package.json`) escalate too.
const GLOBAL_CONFIG_FILES: &[&str] = &["playwright.config.ts", "package.json", "global-setup.ts"];

pub struct Analyzer {
    repo_root: PathBuf,
    project: Project,
}

impl Analyzer {
    pub fn new(repo_root: &Path) -> Result<Self> {
        Ok(Self {
            repo_root: repo_root.to_path_buf(),
            project: Project::new(repo_root)?,
        })
    }

    /// Analyze one commit against its first parent and return the impacted
    /// tests, deduplicated by `(file_path, test_name)`.
    pub fn analyze(&mut self, commit: &str) -> Result<Vec<ImpactedTest>> {
        let diff_text = git::commit_diff(&self.repo_root, commit)?;
        let file_diffs = diff::parse(&diff_text);

        if file_diffs.iter().any(|d| is_global_config(&d.path)) {
            return Ok(vec![ImpactedTest {
                test_name: "ALL TESTS".to_string(),
                file_path: "ALL".to_string(),
                impact_type: ImpactType::ImpactedByDependency,
                related_file: Some("Global Config Change".to_string()),
            }]);
        }

        let mut results = Vec::new();
        for file_diff in &file_diffs {
            results.extend(self.analyze_file(file_diff));
        }
        Ok(deduplicate(results))
    }

    fn analyze_file(&mut self, file_diff: &FileDiff) -> Vec<ImpactedTest> {
        if file_diff.change_type == ChangeType::Del {
            // The file is gone from the checked-out tree; only the textual
            // detector can see its tests.
            return removed::detect(file_diff);
        }

        if project::is_test_file(&file_diff.path) {
            let tests = self.project.test_declarations(&file_diff.path);
            let mut results = direct::classify(file_diff, &tests);
            results.extend(removed::detect(file_diff));
            return results;
        }

        if project::is_source_file(&file_diff.path) {
            return trace::impacted_tests(&mut self.project, file_diff);
        }

        Vec::new()
    }
}

fn is_global_config(path: &str) -> bool {
    GLOBAL_CONFIG_FILES
        .iter()
        .any(|global| path.ends_with(global))
}

/// Collapse duplicate `(file_path, test_name)` records, keeping the
/// highest-priority impact type and first-seen order. Pure fold over the
/// input; REMOVED sits at the bottom of the priority order and a removed
/// test never shares its key with a live one, so it neither upgrades nor
/// gets upgraded.
fn deduplicate(results: Vec<ImpactedTest>) -> Vec<ImpactedTest> {
    let mut merged: Vec<ImpactedTest> = Vec::new();
    let mut index: HashMap<(String, String), usize> = HashMap::new();

    for result in results {
        let key = (result.file_path.clone(), result.test_name.clone());
        match index.get(&key) {
            Some(&at) => {
                if result.impact_type.priority() > merged[at].impact_type.priority() {
                    merged[at] = result;
                }
            }
            None => {
                index.insert(key, merged.len());
                merged.push(result);
            }
        }
    }
    merged
}
