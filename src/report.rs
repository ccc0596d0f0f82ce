//! Result rendering: machine-readable JSON and a grouped human summary.

use crate::model::{ImpactType, ImpactedTest};
use anyhow::Result;
use serde::Serialize;

/// The full JSON payload for one analysis run.
#[derive(Debug, Serialize)]
pub struct Report {
    pub commit: String,
    pub repo: String,
    #[serde(rename = "durationMs")]
    pub duration_ms: u128,
    pub impacted_tests: Vec<ImpactedTest>,
}

impl Report {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Human rendering, grouped by impact type in severity order.
    pub fn render_human(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "Impact analysis for {} ({} test(s), {} ms)\n",
            self.commit,
            self.impacted_tests.len(),
            self.duration_ms
        ));

        if self.impacted_tests.is_empty() {
            out.push_str("\nNo impacted tests.\n");
            return out;
        }

        for impact_type in [
            ImpactType::Added,
            ImpactType::Modified,
            ImpactType::Removed,
            ImpactType::ImpactedByDependency,
        ] {
            let group: Vec<&ImpactedTest> = self
                .impacted_tests
                .iter()
                .filter(|t| t.impact_type == impact_type)
                .collect();
            if group.is_empty() {
                continue;
            }
            out.push_str(&format!("\n{}:\n", heading(impact_type)));
            for test in group {
                out.push_str(&format!(
                    "  {} {} ({})",
                    marker(impact_type),
                    test.test_name,
                    test.file_path
                ));
                if let Some(related) = &test.related_file {
                    out.push_str(&format!(" via {related}"));
                }
                out.push('\n');
            }
        }
        out
    }
}

fn heading(impact_type: ImpactType) -> &'static str {
    match impact_type {
        ImpactType::Added => "Added",
        ImpactType::Modified => "Modified",
        ImpactType::Removed => "Removed",
        ImpactType::ImpactedByDependency => "Impacted by dependency",
    }
}

fn marker(impact_type: ImpactType) -> char {
    match impact_type {
        ImpactType::Added => '+',
        ImpactType::Modified => '~',
        ImpactType::Removed => '-',
        ImpactType::ImpactedByDependency => '*',
    }
}
