use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "tia",
    version,
    about = "Test impact analysis for a single commit",
    after_help = r#"Examples:
  tia --repo . --commit HEAD
  tia --repo ../webapp --commit 4f2a91c
  tia --repo . --commit 4f2a91c --json > impact.json
  TIA_TRACE_DEPTH=3 tia --repo . --commit HEAD --json
"#
)]
pub struct Args {
    /// Path to the git repository to analyze.
    #[arg(long, default_value = ".")]
    pub repo: PathBuf,

    /// Commit to analyze, compared against its first parent.
    #[arg(long)]
    pub commit: String,

    /// Emit the report as JSON instead of the human summary.
    #[arg(long)]
    pub json: bool,
}
