use anyhow::{Result, bail};
use clap::Parser;
use std::time::Instant;
use tia::analyze::Analyzer;
use tia::cli;
use tia::report::Report;

fn main() -> Result<()> {
    let args = cli::Args::parse();

    if !args.repo.is_dir() {
        bail!("repository path does not exist: {}", args.repo.display());
    }

    let started = Instant::now();
    let mut analyzer = Analyzer::new(&args.repo)?;
    let impacted_tests = analyzer.analyze(&args.commit)?;

    let report = Report {
        commit: args.commit,
        repo: args.repo.display().to_string(),
        duration_ms: started.elapsed().as_millis(),
        impacted_tests,
    };

    if args.json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report.render_human());
    }
    Ok(())
}
