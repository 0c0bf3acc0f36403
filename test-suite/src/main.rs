//! Runs the completion cases, printing each failure and a pass count.

use std::process::ExitCode;

use clap::Parser;
use test_suite::{TestRunner, cases_dir};

#[derive(Parser)]
#[command(name = "test-suite", about = "yls completion test suite runner")]
struct Args {
    /// Filter tests by name pattern (substring match)
    #[arg(short, long)]
    filter: Option<String>,

    /// Show only the first line of each failure
    #[arg(short, long)]
    short: bool,
}

mod colors {
    pub const GREEN: &str = "\x1b[32m";
    pub const RED: &str = "\x1b[31m";
    pub const BOLD: &str = "\x1b[1m";
    pub const RESET: &str = "\x1b[0m";
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    let mut runner = TestRunner::new(cases_dir());
    if let Some(filter) = args.filter {
        runner = runner.with_filter(filter);
    }
    let results = runner.run_all()?;

    for failure in &results.failures {
        let error = if args.short {
            failure.error.lines().next().unwrap_or_default()
        } else {
            failure.error.as_str()
        };
        println!("{}FAIL{} {}", colors::RED, colors::RESET, failure.test_name);
        println!("  {error}");
    }

    let color = if results.is_success() {
        colors::GREEN
    } else {
        colors::RED
    };
    println!(
        "{}{color}{}/{} passed{}",
        colors::BOLD,
        results.passed,
        results.total,
        colors::RESET
    );
    Ok(if results.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
