use colored::Colorize;
use std::path::Path;

use crate::fetch::FetchReport;
use crate::selftest::Outcome;

pub fn output_error(err: &anyhow::Error) {
    eprintln!("{}: {:#}", "Error".red().bold(), err);
}

/// Progress line for a newly rendered issue
pub fn print_issue_number(number: u64) {
    println!("{}", number);
}

pub fn print_archived(archive: &Path, report: &FetchReport) {
    println!(
        "{} {} issue(s) written, {} already present, archived in {}",
        "Done:".green().bold(),
        report.written.len(),
        report.skipped.len(),
        archive.display().to_string().cyan()
    );
}

/// Print self-test outcomes; returns whether every check passed
pub fn print_selftest(outcomes: &[Outcome]) -> bool {
    let mut failed = 0;
    for outcome in outcomes {
        if outcome.passed() {
            println!("{} {}", "ok".green(), outcome.name);
            continue;
        }
        failed += 1;
        println!("{} {}", "FAILED".red().bold(), outcome.name);
        if let Some(reason) = &outcome.failure {
            println!("    {}", reason.dimmed());
        }
    }

    println!();
    if failed == 0 {
        println!("{} {} checks passed", "ok".green().bold(), outcomes.len());
    } else {
        println!(
            "{} {} of {} checks failed",
            "FAILED".red().bold(),
            failed,
            outcomes.len()
        );
    }
    failed == 0
}
