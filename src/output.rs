//! Terminal rendering of conversation outcomes and run summaries.

use crate::report::{ConversationOutcome, OutcomeStatus, RunReport};
use owo_colors::OwoColorize;

/// One line describing an outcome, without styling.
pub fn describe(outcome: &ConversationOutcome) -> String {
    match &outcome.status {
        OutcomeStatus::Created {
            output,
            turns,
            duration_secs,
        } => format!(
            "Created: {} ({} turns, {:.1}s)",
            output.display(),
            turns,
            duration_secs
        ),
        OutcomeStatus::Skipped { reason } => {
            format!("Skipping \"{}\", {}", outcome.id, reason)
        }
        OutcomeStatus::Failed { stage, error } => {
            format!("Failed processing \"{}\" ({}): {}", outcome.id, stage, error)
        }
    }
}

/// Print an outcome as soon as it is known.
///
/// Failures always go to stderr. Created and skipped conversations are
/// suppressed in quiet mode.
pub fn print_outcome(outcome: &ConversationOutcome, quiet: bool) {
    let line = describe(outcome);
    match outcome.status {
        OutcomeStatus::Failed { .. } => eprintln!("{}", line.red()),
        OutcomeStatus::Created { .. } if !quiet => println!("{}", line.green()),
        OutcomeStatus::Skipped { .. } if !quiet => println!("{}", line.dimmed()),
        _ => {}
    }
}

/// Summary line printed at the end of a run.
pub fn summary_line(report: &RunReport) -> String {
    let summary = report.summary();
    format!(
        "{} created, {} skipped, {} failed",
        summary.created, summary.skipped, summary.failed
    )
}

pub fn print_summary(report: &RunReport, quiet: bool) {
    if quiet {
        return;
    }
    let line = summary_line(report);
    if report.has_failures() {
        eprintln!("{}", line.yellow());
    } else {
        eprintln!("{}", line.dimmed());
    }
}
