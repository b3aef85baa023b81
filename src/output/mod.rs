//! Operator-facing output for tickmove.
//!
//! Diagnostics go through `tracing`; the lines here are the ones a person
//! watching the terminal cares about.

mod pretty;

use crate::sync::CycleOutcome;

pub use pretty::*;

/// Print whatever a cycle has to say. Quiet cycles print nothing.
pub fn print_cycle(outcome: &CycleOutcome) {
    if let CycleOutcome::Moved(reports) = outcome {
        for report in reports.iter().filter(|r| !r.is_empty()) {
            println!("{}", format_move_report(report));
        }
    }
}
