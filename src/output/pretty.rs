use colored::Colorize;

use crate::config::Configuration;
use crate::sync::{MoveReport, RunSummary, StopReason};

fn plural(count: usize) -> &'static str {
    if count == 1 {
        "item"
    } else {
        "items"
    }
}

/// One line per list set that changed, followed by the moved texts.
pub fn format_move_report(report: &MoveReport) -> String {
    let mut output = String::new();

    if !report.moved.is_empty() {
        output.push_str(&format!(
            "{} {} {} from {} to {}",
            "Moved".green().bold(),
            report.moved.len(),
            plural(report.moved.len()),
            report.secondary.dimmed(),
            report.primary.bold()
        ));
        for text in &report.moved {
            output.push_str(&format!("\n  {} {}", "[ ]".white(), text));
        }
    }

    if report.purged > 0 {
        if !output.is_empty() {
            output.push('\n');
        }
        output.push_str(&format!(
            "{} {} ticked {} from {}",
            "Cleared".yellow().bold(),
            report.purged,
            plural(report.purged),
            report.primary.bold()
        ));
    }

    output
}

/// Startup banner once settings are loaded and validated.
pub fn format_loaded(config: &Configuration) -> String {
    let mut output = format!(
        "{} Username: {}\n",
        "Loaded settings.".green(),
        config.username.bold()
    );
    for (index, set) in config.list_sets.iter().enumerate() {
        output.push_str(&format!(
            "  {}. {} {} {}\n",
            index + 1,
            set.secondary_list.dimmed(),
            "->".cyan(),
            set.primary_list.bold()
        ));
    }
    output.push_str(&format!(
        "Polling every {} ms. Press Ctrl-C to stop.",
        config.poll_interval.as_millis()
    ));
    output
}

/// Closing line after the loop ends.
pub fn format_summary(summary: &RunSummary) -> String {
    let how = match summary.reason {
        StopReason::Interrupted => "Interrupted".yellow().bold(),
        StopReason::CycleLimit => "Done".green().bold(),
    };
    format!(
        "{} after {} {}, {} {} moved",
        how,
        summary.cycles,
        if summary.cycles == 1 { "cycle" } else { "cycles" },
        summary.moved,
        plural(summary.moved)
    )
}
