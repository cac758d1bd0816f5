//! Terminal report rendering

use crate::models::Outcome;
use console::style;

/// Format one report line, or `None` when it should not be shown
pub fn format_line(label: &str, outcome: &Outcome, width: usize, verbose: bool) -> Option<String> {
    let text = format!("{:<width$} {}", label, outcome, width = width);
    match outcome {
        Outcome::SafeUntil(_) => verbose.then_some(text),
        Outcome::Policy(e) if !e.severe => Some(style(text).yellow().to_string()),
        Outcome::Policy(_) | Outcome::Connection(_) => Some(style(text).red().to_string()),
    }
}

/// Print the ranked report. Good results are only shown when verbose.
pub fn print_report(report: &[(String, Outcome)], verbose: bool) {
    let width = report
        .iter()
        .filter(|(_, outcome)| verbose || outcome.is_problem())
        .map(|(label, _)| label.len())
        .max()
        .unwrap_or(1);

    for (label, outcome) in report {
        if let Some(line) = format_line(label, outcome, width, verbose) {
            println!("{}", line);
        }
    }
}
