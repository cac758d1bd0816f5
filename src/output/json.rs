//! JSON output formatter

use crate::models::Outcome;
use serde::Serialize;

/// One JSON report entry
#[derive(Serialize)]
pub struct JsonEntry<'a> {
    pub target: &'a str,
    pub result: &'a Outcome,
}

/// Render the ranked report as a JSON array, most urgent first
pub fn to_json(report: &[(String, Outcome)]) -> serde_json::Result<String> {
    let entries: Vec<JsonEntry<'_>> = report
        .iter()
        .map(|(target, result)| JsonEntry { target, result })
        .collect();
    serde_json::to_string_pretty(&entries)
}

/// Print the ranked report as JSON to stdout
pub fn print_json(report: &[(String, Outcome)]) -> serde_json::Result<()> {
    println!("{}", to_json(report)?);
    Ok(())
}
