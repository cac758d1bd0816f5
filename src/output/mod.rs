//! Output formatting module
//!
//! Provides the terminal report and JSON export.

pub mod json;
pub mod terminal;

pub use json::{print_json, to_json};
pub use terminal::{format_line, print_report};
