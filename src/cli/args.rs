//! CLI argument definitions using clap

use crate::config::Settings;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sslexpiry")]
#[command(version)]
#[command(about = "SSL expiry checker", long_about = None)]
pub struct Cli {
    /// Check the specified server: [!]HOST[:PORT][/PROTOCOL]
    #[arg(value_name = "SERVER")]
    pub servers: Vec<String>,

    /// The number of days at which to warn of expiry [default: 30]
    #[arg(short, long)]
    pub days: Option<i64>,

    /// Read the servers to check from the specified file
    #[arg(short = 'f', long = "from-file", value_name = "FILENAME", action = ArgAction::Append)]
    pub from_file: Vec<PathBuf>,

    /// The number of seconds to allow for server response [default: 30]
    #[arg(short, long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Read serial numbers that must not be served from the specified file
    #[arg(short, long, value_name = "FILENAME")]
    pub blocklist: Option<PathBuf>,

    /// Ignore certificates in the chain beyond the leaf
    #[arg(long)]
    pub leaf_only: bool,

    /// Trust certificates from this PEM/DER file instead of the Mozilla roots
    #[arg(long, value_name = "FILENAME")]
    pub ca_file: Option<PathBuf>,

    /// Load settings from this TOML file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Exit with status 0 even when problems are found
    #[arg(long)]
    pub exit_zero: bool,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Display verbose output
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Apply command-line overrides on top of loaded settings
    pub fn apply_to(&self, settings: &mut Settings) {
        if let Some(days) = self.days {
            settings.days = days;
        }
        if let Some(timeout) = self.timeout {
            settings.timeout_secs = timeout;
        }
        if self.leaf_only {
            settings.leaf_only = true;
        }
    }
}
