//! sslexpiry - check TLS certificates on network services for problems
//!
//! Connects to each server given on the command line or in files, fetches
//! its certificate chain and reports certificates that have expired, expire
//! soon, or break certificate policy.

use anyhow::Context;
use clap::Parser;
use console::style;
use sslexpiry::checks::tls::install_crypto_provider;
use sslexpiry::config::{self, Settings};
use sslexpiry::output;
use sslexpiry::runner::{self, RunConfig};
use sslexpiry::{Cli, Target};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Install the ring crypto provider for rustls
    install_crypto_provider();

    // Initialize logging
    let default_level = if cli.verbose > 1 { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if cli.no_color {
        console::set_colors_enabled(false);
    }

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", style("Error:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load_from_file(path)?,
        None => Settings::load_default()?,
    };
    cli.apply_to(&mut settings);

    if let Some(path) = &cli.blocklist {
        settings.blocklist.extend(config::read_list_file(path)?);
    }

    let mut specs = cli.servers.clone();
    for path in &cli.from_file {
        specs.extend(config::read_list_file(path)?);
    }
    let targets = specs
        .iter()
        .map(|spec| spec.parse::<Target>())
        .collect::<Result<Vec<_>, _>>()?;

    let mut run_config = RunConfig::new(settings);
    if let Some(path) = &cli.ca_file {
        run_config.ca = Some(
            config::load_trust_anchors(path)
                .with_context(|| format!("loading CA file {}", path.display()))?,
        );
    }

    let report = runner::run(&targets, &run_config).await;

    if cli.json {
        output::print_json(&report)?;
    } else {
        output::print_report(&report, cli.verbose > 0);
    }

    Ok(ExitCode::from(runner::exit_status(&report, cli.exit_zero)))
}
