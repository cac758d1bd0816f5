//! Check orchestration engine
//!
//! Runs one independent check per target concurrently and collects a single
//! outcome for each. Failures stay local to their own target.

use crate::certificate::ChainEvaluator;
use crate::checks::tls::{fetch_chain, ConnectRequest};
use crate::config::Settings;
use crate::models::{rank_report, Outcome, Target};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use rustls::pki_types::CertificateDer;
use std::collections::BTreeMap;

/// Configuration for a check run
pub struct RunConfig {
    pub settings: Settings,
    /// Trusted CA override for every connection
    pub ca: Option<Vec<CertificateDer<'static>>>,
}

impl RunConfig {
    pub fn new(settings: Settings) -> Self {
        Self { settings, ca: None }
    }

    fn request_for(&self, target: &Target) -> ConnectRequest {
        let mut request = ConnectRequest::new(&target.host).client_name(&self.settings.client_name);
        request.port = target.port.clone();
        request.protocol = target.protocol.clone();
        request.timeout = self.settings.timeout();
        request.ca = self.ca.clone();
        request
    }
}

/// Exit status when any target has a problem
pub const EXIT_ISSUES_FOUND: u8 = 74;

/// Connect to one target and evaluate its chain
pub async fn check_target(
    target: &Target,
    config: &RunConfig,
    evaluator: &ChainEvaluator,
) -> Outcome {
    let request = config.request_for(target);
    match fetch_chain(&request).await {
        Ok(chain) => {
            let outcome = evaluator.evaluate(&chain, Utc::now());
            tracing::debug!("{}: {}", target.label, outcome);
            outcome
        }
        Err(e) => {
            tracing::warn!("{}: {}", target.label, e);
            Outcome::connection(e.to_string())
        }
    }
}

/// Check every target and return the outcomes keyed by target label
pub async fn check_targets(targets: &[Target], config: &RunConfig) -> BTreeMap<String, Outcome> {
    let evaluator = config.settings.evaluator();
    let evaluator = &evaluator;

    stream::iter(targets)
        .map(|target| async move {
            let outcome = check_target(target, config, evaluator).await;
            (target.label.clone(), outcome)
        })
        .buffer_unordered(config.settings.parallel.max(1))
        .collect()
        .await
}

/// Check every target and return the outcomes most urgent first
pub async fn run(targets: &[Target], config: &RunConfig) -> Vec<(String, Outcome)> {
    rank_report(check_targets(targets, config).await)
}

/// Process exit status for a finished report: [`EXIT_ISSUES_FOUND`] if any
/// target failed to connect or broke policy, unless `exit_zero` is set
pub fn exit_status(report: &[(String, Outcome)], exit_zero: bool) -> u8 {
    if !exit_zero && report.iter().any(|(_, outcome)| outcome.is_problem()) {
        EXIT_ISSUES_FOUND
    } else {
        0
    }
}
