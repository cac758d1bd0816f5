//! Certificate chain policy evaluation
//!
//! Every certificate in the chain is checked on its own and the most urgent
//! result wins. A chain with no problems is good until its earliest end date.

use crate::certificate::policy::{CrossSignTransition, DistrustPolicy, ExemptionPolicy, NoDistrust};
use crate::certificate::signature;
use crate::models::{compare_outcomes, Chain, Outcome, PolicyError, PolicyErrorKind};
use chrono::{DateTime, TimeZone, Utc};
use std::cmp::Ordering;

/// Certificates issued on or after this date may not be valid for more than
/// [`MAX_LIFETIME_DAYS`]
pub fn lifetime_cutover() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2018, 3, 1, 0, 0, 0).unwrap()
}

pub const MAX_LIFETIME_DAYS: i64 = 825;

pub const DEFAULT_THRESHOLD_DAYS: i64 = 30;

/// Per-run evaluation options
#[derive(Debug, Clone)]
pub struct EvaluationOptions {
    /// Warn when a certificate has fewer than this many days left
    pub threshold_days: i64,
    /// Serial numbers that must never be served
    pub blocklist: Vec<String>,
    /// Only evaluate the leaf certificate
    pub leaf_only: bool,
}

impl Default for EvaluationOptions {
    fn default() -> Self {
        Self {
            threshold_days: DEFAULT_THRESHOLD_DAYS,
            blocklist: Vec::new(),
            leaf_only: false,
        }
    }
}

/// Why a certificate stops working on its end date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EndReason {
    Expiry,
    Distrust,
}

impl EndReason {
    fn as_str(&self) -> &'static str {
        match self {
            EndReason::Expiry => "expiry",
            EndReason::Distrust => "distrust",
        }
    }
}

fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%d %b %Y").to_string()
}

/// Evaluates certificate chains against the trust policy
pub struct ChainEvaluator {
    options: EvaluationOptions,
    exemption: Box<dyn ExemptionPolicy>,
    distrust: Box<dyn DistrustPolicy>,
}

impl ChainEvaluator {
    /// Create an evaluator with the default exemption rule and no distrusted
    /// authorities
    pub fn new(options: EvaluationOptions) -> Self {
        Self {
            options,
            exemption: Box::new(CrossSignTransition::default()),
            distrust: Box::new(NoDistrust),
        }
    }

    pub fn with_exemption_policy(mut self, policy: impl ExemptionPolicy + 'static) -> Self {
        self.exemption = Box::new(policy);
        self
    }

    pub fn with_distrust_policy(mut self, policy: impl DistrustPolicy + 'static) -> Self {
        self.distrust = Box::new(policy);
        self
    }

    pub fn options(&self) -> &EvaluationOptions {
        &self.options
    }

    /// Evaluate the whole chain as of `now`
    pub fn evaluate(&self, chain: &Chain, now: DateTime<Utc>) -> Outcome {
        let limit = if self.options.leaf_only { 1 } else { chain.len() };
        let mut worst: Option<Outcome> = None;

        for (position, certificate) in chain.iter().enumerate().take(limit) {
            if self
                .exemption
                .is_exempt(certificate, &chain.as_slice()[..position])
            {
                tracing::debug!(
                    "Skipping exempt certificate {} ({})",
                    position + 1,
                    certificate.display_name()
                );
                continue;
            }

            let outcome = match self.evaluate_certificate(chain, position, now) {
                Ok(date) => Outcome::SafeUntil(date),
                Err(err) => {
                    tracing::debug!("Certificate {}: {}", position + 1, err);
                    Outcome::Policy(err)
                }
            };

            let replace = worst
                .as_ref()
                .map_or(true, |w| compare_outcomes(&outcome, w) == Ordering::Less);
            if replace {
                worst = Some(outcome);
            }
        }

        worst.unwrap_or_else(|| {
            Outcome::Policy(PolicyError::severe(
                PolicyErrorKind::EmptyChain,
                "Certificate chain is empty",
                None,
            ))
        })
    }

    /// Check one certificate; the first failing rule decides its outcome
    fn evaluate_certificate(
        &self,
        chain: &Chain,
        position: usize,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, PolicyError> {
        let certificate = &chain.as_slice()[position];
        let is_leaf = position == 0;
        let not_after = certificate.not_after;
        let pos = if is_leaf {
            "Certificate".to_string()
        } else {
            format!("Certificate {} in chain", position + 1)
        };

        if self
            .options
            .blocklist
            .iter()
            .any(|serial| certificate.has_serial(serial))
        {
            let message = if is_leaf {
                "Serial number is on the bad list".to_string()
            } else {
                format!("{} serial number is on the bad list", pos)
            };
            return Err(PolicyError::severe(
                PolicyErrorKind::Blocklisted,
                message,
                Some(not_after),
            ));
        }

        if not_after <= now {
            return Err(PolicyError::severe(
                PolicyErrorKind::Expired,
                format!("{} expired on {}!", pos, format_date(&not_after)),
                Some(not_after),
            ));
        }

        if is_leaf {
            match signature::algorithm_name(&certificate.signature_oid) {
                None => {
                    return Err(PolicyError::warning(
                        PolicyErrorKind::UnknownAlgorithm,
                        "Signature algorithm is unknown",
                        Some(not_after),
                    ));
                }
                Some(name) if signature::is_deprecated(name) => {
                    return Err(PolicyError::severe(
                        PolicyErrorKind::WeakSignature,
                        format!("Signature algorithm is {}", name),
                        Some(not_after),
                    ));
                }
                Some(_) => {}
            }
        }

        let (end_date, reason) = match is_leaf
            .then(|| self.distrust.distrust_date(chain, position))
            .flatten()
        {
            Some(distrust) if distrust < not_after => (distrust, EndReason::Distrust),
            _ => (not_after, EndReason::Expiry),
        };

        if end_date <= now {
            return Err(PolicyError::severe(
                PolicyErrorKind::Distrusted,
                format!("{} became distrusted on {}!", pos, format_date(&end_date)),
                Some(end_date),
            ));
        }

        let days_to_live = (end_date - now).num_days();
        if days_to_live < self.options.threshold_days {
            return Err(PolicyError::warning(
                PolicyErrorKind::ExpiringSoon,
                format!(
                    "{} {} date is {} - {} day{}",
                    pos,
                    reason.as_str(),
                    format_date(&end_date),
                    days_to_live,
                    if days_to_live == 1 { "" } else { "s" }
                ),
                Some(end_date),
            ));
        }

        let lifetime_days = (not_after - certificate.not_before).num_days();
        if is_leaf
            && certificate.not_before >= lifetime_cutover()
            && lifetime_days > MAX_LIFETIME_DAYS
        {
            return Err(PolicyError::severe(
                PolicyErrorKind::LifetimeTooLong,
                format!("Certificate lifetime of {} is too long", lifetime_days),
                Some(end_date),
            ));
        }

        Ok(end_date)
    }
}

/// Evaluate `chain` with the default policies
pub fn check_chain(chain: &Chain, options: EvaluationOptions, now: DateTime<Utc>) -> Outcome {
    ChainEvaluator::new(options).evaluate(chain, now)
}
