//! Pluggable chain policy rules
//!
//! Narrow, time-bound rules live here behind small traits so the evaluation
//! loop does not need to know about them.

use crate::models::{Certificate, Chain};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Decides whether a certificate is skipped entirely during evaluation
pub trait ExemptionPolicy: Send + Sync {
    /// `preceding` holds the certificates before this one in the chain
    fn is_exempt(&self, certificate: &Certificate, preceding: &[Certificate]) -> bool;
}

/// Never exempts anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExemption;

impl ExemptionPolicy for NoExemption {
    fn is_exempt(&self, _certificate: &Certificate, _preceding: &[Certificate]) -> bool {
        false
    }
}

/// Serial of ISRG Root X1 as cross-signed by DST Root CA X3
pub const ISRG_ROOT_X1_SERIAL: &str = "4001772137D4E942B8EE76AA3C640AB7";
/// Serial of DST Root CA X3
pub const DST_ROOT_CA_X3_SERIAL: &str = "44AFB080D6A327BA893039862EF8406B";

/// Skips a superseded root once its successor has appeared earlier in the
/// chain. Servers may keep sending an expired cross-signing root after the
/// successor, and clients that know the successor ignore it.
#[derive(Debug, Clone)]
pub struct CrossSignTransition {
    pub successor_serial: String,
    pub superseded_serial: String,
}

impl Default for CrossSignTransition {
    fn default() -> Self {
        Self {
            successor_serial: ISRG_ROOT_X1_SERIAL.to_string(),
            superseded_serial: DST_ROOT_CA_X3_SERIAL.to_string(),
        }
    }
}

impl ExemptionPolicy for CrossSignTransition {
    fn is_exempt(&self, certificate: &Certificate, preceding: &[Certificate]) -> bool {
        certificate.has_serial(&self.superseded_serial)
            && preceding
                .iter()
                .any(|c| c.has_serial(&self.successor_serial))
    }
}

/// Supplies a policy date after which a certificate is no longer trusted,
/// independent of its own expiry
pub trait DistrustPolicy: Send + Sync {
    fn distrust_date(&self, chain: &Chain, position: usize) -> Option<DateTime<Utc>>;
}

/// No certificate authority is distrusted
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDistrust;

impl DistrustPolicy for NoDistrust {
    fn distrust_date(&self, _chain: &Chain, _position: usize) -> Option<DateTime<Utc>> {
        None
    }
}

/// One authority distrust rule
#[derive(Debug, Clone, Deserialize)]
pub struct DistrustRule {
    /// Matched as a substring of any issuer common name from the checked
    /// certificate up to the end of the chain
    pub issuer: String,
    /// Only certificates with `not_before` earlier than this are affected
    #[serde(default)]
    pub issued_before: Option<DateTime<Utc>>,
    /// Date from which matching certificates are distrusted
    pub distrusted_from: DateTime<Utc>,
}

impl DistrustRule {
    fn applies(&self, chain: &Chain, position: usize) -> bool {
        let Some(certificate) = chain.get(position) else {
            return false;
        };
        if let Some(cutoff) = self.issued_before {
            if certificate.not_before >= cutoff {
                return false;
            }
        }
        chain.as_slice()[position..].iter().any(|c| {
            c.issuer_cn
                .as_deref()
                .is_some_and(|cn| cn.contains(&self.issuer))
        })
    }
}

/// Distrusts certificates issued by configured authorities
#[derive(Debug, Clone, Default)]
pub struct IssuerDistrust {
    pub rules: Vec<DistrustRule>,
}

impl IssuerDistrust {
    pub fn new(rules: Vec<DistrustRule>) -> Self {
        Self { rules }
    }
}

impl DistrustPolicy for IssuerDistrust {
    /// Earliest distrust date among the matching rules
    fn distrust_date(&self, chain: &Chain, position: usize) -> Option<DateTime<Utc>> {
        self.rules
            .iter()
            .filter(|rule| rule.applies(chain, position))
            .map(|rule| rule.distrusted_from)
            .min()
    }
}
