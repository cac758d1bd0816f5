//! Per-target outcomes and their urgency ordering
//!
//! Every target produces exactly one [`Outcome`]. Outcomes are ranked most
//! urgent first by [`compare_outcomes`]; the ordering is derived from a sort
//! key so it is a consistent total preorder over any set of outcomes.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// What kind of policy rule a certificate broke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PolicyErrorKind {
    Expired,
    Blocklisted,
    UnknownAlgorithm,
    WeakSignature,
    Distrusted,
    ExpiringSoon,
    LifetimeTooLong,
    EmptyChain,
}

/// A certificate-policy violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyError {
    #[serde(skip)]
    pub kind: PolicyErrorKind,
    pub message: String,
    /// Already failing, or about to cause an outage
    pub severe: bool,
    /// When the certificate stops (or stopped) working
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
}

impl PolicyError {
    pub fn severe(
        kind: PolicyErrorKind,
        message: impl Into<String>,
        end_date: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            severe: true,
            end_date,
        }
    }

    pub fn warning(
        kind: PolicyErrorKind,
        message: impl Into<String>,
        end_date: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            severe: false,
            end_date,
        }
    }
}

impl fmt::Display for PolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// A connection attempt that never produced a chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionFailure {
    pub message: String,
}

/// The single final result for one target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    /// No problems; the chain is good until this date
    SafeUntil(DateTime<Utc>),
    Policy(PolicyError),
    Connection(ConnectionFailure),
}

impl Outcome {
    pub fn connection(message: impl Into<String>) -> Self {
        Outcome::Connection(ConnectionFailure {
            message: message.into(),
        })
    }

    pub fn is_problem(&self) -> bool {
        !matches!(self, Outcome::SafeUntil(_))
    }

    pub fn is_connection_failure(&self) -> bool {
        matches!(self, Outcome::Connection(_))
    }

    /// Urgency key, smallest first:
    /// connection failures, then policy errors (severe first, dated before
    /// undated, earlier end first), then safe dates (earliest first).
    fn urgency_key(&self) -> (u8, bool, bool, Option<DateTime<Utc>>) {
        match self {
            Outcome::Connection(_) => (0, false, false, None),
            Outcome::Policy(e) => (1, !e.severe, e.end_date.is_none(), e.end_date),
            Outcome::SafeUntil(date) => (2, false, false, Some(*date)),
        }
    }
}

impl From<PolicyError> for Outcome {
    fn from(err: PolicyError) -> Self {
        Outcome::Policy(err)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::SafeUntil(date) => write!(f, "{}", date.format("%d %b %Y")),
            Outcome::Policy(e) => write!(f, "{}", e.message),
            Outcome::Connection(e) => write!(f, "{}", e.message),
        }
    }
}

/// Compare two outcomes; `Less` means `a` is more urgent than `b`
pub fn compare_outcomes(a: &Outcome, b: &Outcome) -> Ordering {
    a.urgency_key().cmp(&b.urgency_key())
}

/// Order a completed result set most urgent first, breaking ties by label
pub fn rank_report(results: BTreeMap<String, Outcome>) -> Vec<(String, Outcome)> {
    let mut ranked: Vec<(String, Outcome)> = results.into_iter().collect();
    ranked.sort_by(|(label_a, a), (label_b, b)| {
        compare_outcomes(a, b).then_with(|| label_a.cmp(label_b))
    });
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(n)
    }

    #[test]
    fn test_problem_outranks_date() {
        let warn = Outcome::from(PolicyError::warning(PolicyErrorKind::ExpiringSoon, "x", None));
        assert_eq!(compare_outcomes(&warn, &Outcome::SafeUntil(day(0))), Ordering::Less);
        assert_eq!(
            compare_outcomes(&Outcome::SafeUntil(day(0)), &Outcome::connection("x")),
            Ordering::Greater
        );
    }

    #[test]
    fn test_dated_policy_error_outranks_undated() {
        let dated = Outcome::from(PolicyError::severe(PolicyErrorKind::Expired, "a", Some(day(9))));
        let undated = Outcome::from(PolicyError::severe(PolicyErrorKind::Blocklisted, "b", None));
        assert_eq!(compare_outcomes(&dated, &undated), Ordering::Less);
    }

    #[test]
    fn test_equal_end_dates_tie() {
        let end = Some(day(3));
        let a = Outcome::from(PolicyError::warning(PolicyErrorKind::ExpiringSoon, "a", end));
        let b = Outcome::from(PolicyError::warning(PolicyErrorKind::Distrusted, "b", end));
        assert_eq!(compare_outcomes(&a, &b), Ordering::Equal);
        assert_eq!(
            compare_outcomes(&Outcome::connection("a"), &Outcome::connection("b")),
            Ordering::Equal
        );
    }

    #[test]
    fn test_serializes_date_or_error_object() {
        let date = serde_json::to_value(Outcome::SafeUntil(day(0))).unwrap();
        assert!(date.is_string());

        let err = serde_json::to_value(Outcome::from(PolicyError::severe(
            PolicyErrorKind::Expired,
            "expired",
            Some(day(0)),
        )))
        .unwrap();
        assert_eq!(err["message"], "expired");
        assert_eq!(err["severe"], true);
        assert!(err.get("endDate").is_some());
        assert!(err.get("kind").is_none());
    }
}
