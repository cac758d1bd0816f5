//! Certificate policy module
//!
//! This module provides:
//! - Whole-chain policy evaluation (expiry, weak signatures, lifetime limits)
//! - Pluggable exemption and distrust rules
//! - Signature algorithm identification

pub mod evaluate;
pub mod policy;
pub mod signature;

pub use evaluate::{check_chain, ChainEvaluator, EvaluationOptions, DEFAULT_THRESHOLD_DAYS};
pub use policy::{
    CrossSignTransition, DistrustPolicy, DistrustRule, ExemptionPolicy, IssuerDistrust,
    NoDistrust, NoExemption,
};
