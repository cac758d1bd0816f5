//! Data models for sslexpiry
//!
//! This module contains the data structures passed between the pipeline
//! stages.

pub mod certificate;
pub mod outcome;
pub mod target;

pub use certificate::{Certificate, Chain};
pub use outcome::{
    compare_outcomes, rank_report, ConnectionFailure, Outcome, PolicyError, PolicyErrorKind,
};
pub use target::Target;
