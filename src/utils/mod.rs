//! Utility modules for sslexpiry
//!
//! This module contains the error types shared by the pipeline.

pub mod error;

pub use error::{CertificateError, ConfigError, ConnectError, NegotiationError, SpecifierKind};
