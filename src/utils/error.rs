//! Custom error types for sslexpiry
//!
//! This module defines domain-specific error types using `thiserror` for
//! the failure modes of the connection pipeline and its configuration.
//! Certificate-policy violations are not errors here; they are values
//! carried by [`crate::models::Outcome`].

use std::fmt;
use thiserror::Error;

/// Which part of a target specifier could not be recognised
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecifierKind {
    Port,
    Protocol,
}

impl fmt::Display for SpecifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecifierKind::Port => write!(f, "port"),
            SpecifierKind::Protocol => write!(f, "protocol"),
        }
    }
}

/// Configuration errors, all raised before any network I/O
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown {kind} {value}")]
    UnknownPortOrProtocol { kind: SpecifierKind, value: String },

    #[error("Invalid target: {target}")]
    InvalidTarget { target: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to parse configuration: {message}")]
    ParseError { message: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

impl ConfigError {
    pub fn unknown_port(value: impl Into<String>) -> Self {
        ConfigError::UnknownPortOrProtocol {
            kind: SpecifierKind::Port,
            value: value.into(),
        }
    }

    pub fn unknown_protocol(value: impl Into<String>) -> Self {
        ConfigError::UnknownPortOrProtocol {
            kind: SpecifierKind::Protocol,
            value: value.into(),
        }
    }
}

/// STARTTLS negotiation errors
#[derive(Error, Debug)]
pub enum NegotiationError {
    #[error("Unexpected {stage}: {line}")]
    UnexpectedResponse { stage: &'static str, line: String },

    #[error("{protocol} server does not support STARTTLS")]
    StarttlsUnsupported { protocol: &'static str },

    #[error("Connection closed by server during STARTTLS")]
    ConnectionClosed,

    #[error("Connection closed mid-line during STARTTLS: {partial}")]
    PartialLine { partial: String },

    #[error("Response line longer than {limit} bytes during STARTTLS")]
    LineTooLong { limit: u64 },

    #[error("Server sent data before the TLS upgrade")]
    UnexpectedData,

    #[error("IO error during STARTTLS: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of a single connection attempt
#[derive(Error, Debug)]
pub enum ConnectError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid server name: {name}")]
    InvalidServerName { name: String },

    #[error("Failed to connect to {host}:{port}: {message}")]
    Tcp {
        host: String,
        port: u16,
        message: String,
    },

    #[error("Timeout connecting to server")]
    Timeout,

    #[error(transparent)]
    Negotiation(#[from] NegotiationError),

    #[error("TLS handshake failed: {message}")]
    Handshake { message: String },

    #[error("{message}")]
    Unauthorized { message: String },

    #[error("TLS configuration error: {message}")]
    TlsConfig { message: String },

    #[error("No certificates received from server")]
    NoCertificates,

    #[error(transparent)]
    Certificate(#[from] CertificateError),
}

/// Certificate decoding errors
#[derive(Error, Debug)]
pub enum CertificateError {
    #[error("Failed to parse certificate: {message}")]
    ParseError { message: String },

    #[error("Certificate has an invalid {field} timestamp")]
    InvalidTimestamp { field: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_specifier_messages() {
        assert_eq!(ConfigError::unknown_port("gopher").to_string(), "Unknown port gopher");
        assert_eq!(
            ConfigError::unknown_protocol("pop3").to_string(),
            "Unknown protocol pop3"
        );
    }

    #[test]
    fn test_connect_error_passes_through_inner_messages() {
        let err = ConnectError::from(NegotiationError::StarttlsUnsupported { protocol: "IMAP" });
        assert_eq!(err.to_string(), "IMAP server does not support STARTTLS");

        let err = ConnectError::from(ConfigError::unknown_port("99999"));
        assert_eq!(err.to_string(), "Unknown port 99999");
    }

    #[test]
    fn test_certificate_errors_surface_through_connect_error() {
        let err: ConnectError = CertificateError::InvalidTimestamp { field: "notAfter" }.into();
        assert!(matches!(err, ConnectError::Certificate(_)));
        assert_eq!(err.to_string(), "Certificate has an invalid notAfter timestamp");
        assert_eq!(ConnectError::Timeout.to_string(), "Timeout connecting to server");
    }
}
