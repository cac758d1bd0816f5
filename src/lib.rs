//! sslexpiry library
//!
//! Checks TLS certificate chains on network services:
//! - Port and STARTTLS protocol resolution (HTTPS, SMTP, IMAP and friends)
//! - SMTP and IMAP STARTTLS negotiation before the TLS upgrade
//! - Verified TLS handshake and certificate chain retrieval
//! - Chain policy evaluation: expiry, weak signatures, lifetime limits,
//!   distrusted authorities and blocklisted serials
//! - Urgency ranking of the results
//!
//! # Usage
//!
//! ```rust,ignore
//! use sslexpiry::checks::{fetch_chain, ConnectRequest};
//! use sslexpiry::certificate::{check_chain, EvaluationOptions};
//!
//! #[tokio::main]
//! async fn main() {
//!     let request = ConnectRequest::new("mail.example.com").port("submission");
//!     let chain = fetch_chain(&request).await.unwrap();
//!     let outcome = check_chain(&chain, EvaluationOptions::default(), chrono::Utc::now());
//!     println!("{}", outcome);
//! }
//! ```

pub mod certificate;
pub mod checks;
pub mod cli;
pub mod config;
pub mod models;
pub mod output;
pub mod runner;
pub mod utils;

// Re-export commonly used types
pub use certificate::{ChainEvaluator, EvaluationOptions};
pub use checks::{fetch_chain, ConnectRequest};
pub use cli::Cli;
pub use config::Settings;
pub use models::{Chain, Outcome, PolicyError, Target};
pub use utils::{ConfigError, ConnectError};
