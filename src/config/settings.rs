//! Application settings configuration
//!
//! Defines per-run options: warning threshold, timeouts, STARTTLS client
//! name, serial blocklist and distrust rules.

use crate::certificate::{
    ChainEvaluator, DistrustRule, EvaluationOptions, IssuerDistrust, DEFAULT_THRESHOLD_DAYS,
};
use crate::checks::starttls::DEFAULT_CLIENT_NAME;
use crate::utils::ConfigError;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

fn default_days() -> i64 {
    DEFAULT_THRESHOLD_DAYS
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_client_name() -> String {
    DEFAULT_CLIENT_NAME.to_string()
}

fn default_parallel() -> usize {
    64
}

/// Application settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Warn when a certificate has fewer than this many days left
    #[serde(default = "default_days")]
    pub days: i64,
    /// Seconds allowed for connect through TLS handshake; 0 disables
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Name sent in SMTP `EHLO`
    #[serde(default = "default_client_name")]
    pub client_name: String,
    /// Ignore certificates beyond the leaf
    #[serde(default)]
    pub leaf_only: bool,
    /// Maximum number of servers checked at once
    #[serde(default = "default_parallel")]
    pub parallel: usize,
    /// Serial numbers that must not be served
    #[serde(default)]
    pub blocklist: Vec<String>,
    #[serde(default)]
    pub distrust: Vec<DistrustRule>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            days: default_days(),
            timeout_secs: default_timeout_secs(),
            client_name: default_client_name(),
            leaf_only: false,
            parallel: default_parallel(),
            blocklist: Vec::new(),
            distrust: Vec::new(),
        }
    }
}

impl Settings {
    /// Load settings from the default config file
    pub fn load_default() -> Result<Self, ConfigError> {
        let config_path = Path::new("config/default.toml");
        if config_path.exists() {
            Self::load_from_file(config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load settings from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let settings: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.parallel == 0 {
            return Err(ConfigError::InvalidValue {
                key: "parallel".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.client_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "client_name".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Connection timeout, `None` when disabled
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    pub fn evaluation_options(&self) -> EvaluationOptions {
        EvaluationOptions {
            threshold_days: self.days,
            blocklist: self.blocklist.clone(),
            leaf_only: self.leaf_only,
        }
    }

    /// Build the chain evaluator these settings describe
    pub fn evaluator(&self) -> ChainEvaluator {
        ChainEvaluator::new(self.evaluation_options())
            .with_distrust_policy(IssuerDistrust::new(self.distrust.clone()))
    }
}
