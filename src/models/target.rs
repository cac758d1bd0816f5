//! Target specifiers
//!
//! Grammar: `[!]<host>[:<port>][/<protocol>]`. The protocol is split off
//! first, then the port. A leading `!` only marks the target for display.

use crate::utils::ConfigError;
use std::fmt;
use std::str::FromStr;

/// A server to check, as written by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// The specifier exactly as given; used as the report key
    pub label: String,
    pub host: String,
    pub port: Option<String>,
    pub protocol: Option<String>,
    /// Whether the specifier carried the leading `!` marker
    pub marked: bool,
}

impl FromStr for Target {
    type Err = ConfigError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let label = spec.trim().to_string();

        let (rest, protocol) = first_two(&label, '/');
        let (host, port) = first_two(rest, ':');
        let (host, marked) = match host.strip_prefix('!') {
            Some(host) => (host, true),
            None => (host, false),
        };

        if host.is_empty() {
            return Err(ConfigError::InvalidTarget { target: label });
        }

        Ok(Self {
            host: host.to_string(),
            port: port.filter(|p| !p.is_empty()).map(str::to_string),
            protocol: protocol.filter(|p| !p.is_empty()).map(str::to_string),
            marked,
            label,
        })
    }
}

/// The first two `sep`-separated fields of `s`; anything after a second
/// separator is dropped
fn first_two(s: &str, sep: char) -> (&str, Option<&str>) {
    let mut fields = s.split(sep);
    let first = fields.next().unwrap_or_default();
    (first, fields.next())
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}
