//! Port and protocol resolution
//!
//! Maps a port specifier to a concrete port and the STARTTLS protocol the
//! service implies.

use crate::checks::starttls::StarttlsProtocol;
use crate::utils::ConfigError;

pub const DEFAULT_PORT: u16 = 443;

/// A resolved port with its implied handshake protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortInfo {
    pub port: u16,
    pub protocol: Option<StarttlsProtocol>,
}

impl PortInfo {
    const fn plain(port: u16) -> Self {
        Self {
            port,
            protocol: None,
        }
    }

    const fn with_protocol(port: u16, protocol: StarttlsProtocol) -> Self {
        Self {
            port,
            protocol: Some(protocol),
        }
    }
}

impl From<u16> for PortInfo {
    fn from(port: u16) -> Self {
        PortInfo::plain(port)
    }
}

/// Look up a well-known service name
fn named_port(name: &str) -> Option<PortInfo> {
    let info = match name {
        "https" => PortInfo::plain(443),
        "imap" => PortInfo::with_protocol(143, StarttlsProtocol::Imap),
        "imaps" => PortInfo::plain(993),
        "pop3s" => PortInfo::plain(995),
        "smtp" => PortInfo::with_protocol(25, StarttlsProtocol::Smtp),
        "smtps" => PortInfo::plain(465),
        "submission" => PortInfo::with_protocol(587, StarttlsProtocol::Smtp),
        _ => return None,
    };
    Some(info)
}

/// Resolve a port specifier: absent or empty means 443, digits are a
/// literal port, anything else must be a known service name.
pub fn resolve(spec: Option<&str>) -> Result<PortInfo, ConfigError> {
    let spec = match spec {
        None | Some("") => return Ok(PortInfo::plain(DEFAULT_PORT)),
        Some(spec) => spec,
    };

    if spec.bytes().all(|b| b.is_ascii_digit()) {
        return spec
            .parse::<u16>()
            .map(PortInfo::plain)
            .map_err(|_| ConfigError::unknown_port(spec));
    }

    named_port(spec).ok_or_else(|| ConfigError::unknown_port(spec))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_port() {
        assert_eq!(resolve(None).unwrap(), PortInfo::plain(443));
        assert_eq!(resolve(Some("")).unwrap(), PortInfo::plain(443));
    }

    #[test]
    fn test_numeric_port() {
        assert_eq!(resolve(Some("8443")).unwrap(), PortInfo::plain(8443));
        assert_eq!(PortInfo::from(25).protocol, None);
    }

    #[test]
    fn test_named_ports() {
        let cases = [
            ("https", 443, None),
            ("imap", 143, Some(StarttlsProtocol::Imap)),
            ("imaps", 993, None),
            ("pop3s", 995, None),
            ("smtp", 25, Some(StarttlsProtocol::Smtp)),
            ("smtps", 465, None),
            ("submission", 587, Some(StarttlsProtocol::Smtp)),
        ];
        for (name, port, protocol) in cases {
            let info = resolve(Some(name)).unwrap();
            assert_eq!(info.port, port, "{}", name);
            assert_eq!(info.protocol, protocol, "{}", name);
        }
    }

    #[test]
    fn test_unknown_port_names_input() {
        let err = resolve(Some("gopher")).unwrap_err();
        assert_eq!(err.to_string(), "Unknown port gopher");
        assert!(resolve(Some("HTTPS")).is_err());
        assert!(resolve(Some("70000")).is_err());
    }
}
