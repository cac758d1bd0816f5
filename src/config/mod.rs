//! Configuration module for sslexpiry
//!
//! Handles loading settings from TOML, list files (servers, blocklists) and
//! trusted CA certificates.

pub mod settings;

pub use settings::Settings;

use crate::utils::ConfigError;
use rustls::pki_types::CertificateDer;
use std::path::Path;

/// Read a list file: one entry per line, `#` starts a comment, blank lines
/// are ignored.
pub fn read_list_file<P: AsRef<Path>>(path: P) -> Result<Vec<String>, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.display().to_string(),
    })?;
    Ok(parse_list(&content))
}

fn parse_list(content: &str) -> Vec<String> {
    content
        .lines()
        .filter_map(|line| {
            let entry = line.split('#').next().unwrap_or_default().trim();
            (!entry.is_empty()).then(|| entry.to_string())
        })
        .collect()
}

/// Load trusted CA certificates from a PEM bundle or a single DER file
pub fn load_trust_anchors<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<CertificateDer<'static>>, ConfigError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|_| ConfigError::FileNotFound {
        path: path.display().to_string(),
    })?;

    if !bytes.starts_with(b"-----BEGIN") {
        return Ok(vec![CertificateDer::from(bytes)]);
    }

    let certs: Vec<CertificateDer<'static>> = ::pem::parse_many(&bytes)
        .map_err(|e| ConfigError::ParseError {
            message: format!("{}: {}", path.display(), e),
        })?
        .into_iter()
        .filter(|p| p.tag() == "CERTIFICATE")
        .map(|p| CertificateDer::from(p.into_contents()))
        .collect();

    if certs.is_empty() {
        return Err(ConfigError::InvalidValue {
            key: "ca".to_string(),
            message: format!("no certificates in {}", path.display()),
        });
    }
    Ok(certs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_strips_comments() {
        let list = parse_list("example.com\n# comment\n\n  mail.example.com:smtp  # mx\n");
        assert_eq!(list, vec!["example.com", "mail.example.com:smtp"]);
    }
}
