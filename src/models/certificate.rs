//! Certificate and chain types
//!
//! A [`Chain`] owns its certificates in presentation order, leaf first. The
//! issuer of the certificate at position `n` is the one at `n + 1`, so there
//! are no back-references to follow and traversal always terminates.

use crate::utils::CertificateError;
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use x509_parser::prelude::*;

/// A decoded X.509 certificate, reduced to what the policy checks need
#[derive(Debug, Clone, Serialize)]
pub struct Certificate {
    /// Subject common name, if present
    pub subject_cn: Option<String>,
    /// Issuer common name, if present
    pub issuer_cn: Option<String>,
    /// Full subject distinguished name
    pub subject: String,
    /// Full issuer distinguished name
    pub issuer: String,
    /// Serial number as uppercase hex without separators
    pub serial: String,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    /// Dotted OID of the outer signature algorithm
    pub signature_oid: String,
    #[serde(skip)]
    pub raw_der: Vec<u8>,
}

impl Certificate {
    /// Decode a DER-encoded certificate
    pub fn from_der(der: &[u8]) -> Result<Self, CertificateError> {
        let (_, cert) =
            X509Certificate::from_der(der).map_err(|e| CertificateError::ParseError {
                message: format!("{:?}", e),
            })?;

        Ok(Self {
            subject_cn: common_name(cert.subject()),
            issuer_cn: common_name(cert.issuer()),
            subject: cert.subject().to_string(),
            issuer: cert.issuer().to_string(),
            serial: hex::encode_upper(cert.serial.to_bytes_be()),
            not_before: asn1_time_to_datetime(cert.validity().not_before, "notBefore")?,
            not_after: asn1_time_to_datetime(cert.validity().not_after, "notAfter")?,
            signature_oid: cert.signature_algorithm.algorithm.to_id_string(),
            raw_der: der.to_vec(),
        })
    }

    /// Whether subject and issuer are the same name
    pub fn is_self_signed(&self) -> bool {
        self.subject == self.issuer
    }

    /// Whether this certificate's serial matches `serial`, ignoring case and
    /// `:` separators
    pub fn has_serial(&self, serial: &str) -> bool {
        let wanted: String = serial.chars().filter(|c| *c != ':').collect();
        self.serial.eq_ignore_ascii_case(&wanted)
    }

    /// Display name used in messages and logs
    pub fn display_name(&self) -> &str {
        self.subject_cn.as_deref().unwrap_or(&self.subject)
    }
}

fn common_name(name: &X509Name) -> Option<String> {
    name.iter_common_name()
        .next()
        .and_then(|cn| cn.as_str().ok())
        .map(|s| s.to_string())
}

fn asn1_time_to_datetime(
    time: ASN1Time,
    field: &'static str,
) -> Result<DateTime<Utc>, CertificateError> {
    Utc.timestamp_opt(time.timestamp(), 0)
        .single()
        .ok_or(CertificateError::InvalidTimestamp { field })
}

/// An ordered certificate chain, leaf first
#[derive(Debug, Clone, Default, Serialize)]
pub struct Chain {
    certificates: Vec<Certificate>,
}

impl Chain {
    pub fn new(certificates: Vec<Certificate>) -> Self {
        Self { certificates }
    }

    /// Decode every certificate in presentation order
    pub fn from_der_iter<'a, I>(ders: I) -> Result<Self, CertificateError>
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        let certificates = ders
            .into_iter()
            .map(Certificate::from_der)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { certificates })
    }

    pub fn leaf(&self) -> Option<&Certificate> {
        self.certificates.first()
    }

    pub fn last(&self) -> Option<&Certificate> {
        self.certificates.last()
    }

    /// The certificate that issued the one at `position`, if the chain has it
    pub fn issuer_of(&self, position: usize) -> Option<&Certificate> {
        self.certificates.get(position + 1)
    }

    pub fn get(&self, position: usize) -> Option<&Certificate> {
        self.certificates.get(position)
    }

    pub fn push(&mut self, certificate: Certificate) {
        self.certificates.push(certificate);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Certificate> {
        self.certificates.iter()
    }

    pub fn as_slice(&self) -> &[Certificate] {
        &self.certificates
    }

    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }
}

impl<'a> IntoIterator for &'a Chain {
    type Item = &'a Certificate;
    type IntoIter = std::slice::Iter<'a, Certificate>;

    fn into_iter(self) -> Self::IntoIter {
        self.certificates.iter()
    }
}
