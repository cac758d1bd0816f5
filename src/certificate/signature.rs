//! Signature algorithm identification

/// Known signature algorithm OIDs and their conventional names
const SIGNATURE_ALGORITHMS: &[(&str, &str)] = &[
    ("1.2.840.113549.1.1.2", "md2WithRSAEncryption"),
    ("1.2.840.113549.1.1.4", "md5WithRSAEncryption"),
    ("1.2.840.113549.1.1.5", "sha1WithRSAEncryption"),
    ("1.3.14.3.2.29", "sha1WithRSASignature"),
    ("1.2.840.113549.1.1.10", "RSASSA-PSS"),
    ("1.2.840.113549.1.1.11", "sha256WithRSAEncryption"),
    ("1.2.840.113549.1.1.12", "sha384WithRSAEncryption"),
    ("1.2.840.113549.1.1.13", "sha512WithRSAEncryption"),
    ("1.2.840.113549.1.1.14", "sha224WithRSAEncryption"),
    ("1.2.840.10040.4.3", "dsa-with-sha1"),
    ("2.16.840.1.101.3.4.3.1", "dsa-with-sha224"),
    ("2.16.840.1.101.3.4.3.2", "dsa-with-sha256"),
    ("1.2.840.10045.4.1", "ecdsa-with-SHA1"),
    ("1.2.840.10045.4.3.1", "ecdsa-with-SHA224"),
    ("1.2.840.10045.4.3.2", "ecdsa-with-SHA256"),
    ("1.2.840.10045.4.3.3", "ecdsa-with-SHA384"),
    ("1.2.840.10045.4.3.4", "ecdsa-with-SHA512"),
    ("1.3.101.112", "Ed25519"),
    ("1.3.101.113", "Ed448"),
];

/// Name of the signature algorithm with dotted OID `oid`, if known
pub fn algorithm_name(oid: &str) -> Option<&'static str> {
    SIGNATURE_ALGORITHMS
        .iter()
        .find(|(known, _)| *known == oid)
        .map(|(_, name)| *name)
}

/// Whether an algorithm name uses MD5 or SHA-1. `sha1` directly followed by
/// a digit names some other digest and does not count.
pub fn is_deprecated(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    if lower.contains("md5") {
        return true;
    }
    lower.match_indices("sha1").any(|(at, m)| {
        !lower[at + m.len()..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(
            algorithm_name("1.2.840.113549.1.1.11"),
            Some("sha256WithRSAEncryption")
        );
        assert_eq!(algorithm_name("1.2.3.4"), None);
    }

    #[test]
    fn test_deprecated() {
        assert!(is_deprecated("sha1WithRSAEncryption"));
        assert!(is_deprecated("md5WithRSAEncryption"));
        assert!(is_deprecated("ecdsa-with-SHA1"));
        assert!(is_deprecated("dsa-with-sha1"));
        assert!(!is_deprecated("sha256WithRSAEncryption"));
        assert!(!is_deprecated("ecdsa-with-SHA512"));
        assert!(!is_deprecated("md2WithRSAEncryption"));
    }
}
