//! The fixed rule set a certificate is graded on.
//!
//! [`run_all`] evaluates every rule independently and always returns one result per
//! [`Rule`], in declaration order. Rules 1 and 2 both report an expired
//! certificate; grading counts both.

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum_macros::{Display, EnumIter};

use crate::certificate::{CertificateRecord, LeafMetadata};
use crate::hostname;
use crate::report::ConnectionInfo;

/// Days before expiry at which the expiration rule starts warning.
pub const EXPIRY_WARNING_DAYS: i64 = 30;
pub const MIN_KEY_BITS: u32 = 2048;
pub const WEAK_KEY_BITS: u32 = 1024;
const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumIter)]
pub enum Rule {
    #[serde(rename = "Certificate Validity")]
    #[strum(serialize = "Certificate Validity")]
    CertificateValidity,
    #[serde(rename = "Expiration Warning")]
    #[strum(serialize = "Expiration Warning")]
    ExpirationWarning,
    #[serde(rename = "Certificate Chain")]
    #[strum(serialize = "Certificate Chain")]
    CertificateChain,
    #[serde(rename = "Trust Status")]
    #[strum(serialize = "Trust Status")]
    TrustStatus,
    #[serde(rename = "Hostname Match")]
    #[strum(serialize = "Hostname Match")]
    HostnameMatch,
    #[serde(rename = "TLS Protocol")]
    #[strum(serialize = "TLS Protocol")]
    TlsProtocol,
    #[serde(rename = "Key Strength")]
    #[strum(serialize = "Key Strength")]
    KeyStrength,
    #[serde(rename = "Signature Algorithm")]
    #[strum(serialize = "Signature Algorithm")]
    SignatureAlgorithm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Status {
    Pass,
    Warning,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub name: Rule,
    pub status: Status,
    pub message: String,
}

impl ValidationResult {
    fn new(name: Rule, status: Status, message: impl Into<String>) -> ValidationResult {
        ValidationResult {
            name,
            status,
            message: message.into(),
        }
    }
}

/// Everything the rules look at.
pub struct ValidationInput<'a> {
    pub hostname: &'a str,
    pub leaf: &'a CertificateRecord,
    pub leaf_metadata: &'a LeafMetadata,
    pub chain_length: usize,
    pub connection: &'a ConnectionInfo,
    pub now: DateTime<Utc>,
}

/// Whole days from `now` until `not_after`, rounded down.
pub fn days_remaining(not_after: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (not_after - now).num_seconds().div_euclid(SECONDS_PER_DAY)
}

pub fn run_all(input: &ValidationInput<'_>) -> Vec<ValidationResult> {
    let days = days_remaining(input.leaf.valid_to, input.now);
    vec![
        check_validity(input.leaf, input.now, days),
        check_expiration(days),
        check_chain(input.chain_length),
        check_trust(input.connection),
        check_hostname(input.hostname, input.leaf_metadata),
        check_protocol(&input.connection.protocol),
        check_key_strength(input.leaf.bits),
        check_signature_algorithm(&input.leaf.signature_algorithm),
    ]
}

fn check_validity(leaf: &CertificateRecord, now: DateTime<Utc>, days: i64) -> ValidationResult {
    let rule = Rule::CertificateValidity;
    if now < leaf.valid_from {
        ValidationResult::new(rule, Status::Fail, "Certificate is not yet valid")
    } else if now > leaf.valid_to {
        ValidationResult::new(rule, Status::Fail, "Certificate has expired")
    } else {
        ValidationResult::new(
            rule,
            Status::Pass,
            format!("Certificate is valid ({} days remaining)", days),
        )
    }
}

fn check_expiration(days: i64) -> ValidationResult {
    let rule = Rule::ExpirationWarning;
    if days <= 0 {
        ValidationResult::new(rule, Status::Fail, "Certificate has expired")
    } else if days <= EXPIRY_WARNING_DAYS {
        ValidationResult::new(
            rule,
            Status::Warning,
            format!("Certificate expires in {} days", days),
        )
    } else {
        ValidationResult::new(
            rule,
            Status::Pass,
            format!("Certificate expires in {} days", days),
        )
    }
}

fn check_chain(chain_length: usize) -> ValidationResult {
    let rule = Rule::CertificateChain;
    if chain_length > 1 {
        ValidationResult::new(
            rule,
            Status::Pass,
            format!("Certificate chain contains {} certificates", chain_length),
        )
    } else {
        ValidationResult::new(
            rule,
            Status::Warning,
            "No certificate chain provided, only the leaf certificate was found",
        )
    }
}

fn check_trust(connection: &ConnectionInfo) -> ValidationResult {
    let rule = Rule::TrustStatus;
    if connection.authorized {
        ValidationResult::new(rule, Status::Pass, "Certificate is trusted")
    } else {
        let reason = connection
            .authorization_error
            .as_deref()
            .unwrap_or("Unknown error");
        ValidationResult::new(
            rule,
            Status::Fail,
            format!("Certificate is not trusted: {}", reason),
        )
    }
}

fn check_hostname(host: &str, leaf: &LeafMetadata) -> ValidationResult {
    let rule = Rule::HostnameMatch;
    if hostname::matches_any(
        leaf.common_name.as_deref(),
        leaf.subject_alt_names.as_deref(),
        host,
    ) {
        ValidationResult::new(
            rule,
            Status::Pass,
            format!("Certificate matches hostname {}", host),
        )
    } else {
        ValidationResult::new(
            rule,
            Status::Fail,
            format!("Certificate does not match hostname {}", host),
        )
    }
}

fn check_protocol(protocol: &str) -> ValidationResult {
    let rule = Rule::TlsProtocol;
    match protocol {
        "TLSv1.2" | "TLSv1.3" => {
            ValidationResult::new(rule, Status::Pass, format!("Using {}", protocol))
        }
        other => ValidationResult::new(
            rule,
            Status::Warning,
            format!("Using outdated or unrecognized protocol {}", other),
        ),
    }
}

fn check_key_strength(bits: Option<u32>) -> ValidationResult {
    let rule = Rule::KeyStrength;
    let bits = bits.unwrap_or(0);
    if bits >= MIN_KEY_BITS {
        ValidationResult::new(rule, Status::Pass, format!("{}-bit key", bits))
    } else if bits >= WEAK_KEY_BITS {
        ValidationResult::new(
            rule,
            Status::Warning,
            format!("{}-bit key is weaker than recommended", bits),
        )
    } else if bits == 0 {
        ValidationResult::new(rule, Status::Fail, "Key size could not be determined")
    } else {
        ValidationResult::new(rule, Status::Fail, format!("{}-bit key is insecure", bits))
    }
}

fn check_signature_algorithm(algorithm: &str) -> ValidationResult {
    let rule = Rule::SignatureAlgorithm;
    let lower = algorithm.to_lowercase();
    if lower.contains("sha1") || lower.contains("md5") {
        ValidationResult::new(
            rule,
            Status::Warning,
            format!("Weak signature algorithm {}", algorithm),
        )
    } else {
        ValidationResult::new(rule, Status::Pass, format!("Signed with {}", algorithm))
    }
}
