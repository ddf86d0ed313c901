//! The inspection report and its JSON shape.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::certificate::{format_time, CertificateRecord, LeafMetadata};
use crate::error::{ErrorKind, TlsGradeError};
use crate::grade::{Grade, Summary};
use crate::validation::{self, ValidationInput, ValidationResult};

/// Negotiated session parameters, captured right after the handshake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionInfo {
    pub protocol: String,
    pub cipher: String,
    pub authorized: bool,
    #[serde(skip)]
    pub authorization_error: Option<String>,
}

/// Leaf certificate details as reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateDetails {
    pub subject: String,
    pub issuer: String,
    pub valid_from: String,
    pub valid_to: String,
    pub days_remaining: i64,
    pub serial_number: String,
    pub fingerprint: String,
    pub subject_alt_names: Option<String>,
    pub signature_algorithm: String,
    pub key_size: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub hostname: String,
    pub grade: Grade,
    pub summary: Summary,
    pub certificate: CertificateDetails,
    pub connection: ConnectionInfo,
    pub chain: Vec<CertificateRecord>,
    pub validations: Vec<ValidationResult>,
    pub checked_at: String,
}

impl Report {
    /// Runs the rules over an already reconstructed chain and grades the result.
    ///
    /// `chain` is leaf first; an empty chain cannot describe a certificate and is
    /// rejected.
    pub fn assemble(
        hostname: &str,
        chain: Vec<CertificateRecord>,
        leaf_metadata: LeafMetadata,
        connection: ConnectionInfo,
        now: DateTime<Utc>,
    ) -> Result<Report, TlsGradeError> {
        let leaf = chain
            .first()
            .ok_or_else(|| TlsGradeError::certificate("certificate chain is empty"))?;

        let validations = validation::run_all(&ValidationInput {
            hostname,
            leaf,
            leaf_metadata: &leaf_metadata,
            chain_length: chain.len(),
            connection: &connection,
            now,
        });
        let summary = Summary::tally(&validations);

        let certificate = CertificateDetails {
            subject: leaf.subject.clone(),
            issuer: leaf.issuer.clone(),
            valid_from: format_time(&leaf.valid_from),
            valid_to: format_time(&leaf.valid_to),
            days_remaining: validation::days_remaining(leaf.valid_to, now),
            serial_number: leaf.serial_number.clone(),
            fingerprint: leaf.fingerprint.clone(),
            subject_alt_names: leaf_metadata.subject_alt_names,
            signature_algorithm: leaf.signature_algorithm.clone(),
            key_size: leaf.bits,
        };

        Ok(Report {
            hostname: hostname.to_string(),
            grade: Grade::from_summary(&summary),
            summary,
            certificate,
            connection,
            chain,
            validations,
            checked_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        })
    }
}

/// What a caller receives instead of a [`Report`] when an inspection fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub hostname: String,
    pub error: String,
    pub kind: ErrorKind,
}

impl ErrorReport {
    pub fn new(hostname: &str, error: &TlsGradeError) -> ErrorReport {
        ErrorReport {
            hostname: hostname.to_string(),
            error: error.to_string(),
            kind: error.kind(),
        }
    }
}
