//! Certificate metadata extraction.
//!
//! Converts OpenSSL certificates into the owned records that the rest of the crate
//! works with. Nothing here keeps a reference to the connection.

use chrono::{DateTime, Utc};
use openssl::asn1::{Asn1Time, Asn1TimeRef};
use openssl::hash::MessageDigest;
use openssl::x509::{GeneralNameRef, X509Ref};
use serde::{Serialize, Serializer};
use std::net::IpAddr;

use crate::dn::DistinguishedName;
use crate::error::TlsGradeError;

/// One certificate of the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateRecord {
    pub subject: String,
    pub issuer: String,
    #[serde(serialize_with = "serialize_time")]
    pub valid_from: DateTime<Utc>,
    #[serde(serialize_with = "serialize_time")]
    pub valid_to: DateTime<Utc>,
    pub serial_number: String,
    pub fingerprint: String,
    pub signature_algorithm: String,
    pub bits: Option<u32>,
    pub is_self_signed: bool,
}

impl CertificateRecord {
    pub fn from_x509(cert: &X509Ref) -> Result<CertificateRecord, TlsGradeError> {
        let subject = DistinguishedName::from_x509_name(cert.subject_name()).to_string();
        let issuer = DistinguishedName::from_x509_name(cert.issuer_name()).to_string();
        let is_self_signed = subject == issuer;
        Ok(CertificateRecord {
            subject,
            issuer,
            valid_from: asn1_to_utc(cert.not_before())?,
            valid_to: asn1_to_utc(cert.not_after())?,
            serial_number: cert.serial_number().to_bn()?.to_hex_str()?.to_string(),
            fingerprint: fingerprint(cert)?,
            signature_algorithm: cert.signature_algorithm().object().to_string(),
            bits: cert.public_key().ok().map(|key| key.bits()),
            is_self_signed,
        })
    }
}

/// Leaf-only metadata that hostname matching needs on top of the record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeafMetadata {
    pub common_name: Option<String>,
    /// Rendered as `DNS:a.example, DNS:b.example, IP Address:10.0.0.1`.
    pub subject_alt_names: Option<String>,
}

impl LeafMetadata {
    pub fn from_x509(cert: &X509Ref) -> LeafMetadata {
        LeafMetadata {
            common_name: DistinguishedName::from_x509_name(cert.subject_name()).common_name,
            subject_alt_names: subject_alt_names(cert),
        }
    }
}

/// SHA-256 of the DER encoding, as colon separated uppercase hex.
pub fn fingerprint(cert: &X509Ref) -> Result<String, TlsGradeError> {
    let digest = cert.digest(MessageDigest::sha256())?;
    Ok(digest
        .iter()
        .map(|byte| format!("{:02X}", byte))
        .collect::<Vec<_>>()
        .join(":"))
}

/// Formats a timestamp the way OpenSSL prints ASN.1 times: `Jan  1 00:00:00 2025 GMT`.
pub fn format_time(time: &DateTime<Utc>) -> String {
    time.format("%b %e %H:%M:%S %Y GMT").to_string()
}

fn serialize_time<S: Serializer>(time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_time(time))
}

fn asn1_to_utc(time: &Asn1TimeRef) -> Result<DateTime<Utc>, TlsGradeError> {
    let epoch = Asn1Time::from_unix(0)?;
    let diff = epoch.diff(time)?;
    let seconds = i64::from(diff.days) * 86_400 + i64::from(diff.secs);
    DateTime::<Utc>::from_timestamp(seconds, 0)
        .ok_or_else(|| TlsGradeError::certificate(format!("timestamp out of range: {}", time)))
}

fn subject_alt_names(cert: &X509Ref) -> Option<String> {
    let names = cert.subject_alt_names()?;
    let rendered: Vec<String> = names.iter().filter_map(render_general_name).collect();
    if rendered.is_empty() {
        None
    } else {
        Some(rendered.join(", "))
    }
}

fn render_general_name(name: &GeneralNameRef) -> Option<String> {
    if let Some(dns) = name.dnsname() {
        return Some(format!("DNS:{}", dns));
    }
    if let Some(ip) = name.ipaddress() {
        let addr = match ip.len() {
            4 => <[u8; 4]>::try_from(ip).ok().map(IpAddr::from),
            16 => <[u8; 16]>::try_from(ip).ok().map(IpAddr::from),
            _ => None,
        }?;
        return Some(format!("IP Address:{}", addr));
    }
    if let Some(email) = name.email() {
        return Some(format!("email:{}", email));
    }
    name.uri().map(|uri| format!("URI:{}", uri))
}
