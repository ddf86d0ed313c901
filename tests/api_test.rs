//! Integration tests for the public API

use std::time::Duration;
use tlsgrade::{ErrorKind, Grade, Inspector, Rule, Status, Target, TlsGradeError};

#[test]
fn test_public_api_compiles() {
    // Network access is not available in tests; this only has to type check.
    async fn check_certificate(hostname: &str) -> Result<Grade, TlsGradeError> {
        let report = tlsgrade::inspect(hostname).await?;
        Ok(report.grade)
    }

    let _ = check_certificate;
}

#[test]
fn test_inspector_defaults() {
    let inspector = Inspector::new();
    assert_eq!(inspector.port(), 443);
    assert_eq!(inspector.timeout(), Duration::from_secs(10));

    let inspector = inspector
        .with_port(8443)
        .with_timeout(Duration::from_millis(500));
    assert_eq!(inspector.port(), 8443);
    assert_eq!(inspector.timeout(), Duration::from_millis(500));
}

#[test]
fn test_error_types_are_public() {
    fn handle_error(err: TlsGradeError) -> String {
        match err {
            TlsGradeError::ConnectionFailed { address, .. } => {
                format!("Connection failed to {}", address)
            }
            TlsGradeError::HandshakeFailed { details, .. } => {
                format!("Handshake failed: {}", details)
            }
            TlsGradeError::NoCertificate { hostname } => {
                format!("No certificate from {}", hostname)
            }
            TlsGradeError::Timeout { address, .. } => format!("Timeout: {}", address),
            TlsGradeError::Certificate { reason } => format!("Certificate error: {}", reason),
            TlsGradeError::OpenSsl(e) => format!("OpenSSL error: {}", e),
            TlsGradeError::InvalidInput { field, reason } => {
                format!("Invalid {}: {}", field, reason)
            }
        }
    }

    let err = TlsGradeError::InvalidInput {
        field: "test".to_string(),
        reason: "test reason".to_string(),
    };
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let msg = handle_error(err);
    assert!(msg.contains("test reason"));
}

#[test]
fn test_rule_and_status_names() {
    let names: Vec<String> = [
        Rule::CertificateValidity,
        Rule::ExpirationWarning,
        Rule::CertificateChain,
        Rule::TrustStatus,
        Rule::HostnameMatch,
        Rule::TlsProtocol,
        Rule::KeyStrength,
        Rule::SignatureAlgorithm,
    ]
    .iter()
    .map(|rule| rule.to_string())
    .collect();
    assert_eq!(
        names,
        vec![
            "Certificate Validity",
            "Expiration Warning",
            "Certificate Chain",
            "Trust Status",
            "Hostname Match",
            "TLS Protocol",
            "Key Strength",
            "Signature Algorithm",
        ]
    );
    assert_eq!(Status::Pass.to_string(), "pass");
    assert_eq!(Status::Fail.to_string(), "fail");
}

#[test]
fn test_target_parsing() {
    let target = Target::parse("https://example.com:8443/index.html").unwrap();
    assert_eq!(target.hostname, "example.com");
    assert_eq!(target.port, Some(8443));

    let err = Target::parse("").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}
