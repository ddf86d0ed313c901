//! Error types for TLS inspection.
//!
//! Every failure an inspection can end in is a [`TlsGradeError`]. Callers that only
//! need the coarse classification (to pick a status code, an exit code, or a log
//! level) use [`TlsGradeError::kind`].

use serde::Serialize;
use std::io;
use std::time::Duration;
use strum_macros::Display;
use thiserror::Error;

/// Error type for a failed inspection.
///
/// An inspection either produces a complete report or exactly one of these.
#[derive(Debug, Error)]
pub enum TlsGradeError {
    /// DNS resolution or TCP connection failed
    #[error("Connection failed to: {address}: {source}")]
    ConnectionFailed {
        /// The address (host:port) the connection was attempted to
        address: String,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// TLS handshake failed
    #[error("TLS handshake with {address} failed: {details}")]
    HandshakeFailed { address: String, details: String },

    /// The handshake completed but the peer presented no certificate
    #[error("No certificate presented by {hostname}")]
    NoCertificate { hostname: String },

    /// Connect and handshake did not complete within the budget
    #[error("TLS handshake with {address} timed out after {}ms", .timeout.as_millis())]
    Timeout { address: String, timeout: Duration },

    /// Certificate metadata could not be extracted
    #[error("Certificate error: {reason}")]
    Certificate { reason: String },

    /// OpenSSL error outside the handshake itself
    #[error("OpenSSL error: {0}")]
    OpenSsl(#[from] openssl::error::ErrorStack),

    /// Invalid input provided to the API
    #[error("Invalid input for '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
}

/// Coarse classification of a [`TlsGradeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum ErrorKind {
    NoCertificate,
    ConnectionError,
    Timeout,
    InvalidInput,
    Internal,
}

impl TlsGradeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConnectionFailed { .. } | Self::HandshakeFailed { .. } => {
                ErrorKind::ConnectionError
            }
            Self::NoCertificate { .. } => ErrorKind::NoCertificate,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::Certificate { .. } | Self::OpenSsl(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn certificate(reason: impl Into<String>) -> Self {
        Self::Certificate {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TlsGradeError::InvalidInput {
            field: "hostname".to_string(),
            reason: "cannot be empty".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid input for 'hostname': cannot be empty"
        );
    }

    #[test]
    fn test_timeout_display() {
        let err = TlsGradeError::Timeout {
            address: "example.com:443".to_string(),
            timeout: Duration::from_secs(10),
        };
        assert_eq!(
            err.to_string(),
            "TLS handshake with example.com:443 timed out after 10000ms"
        );
        assert_eq!(err.kind(), ErrorKind::Timeout);
    }

    #[test]
    fn test_error_kinds() {
        let refused = TlsGradeError::ConnectionFailed {
            address: "example.com:443".to_string(),
            source: io::Error::from(io::ErrorKind::ConnectionRefused),
        };
        assert_eq!(refused.kind(), ErrorKind::ConnectionError);

        let handshake = TlsGradeError::HandshakeFailed {
            address: "example.com:443".to_string(),
            details: "unexpected eof".to_string(),
        };
        assert_eq!(handshake.kind(), ErrorKind::ConnectionError);

        let missing = TlsGradeError::NoCertificate {
            hostname: "example.com".to_string(),
        };
        assert_eq!(missing.kind(), ErrorKind::NoCertificate);
        assert_eq!(TlsGradeError::certificate("bad").kind(), ErrorKind::Internal);
    }
}
