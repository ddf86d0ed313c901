//! Grades the TLS certificate posture of a remote host.
//!
//! An inspection opens one TLS connection, rebuilds the certificate chain the
//! server presents, runs a fixed set of eight rules over the leaf certificate and
//! the negotiated session, and reduces the outcome to a letter grade.
//!
//! ```no_run
//! use tlsgrade::Inspector;
//!
//! # async fn run() -> Result<(), tlsgrade::TlsGradeError> {
//! let report = Inspector::new().inspect("example.com").await?;
//! for validation in &report.validations {
//!     println!("{}: {} ({})", validation.name, validation.status, validation.message);
//! }
//! println!("grade {}", report.grade);
//! # Ok(())
//! # }
//! ```

pub mod certificate;
pub mod chain;
pub mod config;
pub mod connector;
pub mod dn;
pub mod error;
pub mod grade;
pub mod hostname;
pub mod report;
pub mod target;
pub mod validation;

#[cfg(test)]
mod test_support;

pub use certificate::{CertificateRecord, LeafMetadata};
pub use connector::Inspector;
pub use dn::DistinguishedName;
pub use error::{ErrorKind, TlsGradeError};
pub use grade::{Grade, Summary};
pub use report::{CertificateDetails, ConnectionInfo, ErrorReport, Report};
pub use target::Target;
pub use validation::{Rule, Status, ValidationResult};

/// Inspects `hostname` on port 443 with the default 10 second budget.
pub async fn inspect(hostname: &str) -> Result<Report, TlsGradeError> {
    Inspector::new().inspect(hostname).await
}
