//! Certificate chain reconstruction.
//!
//! The chain is rebuilt by following issuer links from the leaf. Links may be
//! cyclic (a self-signed root is its own issuer), so the walk keeps a set of the
//! fingerprints it has visited and stops the first time one repeats.

use openssl::x509::{X509Ref, X509VerifyResult, X509};
use std::collections::HashSet;

use crate::certificate::{self, CertificateRecord};
use crate::error::TlsGradeError;

/// Upper bound on the number of certificates a walk will visit.
pub const MAX_CHAIN_LENGTH: usize = 32;

/// A certificate that can name its issuer.
pub trait IssuerLink: Sized {
    /// Identity used for cycle detection.
    fn fingerprint(&self) -> Result<String, TlsGradeError>;

    /// The certificate that issued this one, if it is known.
    fn issuer(&self) -> Option<Self>;

    fn to_record(&self) -> Result<CertificateRecord, TlsGradeError>;
}

/// Walks issuer links from `leaf`, returning the chain leaf first.
///
/// The walk ends when a certificate has no known issuer, when the next issuer was
/// already visited, or after [`MAX_CHAIN_LENGTH`] certificates. Fingerprints in the
/// returned chain are unique.
pub fn walk_chain<C: IssuerLink>(leaf: C) -> Result<Vec<CertificateRecord>, TlsGradeError> {
    let mut chain = Vec::new();
    let mut seen = HashSet::new();
    let mut current = Some(leaf);

    while let Some(cert) = current {
        if chain.len() == MAX_CHAIN_LENGTH {
            log::warn!("chain walk stopped after {} certificates", MAX_CHAIN_LENGTH);
            break;
        }
        if !seen.insert(cert.fingerprint()?) {
            break;
        }
        chain.push(cert.to_record()?);
        current = cert.issuer();
    }

    Ok(chain)
}

/// A certificate received during the handshake, together with every certificate
/// that can serve as its issuer.
pub struct PresentedCertificate<'a> {
    cert: &'a X509Ref,
    pool: &'a [X509],
}

impl<'a> PresentedCertificate<'a> {
    /// `pool` holds the certificates the peer sent plus any the verifier added.
    pub fn new(cert: &'a X509Ref, pool: &'a [X509]) -> PresentedCertificate<'a> {
        PresentedCertificate { cert, pool }
    }
}

impl<'a> IssuerLink for PresentedCertificate<'a> {
    fn fingerprint(&self) -> Result<String, TlsGradeError> {
        certificate::fingerprint(self.cert)
    }

    fn issuer(&self) -> Option<Self> {
        self.pool
            .iter()
            .find(|candidate| candidate.issued(self.cert) == X509VerifyResult::OK)
            .map(|issuer| PresentedCertificate::new(issuer, self.pool))
    }

    fn to_record(&self) -> Result<CertificateRecord, TlsGradeError> {
        CertificateRecord::from_x509(self.cert)
    }
}
