//! TLS connection and report assembly.

use chrono::Utc;
use openssl::ssl::{Ssl, SslContext, SslMethod, SslRef, SslVerifyMode};
use openssl::x509::{X509VerifyResult, X509};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_openssl::SslStream;

use crate::certificate::LeafMetadata;
use crate::chain::{walk_chain, PresentedCertificate};
use crate::error::TlsGradeError;
use crate::report::{ConnectionInfo, Report};

pub const DEFAULT_PORT: u16 = 443;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Opens one TLS connection per inspection and grades what the server presents.
#[derive(Debug, Clone)]
pub struct Inspector {
    port: u16,
    timeout: Duration,
    extra_roots: Vec<X509>,
}

impl Default for Inspector {
    fn default() -> Self {
        Inspector {
            port: DEFAULT_PORT,
            timeout: DEFAULT_TIMEOUT,
            extra_roots: Vec::new(),
        }
    }
}

impl Inspector {
    pub fn new() -> Inspector {
        Inspector::default()
    }

    pub fn with_port(mut self, port: u16) -> Inspector {
        self.port = port;
        self
    }

    /// Budget for TCP connect plus handshake.
    pub fn with_timeout(mut self, timeout: Duration) -> Inspector {
        self.timeout = timeout;
        self
    }

    /// Trusts `root` in addition to the system store, e.g. for a private PKI.
    pub fn with_trusted_root(mut self, root: X509) -> Inspector {
        self.extra_roots.push(root);
        self
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Connects to `hostname`, grades its certificate and closes the connection.
    ///
    /// `hostname` is used both to connect and as the SNI server name. Certificates
    /// that fail verification are still graded; the verdict shows up in the
    /// report's connection info and trust rule.
    ///
    /// ```no_run
    /// # async fn run() -> Result<(), tlsgrade::TlsGradeError> {
    /// let report = tlsgrade::Inspector::new().inspect("example.com").await?;
    /// println!("{} {}", report.hostname, report.grade);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn inspect(&self, hostname: &str) -> Result<Report, TlsGradeError> {
        let address = format!("{}:{}", hostname, self.port);
        let context = client_context(&self.extra_roots)?;

        // Dropping the handshake future on timeout drops the socket with it.
        let stream = match tokio::time::timeout(
            self.timeout,
            handshake(&context, hostname, self.port, &address),
        )
        .await
        {
            Ok(stream) => stream?,
            Err(_) => {
                log::debug!("handshake with {} timed out", address);
                return Err(TlsGradeError::Timeout {
                    address,
                    timeout: self.timeout,
                });
            }
        };

        let report = build_report(hostname, stream.ssl());
        drop(stream);
        log::debug!("closed connection to {}", address);

        if let Ok(report) = &report {
            log::info!("{} graded {}", hostname, report.grade);
        }
        report
    }
}

fn client_context(extra_roots: &[X509]) -> Result<SslContext, TlsGradeError> {
    let mut builder = SslContext::builder(SslMethod::tls_client())?;
    builder.set_default_verify_paths()?;
    // The compiled-in OPENSSLDIR rarely matches the host's store, so load what the
    // system actually has.
    let (cert_file, cert_dirs) = system_trust_locations();
    if let Some(file) = &cert_file {
        if let Err(e) = builder.load_verify_locations(Some(file), None) {
            log::warn!("could not load CA bundle {}: {}", file.display(), e);
        }
    }
    for dir in &cert_dirs {
        if let Err(e) = builder.load_verify_locations(None, Some(dir)) {
            log::warn!("could not load CA directory {}: {}", dir.display(), e);
        }
    }
    for root in extra_roots {
        builder.cert_store_mut().add_cert(root.clone())?;
    }
    // Verification runs, but never aborts the handshake; the result is read back
    // from the session afterwards.
    builder.set_verify_callback(SslVerifyMode::PEER, |_preverify_ok, _store| true);
    Ok(builder.build())
}

/// CA bundle and hash directories found on this system, limited to paths OpenSSL
/// can be handed.
fn system_trust_locations() -> (Option<PathBuf>, Vec<PathBuf>) {
    let found = openssl_probe::probe();
    let usable = |path: &Path| path.exists() && path.to_str().map_or(false, |p| !p.contains('\0'));
    let cert_file = found.cert_file.filter(|file| usable(file));
    let cert_dirs = found.cert_dir.into_iter().filter(|dir| usable(dir)).collect();
    log::debug!("system trust store: file {:?}, dirs {:?}", cert_file, cert_dirs);
    (cert_file, cert_dirs)
}

async fn handshake(
    context: &SslContext,
    hostname: &str,
    port: u16,
    address: &str,
) -> Result<SslStream<TcpStream>, TlsGradeError> {
    log::debug!("connecting to {}", address);
    let tcp_stream = TcpStream::connect((hostname, port)).await.map_err(|e| {
        TlsGradeError::ConnectionFailed {
            address: address.to_string(),
            source: e,
        }
    })?;

    let mut ssl = Ssl::new(context)?;
    ssl.set_hostname(hostname)?;
    let mut stream = SslStream::new(ssl, tcp_stream)?;
    Pin::new(&mut stream)
        .connect()
        .await
        .map_err(|e| TlsGradeError::HandshakeFailed {
            address: address.to_string(),
            details: e.to_string(),
        })?;
    log::debug!("handshake with {} complete", address);
    Ok(stream)
}

fn build_report(hostname: &str, ssl: &SslRef) -> Result<Report, TlsGradeError> {
    let connection = connection_info(ssl);
    if let Some(reason) = &connection.authorization_error {
        log::warn!("certificate for {} is not trusted: {}", hostname, reason);
    }

    let leaf = ssl
        .peer_certificate()
        .ok_or_else(|| TlsGradeError::NoCertificate {
            hostname: hostname.to_string(),
        })?;

    let pool = issuer_pool(ssl);
    let chain = walk_chain(PresentedCertificate::new(&leaf, &pool))?;
    log::debug!("{} presented a chain of {} certificates", hostname, chain.len());

    Report::assemble(
        hostname,
        chain,
        LeafMetadata::from_x509(&leaf),
        connection,
        Utc::now(),
    )
}

fn connection_info(ssl: &SslRef) -> ConnectionInfo {
    let verify_result = ssl.verify_result();
    let authorized = verify_result == X509VerifyResult::OK;
    ConnectionInfo {
        protocol: ssl.version_str().to_string(),
        cipher: ssl
            .current_cipher()
            .map(|cipher| cipher.name().to_string())
            .unwrap_or_else(|| "unknown".to_string()),
        authorized,
        authorization_error: if authorized {
            None
        } else {
            Some(verify_result.error_string().to_string())
        },
    }
}

/// Candidate issuers: what the peer sent, then what the verifier added (such as a
/// root from the system store).
fn issuer_pool(ssl: &SslRef) -> Vec<X509> {
    let presented = ssl.peer_cert_chain().into_iter().flatten();
    let verified = ssl.verified_chain().into_iter().flatten();
    presented.chain(verified).map(|cert| cert.to_owned()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::test_support::{CertSpec, Issued};

    #[test]
    fn test_client_context_accepts_extra_roots() {
        let root = Issued::self_signed(&CertSpec::new("Private Root CA").ca());
        assert!(client_context(&[]).is_ok());
        assert!(client_context(&[root.cert]).is_ok());
    }

    #[test]
    fn test_system_trust_locations_exist() {
        let (cert_file, cert_dirs) = system_trust_locations();
        if let Some(file) = cert_file {
            assert!(file.exists());
        }
        assert!(cert_dirs.iter().all(|dir| dir.exists()));
    }

    #[test]
    fn test_session_without_peer_certificate() {
        let context = client_context(&[]).unwrap();
        let ssl = Ssl::new(&context).unwrap();

        let err = build_report("example.com", &ssl).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoCertificate);
        assert!(matches!(
            err,
            TlsGradeError::NoCertificate { ref hostname } if hostname == "example.com"
        ));
    }

    #[test]
    fn test_with_trusted_root_keeps_other_settings() {
        let root = Issued::self_signed(&CertSpec::new("Private Root CA").ca());
        let inspector = Inspector::new()
            .with_port(8443)
            .with_trusted_root(root.cert);
        assert_eq!(inspector.port(), 8443);
        assert_eq!(inspector.timeout(), DEFAULT_TIMEOUT);
        assert_eq!(inspector.extra_roots.len(), 1);
    }
}
