//! In-process TLS servers with generated certificates.

use openssl::ssl::{Ssl, SslAcceptor, SslMethod};
use openssl::x509::X509;
use std::pin::Pin;
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use tokio_openssl::SslStream;

#[allow(dead_code)]
#[path = "../../src/test_support.rs"]
mod certs;

pub use certs::{CertSpec, Issued};

/// Serves TLS on 127.0.0.1 with `leaf`, sending `extra_chain` after it.
///
/// Each accepted connection is held open until the client closes it.
pub async fn spawn_tls_server(leaf: Issued, extra_chain: Vec<X509>) -> u16 {
    let mut acceptor = SslAcceptor::mozilla_intermediate_v5(SslMethod::tls()).unwrap();
    acceptor.set_private_key(&leaf.key).unwrap();
    acceptor.set_certificate(&leaf.cert).unwrap();
    for cert in extra_chain {
        acceptor.add_extra_chain_cert(cert).unwrap();
    }
    acceptor.check_private_key().unwrap();
    let acceptor = acceptor.build();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let ssl = Ssl::new(acceptor.context()).unwrap();
            tokio::spawn(async move {
                let mut stream = SslStream::new(ssl, socket).unwrap();
                if Pin::new(&mut stream).accept().await.is_err() {
                    return;
                }
                let mut buf = [0u8; 1024];
                while let Ok(n) = stream.read(&mut buf).await {
                    if n == 0 {
                        break;
                    }
                }
            });
        }
    });

    port
}
