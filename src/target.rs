//! Turning user input into something to connect to.

use url::{Host, Url};

use crate::error::TlsGradeError;

/// A host to inspect, with an optional non-default port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub hostname: String,
    pub port: Option<u16>,
}

impl Target {
    /// Accepts a URL (`https://example.com:8443/path`) or a bare `host[:port]`.
    pub fn parse(input: &str) -> Result<Target, TlsGradeError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(invalid("cannot be empty"));
        }

        let url = if input.contains("://") {
            Url::parse(input)
        } else {
            Url::parse(&format!("https://{}", input))
        }
        .map_err(|e| invalid(&e.to_string()))?;

        let hostname = match url.host() {
            Some(Host::Domain(domain)) => domain.to_string(),
            Some(Host::Ipv4(ip)) => ip.to_string(),
            Some(Host::Ipv6(ip)) => ip.to_string(),
            None => return Err(invalid("no host found")),
        };

        Ok(Target {
            hostname,
            port: url.port(),
        })
    }
}

fn invalid(reason: &str) -> TlsGradeError {
    TlsGradeError::InvalidInput {
        field: "host".to_string(),
        reason: reason.to_string(),
    }
}
