//! Runtime generated certificates for unit tests.

use chrono::{DateTime, Duration, Utc};
use openssl::asn1::Asn1Time;
use openssl::bn::{BigNum, MsbOption};
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;
use openssl::x509::extension::{BasicConstraints, SubjectAlternativeName};
use openssl::x509::{X509Name, X509};

pub struct CertSpec {
    common_name: String,
    organization: Option<String>,
    dns: Vec<String>,
    ips: Vec<String>,
    is_ca: bool,
    not_before: DateTime<Utc>,
    not_after: DateTime<Utc>,
}

impl CertSpec {
    pub fn new(common_name: &str) -> CertSpec {
        let now = Utc::now();
        CertSpec {
            common_name: common_name.to_string(),
            organization: None,
            dns: Vec::new(),
            ips: Vec::new(),
            is_ca: false,
            not_before: now - Duration::days(1),
            not_after: now + Duration::days(90),
        }
    }

    pub fn organization(mut self, organization: &str) -> CertSpec {
        self.organization = Some(organization.to_string());
        self
    }

    pub fn dns(mut self, names: &[&str]) -> CertSpec {
        self.dns.extend(names.iter().map(|name| name.to_string()));
        self
    }

    pub fn ip(mut self, ip: &str) -> CertSpec {
        self.ips.push(ip.to_string());
        self
    }

    pub fn ca(mut self) -> CertSpec {
        self.is_ca = true;
        self
    }

    pub fn valid_between(mut self, not_before: DateTime<Utc>, not_after: DateTime<Utc>) -> CertSpec {
        self.not_before = not_before;
        self.not_after = not_after;
        self
    }
}

pub struct Issued {
    pub cert: X509,
    pub key: PKey<Private>,
}

impl Issued {
    pub fn self_signed(spec: &CertSpec) -> Issued {
        build(spec, None)
    }

    pub fn issue(&self, spec: &CertSpec) -> Issued {
        build(spec, Some(self))
    }
}

fn build(spec: &CertSpec, issuer: Option<&Issued>) -> Issued {
    let key = PKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap();

    let mut name = X509Name::builder().unwrap();
    name.append_entry_by_nid(Nid::COMMONNAME, &spec.common_name)
        .unwrap();
    if let Some(organization) = &spec.organization {
        name.append_entry_by_nid(Nid::ORGANIZATIONNAME, organization)
            .unwrap();
    }
    let name = name.build();

    let mut serial = BigNum::new().unwrap();
    serial.rand(64, MsbOption::MAYBE_ZERO, false).unwrap();

    let mut builder = X509::builder().unwrap();
    builder.set_version(2).unwrap();
    builder
        .set_serial_number(&serial.to_asn1_integer().unwrap())
        .unwrap();
    builder.set_subject_name(&name).unwrap();
    match issuer {
        Some(issuer) => builder.set_issuer_name(issuer.cert.subject_name()).unwrap(),
        None => builder.set_issuer_name(&name).unwrap(),
    }
    builder.set_pubkey(&key).unwrap();
    builder
        .set_not_before(&Asn1Time::from_unix(spec.not_before.timestamp()).unwrap())
        .unwrap();
    builder
        .set_not_after(&Asn1Time::from_unix(spec.not_after.timestamp()).unwrap())
        .unwrap();

    if spec.is_ca {
        builder
            .append_extension(BasicConstraints::new().critical().ca().build().unwrap())
            .unwrap();
    }
    if !spec.dns.is_empty() || !spec.ips.is_empty() {
        let mut san = SubjectAlternativeName::new();
        for dns in &spec.dns {
            san.dns(dns);
        }
        for ip in &spec.ips {
            san.ip(ip);
        }
        let extension = san
            .build(&builder.x509v3_context(issuer.map(|i| &*i.cert), None))
            .unwrap();
        builder.append_extension(extension).unwrap();
    }

    let signing_key = issuer.map(|i| &i.key).unwrap_or(&key);
    builder.sign(signing_key, MessageDigest::sha256()).unwrap();

    Issued {
        cert: builder.build(),
        key,
    }
}
