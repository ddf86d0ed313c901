//! Distinguished name rendering.

use openssl::nid::Nid;
use openssl::x509::X509NameRef;
use std::fmt;

/// The subset of a subject or issuer name that gets reported.
///
/// Fields that the certificate does not carry stay `None` and are left out of the
/// rendered string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistinguishedName {
    pub common_name: Option<String>,
    pub organization: Option<String>,
    pub organization_unit: Option<String>,
    pub locality: Option<String>,
    pub state_or_province: Option<String>,
    pub country_or_region: Option<String>,
}

impl DistinguishedName {
    pub fn from_x509_name(name: &X509NameRef) -> DistinguishedName {
        DistinguishedName {
            common_name: first_entry(name, Nid::COMMONNAME),
            organization: first_entry(name, Nid::ORGANIZATIONNAME),
            organization_unit: first_entry(name, Nid::ORGANIZATIONALUNITNAME),
            locality: first_entry(name, Nid::LOCALITYNAME),
            state_or_province: first_entry(name, Nid::STATEORPROVINCENAME),
            country_or_region: first_entry(name, Nid::COUNTRYNAME),
        }
    }

    fn fields(&self) -> [(&'static str, Option<&str>); 6] {
        [
            ("CN", self.common_name.as_deref()),
            ("O", self.organization.as_deref()),
            ("OU", self.organization_unit.as_deref()),
            ("L", self.locality.as_deref()),
            ("ST", self.state_or_province.as_deref()),
            ("C", self.country_or_region.as_deref()),
        ]
    }
}

impl fmt::Display for DistinguishedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (label, value) in self.fields() {
            if let Some(value) = value {
                if !first {
                    f.write_str(", ")?;
                }
                write!(f, "{}={}", label, value)?;
                first = false;
            }
        }
        Ok(())
    }
}

// The full value is kept, embedded NULs included, so that a name such as
// "www.bank.com\0.evil.example" never reads as "www.bank.com". Entries that cannot
// be decoded at all are skipped.
fn first_entry(name: &X509NameRef, nid: Nid) -> Option<String> {
    name.entries_by_nid(nid)
        .next()
        .and_then(|entry| entry.data().to_string().ok())
}
