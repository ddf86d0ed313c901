//! Certificate name to hostname matching.
//!
//! Only exact names and a single leading `*.` wildcard label are understood. The
//! wildcard stands for exactly one label, so `*.example.com` covers
//! `www.example.com` but neither `example.com` nor `a.b.example.com`.

/// Returns true when the certificate name `pattern` covers `hostname`.
pub fn matches(pattern: &str, hostname: &str) -> bool {
    if pattern == hostname {
        return true;
    }
    let Some(pattern_suffix) = pattern.strip_prefix("*.") else {
        return false;
    };
    let labels: Vec<&str> = hostname.split('.').collect();
    if labels.len() < 2 {
        return false;
    }
    labels[1..].join(".") == pattern_suffix
}

/// Extracts the `DNS:` entries of a rendered subject alternative name list.
///
/// Entries are separated by `", "`; other entry types (`IP Address:`, `email:`, ...)
/// are ignored.
pub fn dns_names(subject_alt_names: &str) -> impl Iterator<Item = &str> {
    subject_alt_names
        .split(", ")
        .filter_map(|entry| entry.strip_prefix("DNS:"))
}

/// Returns true when the common name or any SAN DNS entry covers `hostname`.
pub fn matches_any(
    common_name: Option<&str>,
    subject_alt_names: Option<&str>,
    hostname: &str,
) -> bool {
    if common_name.map_or(false, |cn| matches(cn, hostname)) {
        return true;
    }
    subject_alt_names
        .map(|sans| dns_names(sans).any(|name| matches(name, hostname)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert!(matches("example.com", "example.com"));
        assert!(!matches("example.com", "www.example.com"));
    }

    #[test]
    fn test_exact_match_is_case_sensitive() {
        assert!(!matches("Example.com", "example.com"));
    }

    #[test]
    fn test_single_level_wildcard() {
        assert!(matches("*.example.com", "www.example.com"));
        assert!(matches("*.example.com", "api.example.com"));
        assert!(!matches("*.example.com", "example.com"));
        assert!(!matches("*.example.com", "a.b.example.com"));
        assert!(!matches("*.example.com", "www.example.org"));
    }

    #[test]
    fn test_wildcard_needs_two_labels() {
        assert!(!matches("*.com", "localhost"));
        assert!(matches("*.com", "example.com"));
    }

    #[test]
    fn test_other_wildcard_forms_are_literal() {
        assert!(!matches("w*.example.com", "www.example.com"));
        assert!(!matches("*", "localhost"));
        assert!(matches("w*.example.com", "w*.example.com"));
    }

    #[test]
    fn test_dns_names_skips_other_types() {
        let sans = "DNS:example.com, IP Address:10.0.0.1, DNS:*.example.com, email:a@b.c";
        let names: Vec<&str> = dns_names(sans).collect();
        assert_eq!(names, vec!["example.com", "*.example.com"]);
    }

    #[test]
    fn test_matches_any() {
        let sans = Some("DNS:example.com, DNS:*.example.com");
        assert!(matches_any(None, sans, "www.example.com"));
        assert!(matches_any(Some("mail.example.org"), sans, "mail.example.org"));
        assert!(!matches_any(Some("example.com"), sans, "a.b.example.com"));
        assert!(!matches_any(None, None, "example.com"));
    }
}
