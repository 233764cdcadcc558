//! Domain name helpers

use crate::error::{DnsError, DnsResult};

/// Maximum length of a domain name in presentation form.
pub const MAX_DOMAIN_LEN: usize = 253;

/// Validate and normalise a domain name.
///
/// Trims whitespace and a trailing dot, lowercases, and converts internationalised
/// labels to ASCII via IDNA 2008.
pub fn validate_domain(domain: &str) -> DnsResult<String> {
    let trimmed = domain.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        return Err(DnsError::InvalidName("domain name is required".to_string()));
    }
    if trimmed.parse::<std::net::IpAddr>().is_ok() {
        return Err(DnsError::InvalidName(format!("{trimmed} is an IP address")));
    }
    let ascii = idna::domain_to_ascii_strict(trimmed)
        .map_err(|_| DnsError::InvalidName(trimmed.to_string()))?;
    if ascii.len() > MAX_DOMAIN_LEN {
        return Err(DnsError::InvalidName(format!(
            "exceeds {MAX_DOMAIN_LEN} characters (got {})",
            ascii.len()
        )));
    }
    Ok(ascii)
}

/// Lowercase a hostname and strip its trailing dot, for comparison.
#[must_use]
pub fn normalize_host(host: &str) -> String {
    host.trim().trim_end_matches('.').to_ascii_lowercase()
}

/// Number of labels in a domain name.
#[must_use]
pub fn label_count(domain: &str) -> usize {
    normalize_host(domain)
        .split('.')
        .filter(|l| !l.is_empty())
        .count()
}

/// The domain with its leftmost label removed, if at least two labels remain.
#[must_use]
pub fn parent_domain(domain: &str) -> Option<String> {
    let normalized = normalize_host(domain);
    let (_, parent) = normalized.split_once('.')?;
    (label_count(parent) >= 2).then(|| parent.to_string())
}

/// Whether `host` equals `required` or is a subdomain of it (both normalised).
#[must_use]
pub fn host_matches(host: &str, required: &str) -> bool {
    let host = normalize_host(host);
    let required = normalize_host(required);
    if required.is_empty() {
        return false;
    }
    host == required || host.ends_with(&format!(".{required}"))
}
