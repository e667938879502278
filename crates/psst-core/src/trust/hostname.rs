//! Matching an expected DNS name against a leaf certificate.

use std::net::IpAddr;

use crate::types::Certificate;

/// Names the certificate is valid for: SAN DNS entries, or the subject CN
/// when the certificate carries no DNS SANs.
pub fn certificate_names(cert: &Certificate) -> Vec<String> {
    if !cert.san.dns.is_empty() {
        return cert.san.dns.clone();
    }
    cert.common_name.iter().cloned().collect()
}

/// Check `host` against the certificate. IP literals match SAN IP entries.
pub fn matches_hostname(cert: &Certificate, host: &str) -> bool {
    if let Ok(ip) = host.trim_start_matches('[').trim_end_matches(']').parse::<IpAddr>() {
        return cert.san.ip.contains(&ip);
    }
    certificate_names(cert)
        .iter()
        .any(|pattern| matches_pattern(pattern, host))
}

/// Case-insensitive match with a single left-most `*` label.
fn matches_pattern(pattern: &str, host: &str) -> bool {
    let pattern = pattern.trim_end_matches('.').to_ascii_lowercase();
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    if pattern.is_empty() || host.is_empty() {
        return false;
    }

    match pattern.strip_prefix("*.") {
        Some(suffix) => match host.split_once('.') {
            Some((first, rest)) => !first.is_empty() && !suffix.is_empty() && rest == suffix,
            None => false,
        },
        None => pattern == host,
    }
}
