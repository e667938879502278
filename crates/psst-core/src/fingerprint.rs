//! Certificate fingerprints via `ring::digest`.

use ring::digest::{digest, SHA1_FOR_LEGACY_USE_ONLY, SHA256};

/// Format a digest as colon-separated uppercase hex (`AB:CD:EF`).
#[must_use]
pub fn format_fingerprint(d: &[u8]) -> String {
    d.iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(":")
}

/// SHA-1 fingerprint of raw DER bytes.
#[must_use]
pub fn sha1_fingerprint(der: &[u8]) -> String {
    format_fingerprint(digest(&SHA1_FOR_LEGACY_USE_ONLY, der).as_ref())
}

/// SHA-256 fingerprint of raw DER bytes.
#[must_use]
pub fn sha256_fingerprint(der: &[u8]) -> String {
    format_fingerprint(digest(&SHA256, der).as_ref())
}
