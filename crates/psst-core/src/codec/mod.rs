//! Secret-type dispatch.
//!
//! The declared type string maps onto [`SecretKind`]; adding a decoder means
//! adding a variant. Raw mode is a separate path that never looks at the type.

pub mod helm;
pub mod tls;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{Result, SecretError};
use crate::trust::TrustStore;
use crate::types::{Report, Secret};

pub use helm::{format_helm_secret, SECRET_TYPE_HELM};
pub use tls::{format_tls_secret, SECRET_TYPE_TLS};

/// Annotation read for the expected DNS name of a TLS leaf.
pub const DEFAULT_DNS_NAME_ANNOTATION: &str = "leaf-manager.io/common-name";

/// Secret types with a registered decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretKind {
    Helm,
    Tls,
    Unknown(String),
}

impl From<&str> for SecretKind {
    fn from(tag: &str) -> Self {
        match tag {
            SECRET_TYPE_HELM => Self::Helm,
            SECRET_TYPE_TLS => Self::Tls,
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// Caller choices for one decode.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    /// Skip type-specific decoding and return a key's bytes
    pub raw: bool,
    /// Key to return in raw mode
    pub key: Option<String>,
    /// Reference time for certificate checks
    pub now: DateTime<Utc>,
    /// Expected DNS name; overrides the annotation
    pub dns_name: Option<String>,
    /// Annotation consulted when `dns_name` is not set
    pub dns_name_annotation: String,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            raw: false,
            key: None,
            now: Utc::now(),
            dns_name: None,
            dns_name_annotation: DEFAULT_DNS_NAME_ANNOTATION.to_string(),
        }
    }
}

/// Output of a successful decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// Pretty-printed structured text
    Text(String),
    /// Certificate report rows
    Report(Report),
    /// Verbatim key value
    Raw(Vec<u8>),
}

/// Decode a secret according to its type, or verbatim in raw mode.
pub fn decode(secret: &Secret, opts: &DecodeOptions, store: &dyn TrustStore) -> Result<Decoded> {
    if opts.raw {
        return raw_value(secret, opts.key.as_deref()).map(|v| Decoded::Raw(v.to_vec()));
    }

    let kind = SecretKind::from(secret.secret_type.as_str());
    debug!(secret = %secret.name, ?kind, "dispatching secret");
    match kind {
        SecretKind::Helm => format_helm_secret(secret).map(Decoded::Text),
        SecretKind::Tls => {
            let dns_name = opts.dns_name.clone().or_else(|| {
                secret
                    .annotations
                    .get(&opts.dns_name_annotation)
                    .cloned()
            });
            format_tls_secret(secret, store, dns_name, opts.now).map(Decoded::Report)
        }
        SecretKind::Unknown(tag) => Err(SecretError::UnsupportedSecretType(tag)),
    }
}

/// Select a key's value without decoding.
///
/// With no key given, a secret holding exactly one key yields that key.
pub fn raw_value<'a>(secret: &'a Secret, key: Option<&str>) -> Result<&'a [u8]> {
    if secret.data.is_empty() {
        return Err(SecretError::NoData {
            name: secret.name.clone(),
        });
    }

    let key = match key {
        Some(key) => key,
        None if secret.data.len() == 1 => {
            let only = secret.data.keys().next().map_or("", String::as_str);
            debug!(key = only, "selecting only key");
            only
        }
        None => {
            return Err(SecretError::KeyRequired {
                available: secret.keys(),
            })
        }
    };

    secret
        .data
        .get(key)
        .map(Vec::as_slice)
        .ok_or_else(|| SecretError::UnknownKey {
            key: key.to_string(),
            available: secret.keys(),
        })
}

/// Append a newline for terminal output; leave piped output byte-exact.
pub fn ensure_trailing_newline(mut value: Vec<u8>, is_terminal: bool) -> Vec<u8> {
    if is_terminal && !value.ends_with(b"\n") {
        value.push(b'\n');
    }
    value
}
