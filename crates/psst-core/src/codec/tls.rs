//! `kubernetes.io/tls` secrets: PEM chain to certificate report.

use chrono::{DateTime, Utc};

use crate::chain::parse_pem_chain;
use crate::error::{Result, SecretError};
use crate::report::build_tls_report;
use crate::trust::{TrustStore, VerificationOptions};
use crate::types::{Report, Secret};

/// Type tag of TLS secrets.
pub const SECRET_TYPE_TLS: &str = "kubernetes.io/tls";

/// Data key holding the PEM certificate chain.
pub const CERT_KEY: &str = "tls.crt";

/// Build the certificate report for a TLS secret.
///
/// `now` is the single reference instant for the whole report.
pub fn format_tls_secret(
    secret: &Secret,
    store: &dyn TrustStore,
    dns_name: Option<String>,
    now: DateTime<Utc>,
) -> Result<Report> {
    if secret.secret_type != SECRET_TYPE_TLS {
        return Err(SecretError::InvalidSecretType {
            expected: SECRET_TYPE_TLS,
            actual: secret.secret_type.clone(),
        });
    }

    let data = secret
        .data
        .get(CERT_KEY)
        .ok_or_else(|| SecretError::MissingKey {
            key: CERT_KEY.into(),
        })?;
    if data.is_empty() {
        return Err(SecretError::EmptyValue {
            key: CERT_KEY.into(),
        });
    }

    let chain = parse_pem_chain(data)?.ok_or_else(|| SecretError::NoCertificates {
        key: CERT_KEY.into(),
    })?;

    let opts = VerificationOptions {
        dns_name,
        intermediates: &chain.intermediates,
        current_time: now,
    };
    Ok(build_tls_report(&chain, store, &opts))
}
