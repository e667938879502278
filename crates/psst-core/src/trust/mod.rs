//! Chain-of-trust evaluation.
//!
//! The trust store is a capability ([`TrustStore`]) so the report can be
//! produced against the machine's installed roots ([`RootStore::system`]) or
//! against a fixed bundle ([`RootStore::from_pem`]).
//!
//! A failed verification is not an error for the caller: it becomes a
//! warning row in the report.

pub mod hostname;
pub mod roots;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::chain::IntermediatePool;
use crate::types::{Certificate, ReportRow};

pub use roots::RootStore;

/// Label of the trust rows.
pub const TRUST_LABEL: &str = "System Trust";

/// Inputs to a verification, fixed once per invocation.
#[derive(Debug, Clone)]
pub struct VerificationOptions<'a> {
    /// Expected DNS name; `None` or empty skips the name check
    pub dns_name: Option<String>,
    /// Candidate intermediates from the same bundle as the leaf
    pub intermediates: &'a IntermediatePool,
    /// Reference instant for every validity comparison
    pub current_time: DateTime<Utc>,
}

/// Why a leaf could not be verified.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    #[error("certificate has expired: current time {now} is after {not_after}")]
    Expired {
        now: DateTime<Utc>,
        not_after: DateTime<Utc>,
    },

    #[error("certificate is not yet valid: current time {now} is before {not_before}")]
    NotYetValid {
        now: DateTime<Utc>,
        not_before: DateTime<Utc>,
    },

    #[error("{}", name_mismatch_message(.name, .valid_for))]
    NameMismatch { name: String, valid_for: Vec<String> },

    #[error("certificate signed by unknown authority{}", rejection_hint(.rejected))]
    UnknownAuthority { rejected: Option<RejectedIssuer> },

    #[error("trust store unavailable: {0}")]
    Store(String),
}

/// First candidate issuer turned down while building paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedIssuer {
    /// Common name of the candidate, or its subject when it has none
    pub candidate: String,
    /// Why the candidate could not extend the path
    pub reason: String,
}

fn rejection_hint(rejected: &Option<RejectedIssuer>) -> String {
    rejected.as_ref().map_or_else(String::new, |r| {
        format!(
            " (possibly because of {:?} while trying to verify candidate authority certificate {:?})",
            r.reason, r.candidate
        )
    })
}

fn name_mismatch_message(name: &str, valid_for: &[String]) -> String {
    if valid_for.is_empty() {
        format!("certificate is not valid for any names, but wanted to match {name}")
    } else {
        format!("certificate is valid for {}, not {name}", valid_for.join(", "))
    }
}

/// Source of trusted roots able to verify a leaf.
pub trait TrustStore {
    /// Every certification path from `leaf` to a trusted root, each path
    /// starting with the leaf itself.
    fn verify(
        &self,
        leaf: &Certificate,
        opts: &VerificationOptions<'_>,
    ) -> Result<Vec<Vec<Certificate>>, VerifyError>;
}

/// A store that could not be loaded; every verification reports why.
#[derive(Debug, Clone)]
pub struct UnavailableStore(pub VerifyError);

impl TrustStore for UnavailableStore {
    fn verify(
        &self,
        _leaf: &Certificate,
        _opts: &VerificationOptions<'_>,
    ) -> Result<Vec<Vec<Certificate>>, VerifyError> {
        Err(self.0.clone())
    }
}

/// Classified verification result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrustOutcome {
    /// Verification failed; carries the error text
    Untrusted(String),
    /// The leaf is trusted with nothing above it
    TrustedDirectly,
    /// Rendered paths above the leaf, in verifier order
    Paths(Vec<String>),
}

/// Verify `leaf` and classify the result.
pub fn evaluate(
    store: &dyn TrustStore,
    leaf: &Certificate,
    opts: &VerificationOptions<'_>,
) -> TrustOutcome {
    let chains = match store.verify(leaf, opts) {
        Ok(chains) => chains,
        Err(e) => {
            tracing::debug!(error = %e, "trust verification failed");
            return TrustOutcome::Untrusted(e.to_string());
        }
    };

    if chains.is_empty() || (chains.len() == 1 && chains[0].len() <= 1) {
        return TrustOutcome::TrustedDirectly;
    }

    // First entry of every chain is the leaf itself.
    let paths = chains
        .iter()
        .map(|chain| {
            chain
                .iter()
                .skip(1)
                .map(Certificate::display_name)
                .collect::<Vec<_>>()
                .join(" -> ")
        })
        .collect();
    TrustOutcome::Paths(paths)
}

/// Report rows for a trust outcome.
pub fn trust_rows(outcome: &TrustOutcome) -> Vec<ReportRow> {
    match outcome {
        TrustOutcome::Untrusted(msg) => vec![ReportRow::new(TRUST_LABEL, format!("❗ {msg}"))],
        TrustOutcome::TrustedDirectly => vec![ReportRow::new(TRUST_LABEL, "🔒 System")],
        TrustOutcome::Paths(paths) if paths.len() == 1 => {
            vec![ReportRow::new(TRUST_LABEL, format!("🔒 {}", paths[0]))]
        }
        TrustOutcome::Paths(paths) => {
            let mut rows = Vec::with_capacity(paths.len() + 1);
            rows.push(ReportRow::new(TRUST_LABEL, "🔒"));
            rows.extend(paths.iter().map(|p| ReportRow::new("", p.as_str()).indented()));
            rows
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::parse_pem_chain;
    use crate::testutil::{bundle, CertBuilder};
    use chrono::TimeZone;

    struct FixedStore(Result<Vec<Vec<Certificate>>, VerifyError>);

    impl TrustStore for FixedStore {
        fn verify(
            &self,
            _leaf: &Certificate,
            _opts: &VerificationOptions<'_>,
        ) -> Result<Vec<Vec<Certificate>>, VerifyError> {
            self.0.clone()
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn self_signed_trusted_leaf_is_direct() {
        let leaf = CertBuilder::new("self").self_signed();
        let chain = parse_pem_chain(leaf.pem().as_bytes()).unwrap().unwrap();
        let store = RootStore::from_pem(leaf.pem().as_bytes()).unwrap();
        let opts = VerificationOptions {
            dns_name: None,
            intermediates: &chain.intermediates,
            current_time: now(),
        };

        let outcome = evaluate(&store, &chain.leaf, &opts);
        assert_eq!(outcome, TrustOutcome::TrustedDirectly);
        assert_eq!(
            trust_rows(&outcome),
            [ReportRow::new(TRUST_LABEL, "🔒 System")]
        );
    }

    #[test]
    fn single_path_strips_leaf() {
        let root = CertBuilder::new("Root").organization("Acme").ca().self_signed();
        let inter = CertBuilder::new("Issuing").ca().signed_by(&root);
        let leaf = CertBuilder::new("www").signed_by(&inter);
        let chain = parse_pem_chain(&bundle(&[&leaf, &inter])).unwrap().unwrap();
        let store = RootStore::from_pem(root.pem().as_bytes()).unwrap();
        let opts = VerificationOptions {
            dns_name: None,
            intermediates: &chain.intermediates,
            current_time: now(),
        };

        let outcome = evaluate(&store, &chain.leaf, &opts);
        assert_eq!(
            outcome,
            TrustOutcome::Paths(vec!["Issuing -> Acme/Root".into()])
        );
        assert_eq!(
            trust_rows(&outcome),
            [ReportRow::new(TRUST_LABEL, "🔒 Issuing -> Acme/Root")]
        );
    }

    #[test]
    fn multiple_paths_render_header_then_rows() {
        let root = CertBuilder::new("Root").ca().self_signed();
        let other = CertBuilder::new("Other Root").organization("Other").ca().self_signed();
        let leaf = CertBuilder::new("www").signed_by(&root);
        let leaf_cert = Certificate::from_der(leaf.der(), 0).unwrap();
        let root_cert = Certificate::from_der(root.der(), 1).unwrap();
        let other_cert = Certificate::from_der(other.der(), 2).unwrap();
        let pool = IntermediatePool::new();
        let opts = VerificationOptions {
            dns_name: None,
            intermediates: &pool,
            current_time: now(),
        };

        let store = FixedStore(Ok(vec![
            vec![leaf_cert.clone(), root_cert],
            vec![leaf_cert.clone(), other_cert],
        ]));
        let rows = trust_rows(&evaluate(&store, &leaf_cert, &opts));

        assert_eq!(
            rows,
            [
                ReportRow::new(TRUST_LABEL, "🔒"),
                ReportRow::new("", "Root").indented(),
                ReportRow::new("", "Other/Other Root").indented(),
            ]
        );
    }

    #[test]
    fn failure_becomes_warning_row() {
        let leaf = CertBuilder::new("www").self_signed();
        let leaf_cert = Certificate::from_der(leaf.der(), 0).unwrap();
        let pool = IntermediatePool::new();
        let opts = VerificationOptions {
            dns_name: None,
            intermediates: &pool,
            current_time: now(),
        };

        let store = UnavailableStore(VerifyError::Store("no system trust store found".into()));
        let rows = trust_rows(&evaluate(&store, &leaf_cert, &opts));
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].value,
            "❗ trust store unavailable: no system trust store found"
        );

        let empty = FixedStore(Ok(Vec::new()));
        assert_eq!(
            evaluate(&empty, &leaf_cert, &opts),
            TrustOutcome::TrustedDirectly
        );
    }

    #[test]
    fn unknown_authority_mentions_rejected_candidate() {
        let bare = VerifyError::UnknownAuthority { rejected: None };
        assert_eq!(bare.to_string(), "certificate signed by unknown authority");

        let hinted = VerifyError::UnknownAuthority {
            rejected: Some(RejectedIssuer {
                candidate: "Issuing CA".into(),
                reason: "certificate is not authorized to sign other certificates".into(),
            }),
        };
        assert_eq!(
            hinted.to_string(),
            "certificate signed by unknown authority (possibly because of \"certificate is not \
             authorized to sign other certificates\" while trying to verify candidate authority \
             certificate \"Issuing CA\")"
        );
    }

    #[test]
    fn name_mismatch_without_names() {
        let err = VerifyError::NameMismatch {
            name: "a.example".into(),
            valid_for: Vec::new(),
        };
        assert_eq!(
            err.to_string(),
            "certificate is not valid for any names, but wanted to match a.example"
        );
    }
}
