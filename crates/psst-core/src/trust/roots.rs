//! Root certificate store and certification path building.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, warn};
use x509_parser::prelude::*;

use super::hostname::{certificate_names, matches_hostname};
use super::{RejectedIssuer, TrustStore, VerificationOptions, VerifyError};
use crate::chain::IntermediatePool;
use crate::types::Certificate;

/// Known root CA store locations across Linux distributions and macOS.
const CA_STORE_PATHS: &[&str] = &[
    // Debian / Ubuntu / Arch bundle
    "/etc/ssl/certs/ca-certificates.crt",
    // Fedora / RHEL bundle
    "/etc/pki/tls/certs/ca-bundle.crt",
    // SUSE
    "/etc/ssl/ca-bundle.pem",
    // Alpine / macOS
    "/etc/ssl/cert.pem",
    // p11-kit trust anchors
    "/etc/ca-certificates/extracted/tls-ca-bundle.pem",
    // Individual cert directories
    "/etc/ssl/certs",
    "/etc/pki/tls/certs",
];

/// Longest path (leaf included) the builder will explore.
const MAX_CHAIN_DEPTH: usize = 16;

/// A set of trusted root certificates.
#[derive(Debug, Clone, Default)]
pub struct RootStore {
    roots: Vec<Certificate>,
    seen: HashSet<Vec<u8>>,
}

impl RootStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the ambient system trust store.
    ///
    /// `SSL_CERT_FILE` and `SSL_CERT_DIR` take precedence; otherwise the
    /// first well-known location that yields certificates wins.
    pub fn system() -> Result<Self, VerifyError> {
        let mut store = Self::new();

        let overrides: Vec<String> = ["SSL_CERT_FILE", "SSL_CERT_DIR"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .filter(|v| !v.is_empty())
            .collect();

        if overrides.is_empty() {
            for path in CA_STORE_PATHS {
                if store.load_path(Path::new(path)) > 0 {
                    break;
                }
            }
        } else {
            for path in &overrides {
                store.load_path(Path::new(path));
            }
        }

        if store.is_empty() {
            return Err(VerifyError::Store("no system trust store found".into()));
        }
        debug!(roots = store.len(), "loaded system trust store");
        Ok(store)
    }

    /// Build a store from a PEM bundle. Blocks that are not certificates
    /// are skipped.
    pub fn from_pem(data: &[u8]) -> Result<Self, VerifyError> {
        let mut store = Self::new();
        store.add_pem_bundle(data)?;
        Ok(store)
    }

    /// Build a store from a PEM bundle file.
    pub fn from_pem_file(path: &Path) -> Result<Self, VerifyError> {
        let data = std::fs::read(path)
            .map_err(|e| VerifyError::Store(format!("{}: {e}", path.display())))?;
        Self::from_pem(&data)
    }

    /// Add every parsable certificate of a PEM bundle; returns how many were new.
    pub fn add_pem_bundle(&mut self, data: &[u8]) -> Result<usize, VerifyError> {
        let blocks = ::pem::parse_many(data).map_err(|e| VerifyError::Store(e.to_string()))?;
        let mut added = 0;
        for (index, block) in blocks.iter().enumerate() {
            if block.tag() != "CERTIFICATE" && block.tag() != "TRUSTED CERTIFICATE" {
                continue;
            }
            match Certificate::from_der(block.contents(), index) {
                Ok(cert) => {
                    if self.add(cert) {
                        added += 1;
                    }
                }
                Err(e) => debug!(error = %e, "skipping root in bundle"),
            }
        }
        Ok(added)
    }

    /// Add a root; returns false if it was already present.
    pub fn add(&mut self, cert: Certificate) -> bool {
        if !self.seen.insert(cert.der().to_vec()) {
            return false;
        }
        self.roots.push(cert);
        true
    }

    pub fn contains(&self, cert: &Certificate) -> bool {
        self.seen.contains(cert.der())
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    fn load_path(&mut self, path: &Path) -> usize {
        if path.is_file() {
            return match std::fs::read(path) {
                Ok(data) => self.add_pem_bundle(&data).unwrap_or_else(|e| {
                    warn!(path = %path.display(), error = %e, "failed to parse CA bundle");
                    0
                }),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to read CA bundle");
                    0
                }
            };
        }
        if !path.is_dir() {
            debug!(path = %path.display(), "CA store path not found, skipping");
            return 0;
        }

        let entries = match std::fs::read_dir(path) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to scan cert directory");
                return 0;
            }
        };
        let mut added = 0;
        for entry in entries.flatten() {
            let file = entry.path();
            let ext = file.extension().and_then(|e| e.to_str()).unwrap_or("");
            if !matches!(ext, "pem" | "crt" | "cer") {
                continue;
            }
            if let Ok(data) = std::fs::read(&file) {
                added += self.add_pem_bundle(&data).unwrap_or(0);
            }
        }
        added
    }

    /// Depth-first search for every path from `cert` to a root.
    ///
    /// The first candidate issuer turned down is kept in `rejected` so an
    /// empty result can say why.
    fn build_paths(
        &self,
        pool: &IntermediatePool,
        now: DateTime<Utc>,
        path: &mut Vec<Certificate>,
        out: &mut Vec<Vec<Certificate>>,
        rejected: &mut Option<RejectedIssuer>,
    ) {
        let Some(cert) = path.last().cloned() else {
            return;
        };
        if self.contains(&cert) {
            out.push(path.clone());
            return;
        }
        if path.len() >= MAX_CHAIN_DEPTH {
            return;
        }

        let from_roots = self
            .roots
            .iter()
            .filter(|root| root.subject_raw() == cert.issuer_raw())
            .map(|root| (root, true));
        let from_pool = pool
            .issuers_of(&cert)
            .filter(|c| !self.contains(c))
            .map(|c| (c, false));

        // Certificates between the leaf and the candidate.
        let intermediates = path.len() - 1;

        for (candidate, is_root) in from_roots.chain(from_pool) {
            if path.contains(candidate) {
                continue;
            }
            if let Err(reason) = check_issuer(&cert, candidate, is_root, intermediates, now) {
                debug!(issuer = %candidate.subject, %reason, "candidate issuer rejected");
                rejected.get_or_insert_with(|| RejectedIssuer {
                    candidate: candidate
                        .common_name
                        .clone()
                        .unwrap_or_else(|| candidate.subject.clone()),
                    reason,
                });
                continue;
            }
            path.push(candidate.clone());
            self.build_paths(pool, now, path, out, rejected);
            path.pop();
        }
    }
}

/// Whether `issuer` may extend a path ending in `child`.
///
/// Roots are trust anchors and need no CA flag; every other issuer must
/// carry basic constraints with `cA` set. Path length limits apply to both.
fn check_issuer(
    child: &Certificate,
    issuer: &Certificate,
    is_root: bool,
    intermediates: usize,
    now: DateTime<Utc>,
) -> Result<(), String> {
    if !is_root && !issuer.is_ca() {
        return Err("certificate is not authorized to sign other certificates".into());
    }
    if !issuer.allows_intermediates(intermediates) {
        return Err("too many intermediates for path length constraint".into());
    }
    if now < issuer.not_before {
        return Err(format!(
            "certificate is not yet valid: current time {now} is before {}",
            issuer.not_before
        ));
    }
    if now > issuer.not_after {
        return Err(format!(
            "certificate has expired: current time {now} is after {}",
            issuer.not_after
        ));
    }
    if !is_signed_by(child, issuer) {
        return Err("signature verification failed".into());
    }
    Ok(())
}

impl TrustStore for RootStore {
    fn verify(
        &self,
        leaf: &Certificate,
        opts: &VerificationOptions<'_>,
    ) -> Result<Vec<Vec<Certificate>>, VerifyError> {
        let now = opts.current_time;
        if now < leaf.not_before {
            return Err(VerifyError::NotYetValid {
                now,
                not_before: leaf.not_before,
            });
        }
        if now > leaf.not_after {
            return Err(VerifyError::Expired {
                now,
                not_after: leaf.not_after,
            });
        }

        if let Some(name) = opts.dns_name.as_deref().filter(|n| !n.is_empty()) {
            if !matches_hostname(leaf, name) {
                return Err(VerifyError::NameMismatch {
                    name: name.to_string(),
                    valid_for: certificate_names(leaf),
                });
            }
        }

        let mut chains = Vec::new();
        let mut path = vec![leaf.clone()];
        let mut rejected = None;
        self.build_paths(opts.intermediates, now, &mut path, &mut chains, &mut rejected);

        if chains.is_empty() {
            return Err(VerifyError::UnknownAuthority { rejected });
        }
        debug!(chains = chains.len(), "verified certificate");
        Ok(chains)
    }
}

/// Whether `issuer`'s key verifies the signature on `child`.
fn is_signed_by(child: &Certificate, issuer: &Certificate) -> bool {
    let Ok((_, child_x509)) = X509Certificate::from_der(child.der()) else {
        return false;
    };
    let Ok((_, issuer_x509)) = X509Certificate::from_der(issuer.der()) else {
        return false;
    };
    child_x509
        .verify_signature(Some(issuer_x509.public_key()))
        .is_ok()
}
