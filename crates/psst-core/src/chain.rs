//! PEM bundle to certificate chain.

use std::collections::HashSet;
use tracing::debug;

use crate::error::{DecodeStage, Result, SecretError};
use crate::types::Certificate;

/// Candidate intermediates, keyed by raw DER bytes.
///
/// Duplicates are tolerated: the first copy wins and the rest are dropped.
/// Iteration follows insertion order.
#[derive(Debug, Clone, Default)]
pub struct IntermediatePool {
    certs: Vec<Certificate>,
    seen: HashSet<Vec<u8>>,
}

impl IntermediatePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a certificate; returns false if the same DER was already present.
    pub fn add(&mut self, cert: Certificate) -> bool {
        if !self.seen.insert(cert.der().to_vec()) {
            return false;
        }
        self.certs.push(cert);
        true
    }

    /// Intermediates whose subject matches the given raw issuer name.
    pub fn issuers_of<'a>(&'a self, child: &'a Certificate) -> impl Iterator<Item = &'a Certificate> {
        self.certs
            .iter()
            .filter(move |c| c.subject_raw() == child.issuer_raw())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Certificate> {
        self.certs.iter()
    }

    pub fn len(&self) -> usize {
        self.certs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.certs.is_empty()
    }
}

/// Leaf certificate plus the intermediates that followed it.
#[derive(Debug, Clone)]
pub struct CertificateChain {
    /// The certificate being reported on
    pub leaf: Certificate,
    /// Everything after the leaf, in PEM order
    pub intermediates: IntermediatePool,
}

/// Split a PEM stream into a chain.
///
/// Returns `Ok(None)` if the buffer holds no PEM blocks. Any block that is
/// not a DER certificate fails the whole parse.
pub fn parse_pem_chain(data: &[u8]) -> Result<Option<CertificateChain>> {
    let blocks = pem::parse_many(data)
        .map_err(|e| SecretError::encoding(DecodeStage::PemDecode, e))?;

    let mut certs = blocks
        .iter()
        .enumerate()
        .map(|(index, block)| {
            debug!(index, tag = block.tag(), len = block.contents().len(), "parsing PEM block");
            Certificate::from_der(block.contents(), index)
        })
        .collect::<Result<Vec<_>>>()?
        .into_iter();

    let Some(leaf) = certs.next() else {
        return Ok(None);
    };

    let mut intermediates = IntermediatePool::new();
    for cert in certs {
        if !intermediates.add(cert) {
            debug!("duplicate intermediate in bundle");
        }
    }

    Ok(Some(CertificateChain {
        leaf,
        intermediates,
    }))
}
