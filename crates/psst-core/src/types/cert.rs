//! Parsed X.509 certificate.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use x509_parser::prelude::*;
use x509_parser::public_key::PublicKey;
use x509_parser::time::ASN1Time;

use crate::error::{Result, SecretError};
use crate::san::SubjectAltNames;

const OID_RSA_ENCRYPTION: &str = "1.2.840.113549.1.1.1";
const OID_EC_PUBLIC_KEY: &str = "1.2.840.10045.2.1";
const OID_ED25519: &str = "1.3.101.112";
const OID_ED448: &str = "1.3.101.113";
const OID_DSA: &str = "1.2.840.10040.4.1";

/// Public key algorithm of a certificate's subject key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PublicKeyAlgorithm {
    Rsa,
    Ecdsa,
    Ed25519,
    Ed448,
    Dsa,
    Unknown,
}

impl PublicKeyAlgorithm {
    fn from_oid(oid: &str) -> Self {
        match oid {
            OID_RSA_ENCRYPTION => Self::Rsa,
            OID_EC_PUBLIC_KEY => Self::Ecdsa,
            OID_ED25519 => Self::Ed25519,
            OID_ED448 => Self::Ed448,
            OID_DSA => Self::Dsa,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for PublicKeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rsa => write!(f, "RSA"),
            Self::Ecdsa => write!(f, "ECDSA"),
            Self::Ed25519 => write!(f, "Ed25519"),
            Self::Ed448 => write!(f, "Ed448"),
            Self::Dsa => write!(f, "DSA"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Basic constraints extension values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasicConstraints {
    /// `cA` flag
    pub ca: bool,
    /// Maximum number of intermediates that may follow this certificate
    pub path_len: Option<u32>,
}

/// One DER-encoded certificate with the fields the report needs.
///
/// Built once per PEM block and never cached.
#[derive(Debug, Clone)]
pub struct Certificate {
    /// Subject distinguished name (human-readable)
    pub subject: String,
    /// Issuer distinguished name (human-readable)
    pub issuer: String,
    /// First organization (O) of the subject
    pub organization: Option<String>,
    /// First common name (CN) of the subject
    pub common_name: Option<String>,
    /// Not valid before
    pub not_before: DateTime<Utc>,
    /// Not valid after
    pub not_after: DateTime<Utc>,
    /// Subject public key algorithm
    pub key_algorithm: PublicKeyAlgorithm,
    /// RSA modulus bits or ECDSA curve bits
    pub key_size: Option<u32>,
    /// Subject key identifier extension value
    pub subject_key_id: Option<Vec<u8>>,
    /// Subject alternative names
    pub san: SubjectAltNames,
    /// Basic constraints, `None` when the extension is absent
    pub basic_constraints: Option<BasicConstraints>,
    subject_raw: Vec<u8>,
    issuer_raw: Vec<u8>,
    der: Vec<u8>,
}

impl PartialEq for Certificate {
    fn eq(&self, other: &Self) -> bool {
        self.der == other.der
    }
}

impl Eq for Certificate {}

impl Certificate {
    /// Parse a DER certificate. `index` is its position in the PEM stream.
    pub fn from_der(der: &[u8], index: usize) -> Result<Self> {
        let malformed = |reason: String| SecretError::MalformedCertificate { index, reason };

        let (rest, x509) =
            X509Certificate::from_der(der).map_err(|e| malformed(e.to_string()))?;
        if !rest.is_empty() {
            return Err(malformed(format!("{} bytes of trailing data", rest.len())));
        }

        let validity = x509.validity();
        let not_before = asn1_to_utc(validity.not_before)
            .ok_or_else(|| malformed("notBefore out of range".into()))?;
        let not_after = asn1_to_utc(validity.not_after)
            .ok_or_else(|| malformed("notAfter out of range".into()))?;

        let spki = x509.public_key();
        let key_algorithm = PublicKeyAlgorithm::from_oid(&spki.algorithm.algorithm.to_id_string());
        let key_size = key_size(spki, key_algorithm);

        let subject_key_id = x509.extensions().iter().find_map(|ext| {
            match ext.parsed_extension() {
                ParsedExtension::SubjectKeyIdentifier(ski) => Some(ski.0.to_vec()),
                _ => None,
            }
        });

        let basic_constraints = x509
            .basic_constraints()
            .ok()
            .flatten()
            .map(|bc| BasicConstraints {
                ca: bc.value.ca,
                path_len: bc.value.path_len_constraint,
            });

        Ok(Self {
            subject: x509.subject().to_string(),
            issuer: x509.issuer().to_string(),
            organization: first_attr(x509.subject().iter_organization()),
            common_name: first_attr(x509.subject().iter_common_name()),
            not_before,
            not_after,
            key_algorithm,
            key_size,
            subject_key_id,
            san: SubjectAltNames::from_x509(&x509),
            basic_constraints,
            subject_raw: x509.subject().as_raw().to_vec(),
            issuer_raw: x509.issuer().as_raw().to_vec(),
            der: der.to_vec(),
        })
    }

    /// Raw DER encoding.
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// Raw DER encoding of the subject name.
    pub fn subject_raw(&self) -> &[u8] {
        &self.subject_raw
    }

    /// Raw DER encoding of the issuer name.
    pub fn issuer_raw(&self) -> &[u8] {
        &self.issuer_raw
    }

    /// Subject and issuer names are identical.
    pub fn is_self_issued(&self) -> bool {
        self.subject_raw == self.issuer_raw
    }

    /// `Organization/CommonName`, organization omitted when absent.
    pub fn display_name(&self) -> String {
        let cn = self.common_name.as_deref().unwrap_or_default();
        match &self.organization {
            Some(org) => format!("{org}/{cn}"),
            None => cn.to_string(),
        }
    }

    /// Marked as a CA by a basic constraints extension.
    pub fn is_ca(&self) -> bool {
        self.basic_constraints.is_some_and(|bc| bc.ca)
    }

    /// Whether `intermediates` certificates may sit between this issuer and
    /// the leaf under its path length constraint.
    pub fn allows_intermediates(&self, intermediates: usize) -> bool {
        self.basic_constraints
            .and_then(|bc| bc.path_len)
            .and_then(|max| usize::try_from(max).ok())
            .map_or(true, |max| intermediates <= max)
    }

    /// `not_before <= now <= not_after`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.not_before <= now && now <= self.not_after
    }
}

/// Convert an ASN.1 `GeneralizedTime` / `UTCTime` to `DateTime<Utc>`.
fn asn1_to_utc(t: ASN1Time) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(t.timestamp(), 0).single()
}

fn first_attr<'a, 'b: 'a, I>(mut attrs: I) -> Option<String>
where
    I: Iterator<Item = &'a AttributeTypeAndValue<'b>>,
{
    attrs
        .next()
        .and_then(|a| a.as_str().ok())
        .map(str::to_owned)
}

fn key_size(spki: &SubjectPublicKeyInfo<'_>, algorithm: PublicKeyAlgorithm) -> Option<u32> {
    match algorithm {
        PublicKeyAlgorithm::Rsa => match spki.parsed() {
            Ok(PublicKey::RSA(rsa)) => Some(bit_length(rsa.modulus)),
            _ => None,
        },
        PublicKeyAlgorithm::Ecdsa => {
            let curve = spki.algorithm.parameters.as_ref()?.as_oid().ok()?;
            match curve.to_id_string().as_str() {
                // secp192r1
                "1.2.840.10045.3.1.1" => Some(192),
                // secp224r1
                "1.3.132.0.33" => Some(224),
                // prime256v1
                "1.2.840.10045.3.1.7" => Some(256),
                // secp384r1
                "1.3.132.0.34" => Some(384),
                // secp521r1
                "1.3.132.0.35" => Some(521),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Bit length of a big-endian unsigned integer.
fn bit_length(bytes: &[u8]) -> u32 {
    let Some(start) = bytes.iter().position(|&b| b != 0) else {
        return 0;
    };
    let effective = &bytes[start..];
    #[allow(clippy::cast_possible_truncation)]
    let rest_bits = ((effective.len() - 1) * 8) as u32;
    8 - effective[0].leading_zeros() + rest_bits
}
