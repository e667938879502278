use std::fmt;

use thiserror::Error;

/// Result type alias for secret decoding operations
pub type Result<T> = std::result::Result<T, SecretError>;

/// Decoding stage that produced a [`SecretError::MalformedEncoding`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStage {
    /// PEM framing of a certificate bundle
    PemDecode,
    /// Standard base64 alphabet decoding
    Base64Decode,
    /// gzip member decompression
    GzipDecompress,
    /// JSON document decoding
    JsonDecode,
}

impl fmt::Display for DecodeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PemDecode => write!(f, "pem decode"),
            Self::Base64Decode => write!(f, "base64 decode"),
            Self::GzipDecompress => write!(f, "gzip decompress"),
            Self::JsonDecode => write!(f, "json decode"),
        }
    }
}

/// Errors that can occur while decoding a secret
#[derive(Error, Debug)]
pub enum SecretError {
    /// A codec was handed a secret of a type it does not handle
    #[error("invalid secret type: expected {expected}, got {actual}")]
    InvalidSecretType {
        /// Type tag the codec handles
        expected: &'static str,
        /// Type tag found on the secret
        actual: String,
    },

    /// A required key is absent from the secret data
    #[error("secret missing key: {key}")]
    MissingKey {
        /// Name of the missing key
        key: String,
    },

    /// A required key is present but holds no bytes
    #[error("secret has empty key: {key}")]
    EmptyValue {
        /// Name of the empty key
        key: String,
    },

    /// The secret has no data entries at all
    #[error("secret {name:?} has no data")]
    NoData {
        /// Secret name
        name: String,
    },

    /// Several keys exist and none was selected
    #[error("secret has several keys, choose one of: {}", .available.join(", "))]
    KeyRequired {
        /// Keys present on the secret, sorted
        available: Vec<String>,
    },

    /// The selected key is not present in the secret
    #[error("no such key in secret: {key} (available: {})", .available.join(", "))]
    UnknownKey {
        /// Key that was requested
        key: String,
        /// Keys present on the secret, sorted
        available: Vec<String>,
    },

    /// A certificate key contained no PEM blocks
    #[error("no PEM certificates found in key: {key}")]
    NoCertificates {
        /// Name of the certificate key
        key: String,
    },

    /// A PEM block did not hold a valid DER certificate
    #[error("parsing TLS certificate #{index}: {reason}")]
    MalformedCertificate {
        /// Zero-based position of the block in the PEM stream
        index: usize,
        /// Parser error text
        reason: String,
    },

    /// One of the layered encodings failed to decode
    #[error("{stage}: {reason}")]
    MalformedEncoding {
        /// Stage that failed
        stage: DecodeStage,
        /// Underlying error text
        reason: String,
    },

    /// No decoder is registered for the secret type and raw mode is off
    #[error("unsupported secret type: {0} (use raw mode to print a key)")]
    UnsupportedSecretType(String),
}

impl SecretError {
    pub(crate) fn encoding(stage: DecodeStage, reason: impl fmt::Display) -> Self {
        Self::MalformedEncoding {
            stage,
            reason: reason.to_string(),
        }
    }

    /// Returns true if the error stems from the caller's key selection
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(self, Self::KeyRequired { .. } | Self::UnknownKey { .. })
    }

    /// Returns the decoding stage if this is an encoding error
    #[must_use]
    pub const fn stage(&self) -> Option<DecodeStage> {
        match self {
            Self::MalformedEncoding { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}
