//! Secret input type.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Type tag the API server assigns when none is given.
pub const SECRET_TYPE_OPAQUE: &str = "Opaque";

/// A secret as fetched from the store, already materialized in memory.
///
/// The core only reads it; values are raw bytes (not base64).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secret {
    /// Secret name
    pub name: String,
    /// Declared type string (e.g. `kubernetes.io/tls`)
    #[serde(rename = "type")]
    pub secret_type: String,
    /// Key name to raw value
    #[serde(default)]
    pub data: BTreeMap<String, Vec<u8>>,
    /// Metadata annotations
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
}

impl Secret {
    /// Create an empty secret of the given type.
    pub fn new(name: impl Into<String>, secret_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            secret_type: secret_type.into(),
            ..Self::default()
        }
    }

    /// Builder-style helper to add a data entry.
    #[must_use]
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Builder-style helper to add an annotation.
    #[must_use]
    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    /// Sorted list of data keys.
    pub fn keys(&self) -> Vec<String> {
        self.data.keys().cloned().collect()
    }
}
