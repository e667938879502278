//! Loading a Secret manifest as printed by `kubectl get secret -o json|yaml`.

use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use psst_core::types::SECRET_TYPE_OPAQUE;
use psst_core::Secret;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Wire shape of a v1 Secret. Only the fields psst reads.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SecretManifest {
    kind: Option<String>,
    #[serde(default)]
    metadata: Metadata,
    #[serde(rename = "type")]
    secret_type: Option<String>,
    #[serde(default)]
    data: BTreeMap<String, Option<String>>,
    #[serde(default)]
    string_data: BTreeMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
struct Metadata {
    #[serde(default)]
    name: String,
    #[serde(default)]
    annotations: BTreeMap<String, String>,
}

/// Parse a manifest, trying JSON before YAML.
pub fn parse(input: &[u8]) -> Result<Secret> {
    let manifest: SecretManifest = match serde_json::from_slice(input) {
        Ok(m) => m,
        Err(json_err) => {
            debug!(error = %json_err, "manifest is not JSON, trying YAML");
            serde_yaml::from_slice(input).context("parsing secret manifest")?
        }
    };

    into_secret(manifest)
}

fn into_secret(manifest: SecretManifest) -> Result<Secret> {
    if let Some(kind) = manifest.kind.as_deref() {
        if kind != "Secret" {
            bail!("expected a Secret manifest, got kind {kind:?}");
        }
    }

    let secret_type = manifest
        .secret_type
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| SECRET_TYPE_OPAQUE.to_string());
    let mut secret = Secret::new(manifest.metadata.name, secret_type);
    secret.annotations = manifest.metadata.annotations;

    for (key, value) in manifest.data {
        let encoded: String = value
            .unwrap_or_default()
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let bytes = STANDARD
            .decode(encoded)
            .with_context(|| format!("decoding data key {key:?}"))?;
        secret.data.insert(key, bytes);
    }
    for (key, value) in manifest.string_data {
        secret.data.insert(key, value.into_bytes());
    }

    debug!(
        secret = %secret.name,
        r#type = %secret.secret_type,
        keys = secret.data.len(),
        "loaded secret manifest"
    );
    Ok(secret)
}
