//! Helm release secrets: base64, then gzip, then JSON.

use base64::Engine;
use flate2::read::MultiGzDecoder;
use serde_json::{Map, Value};
use std::io::Read;

use crate::error::{DecodeStage, Result, SecretError};
use crate::types::Secret;

/// Type tag of Helm 3 release secrets.
pub const SECRET_TYPE_HELM: &str = "helm.sh/release.v1";

/// Data key holding the encoded release.
pub const RELEASE_KEY: &str = "release";

/// Decode a Helm release secret into indented JSON ending with a newline.
pub fn format_helm_secret(secret: &Secret) -> Result<String> {
    if secret.secret_type != SECRET_TYPE_HELM {
        return Err(SecretError::InvalidSecretType {
            expected: SECRET_TYPE_HELM,
            actual: secret.secret_type.clone(),
        });
    }
    let data = secret
        .data
        .get(RELEASE_KEY)
        .ok_or_else(|| SecretError::MissingKey {
            key: RELEASE_KEY.into(),
        })?;

    let release = decode_release(data)?;
    let mut text = serde_json::to_string_pretty(&release)
        .map_err(|e| SecretError::encoding(DecodeStage::JsonDecode, e))?;
    text.push('\n');
    Ok(text)
}

/// Undo the release encoding. The release shape is opaque, so it is kept as
/// an arbitrary JSON object.
pub fn decode_release(data: &[u8]) -> Result<Map<String, Value>> {
    // Line breaks inside the encoded value are ignored.
    let encoded: Vec<u8> = data
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    let compressed = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| SecretError::encoding(DecodeStage::Base64Decode, e))?;

    // Concatenated gzip members decode as one stream.
    let mut json = Vec::new();
    MultiGzDecoder::new(compressed.as_slice())
        .read_to_end(&mut json)
        .map_err(|e| SecretError::encoding(DecodeStage::GzipDecompress, e))?;

    serde_json::from_slice(&json).map_err(|e| SecretError::encoding(DecodeStage::JsonDecode, e))
}
