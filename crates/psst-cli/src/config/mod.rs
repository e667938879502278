//! Configuration management.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use psst_core::codec::DEFAULT_DNS_NAME_ANNOTATION;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::output::OutputFormat;

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Default output format for certificate reports.
    pub output_format: Option<OutputFormat>,

    /// PEM bundle used instead of the system trust store.
    pub ca_bundle: Option<PathBuf>,

    /// Annotation holding the expected DNS name of a TLS leaf.
    #[serde(default = "default_annotation")]
    pub dns_name_annotation: String,
}

fn default_annotation() -> String {
    DEFAULT_DNS_NAME_ANNOTATION.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_format: None,
            ca_bundle: None,
            dns_name_annotation: default_annotation(),
        }
    }
}

impl Config {
    /// Get the config file path.
    pub fn path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("rs", "psst", "psst")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Load configuration from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load configuration from a file; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let config = Config::load_from(Path::new("/nonexistent/psst/config.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.dns_name_annotation, "leaf-manager.io/common-name");
    }

    #[test]
    fn reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "output_format = \"tsv\"\nca_bundle = \"/etc/psst/roots.pem\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.output_format, Some(OutputFormat::Tsv));
        assert_eq!(config.ca_bundle, Some(PathBuf::from("/etc/psst/roots.pem")));
        assert_eq!(config.dns_name_annotation, DEFAULT_DNS_NAME_ANNOTATION);
    }

    #[test]
    fn rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "output_format = [").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
