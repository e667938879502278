//! # psst-cli
//!
//! Command-line front end for `psst-core`.
//!
//! ## Features
//!
//! - **Helm releases**: `helm.sh/release.v1` secrets printed as indented JSON
//! - **TLS secrets**: certificate report with trust path, fingerprints and SANs
//! - **Raw mode**: `--raw` prints a key's bytes untouched
//! - **Multiple output formats**: pretty table, TSV, JSON
//!
//! The secret itself comes from a manifest file or stdin, e.g.
//! `kubectl get secret web-tls -o yaml | psst`.

pub mod cli;
pub mod config;
pub mod manifest;
pub mod output;

pub use cli::run;
