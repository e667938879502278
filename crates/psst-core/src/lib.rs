//! # psst-core
//!
//! Decoding and display engine for cluster secrets.
//!
//! A secret arrives already fetched: a name, a declared type string and a
//! map of raw byte values. This crate picks a decoder for the type and
//! produces something a human can read.
//!
//! ## Data Flow
//!
//! ```text
//! Secret { type, data }
//!   -> codec::decode()            (type dispatch, or raw bypass)
//!      helm.sh/release.v1  base64 -> gzip -> JSON -> indented JSON
//!      kubernetes.io/tls   PEM -> DER chain -> trust + SAN + fingerprints
//!   -> Report rows
//!   -> render::{TableRenderer, TsvRenderer, JsonRenderer}
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use psst_core::{codec, render::{Render, TableRenderer}, trust::RootStore, Secret};
//!
//! let store = RootStore::system()?;
//! match codec::decode(&secret, &codec::DecodeOptions::default(), &store)? {
//!     codec::Decoded::Report(report) => print!("{}", TableRenderer.render_to_string(&report)?),
//!     codec::Decoded::Text(text) => print!("{text}"),
//!     codec::Decoded::Raw(bytes) => std::io::stdout().write_all(&bytes)?,
//! }
//! ```

pub mod chain;
pub mod codec;
mod error;
pub mod fingerprint;
pub mod render;
pub mod report;
pub mod san;
pub mod trust;
pub mod types;

#[cfg(test)]
mod testutil;

pub use codec::{decode, DecodeOptions, Decoded, SecretKind};
pub use error::{DecodeStage, Result, SecretError};
pub use types::*;
