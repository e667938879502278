//! Command-line argument definitions.

use chrono::{DateTime, Utc};
use clap::Parser;
use std::path::PathBuf;

use crate::output::OutputFormat;

/// Print Kubernetes secrets in a readable form
#[derive(Parser, Debug)]
#[command(name = "psst", author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = "EXAMPLES:
    kubectl get secret web-tls -o yaml | psst
    psst release.json
    psst --raw db-secret.yaml password")]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Secret manifest to read (`-` or omitted reads stdin)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Key to print in raw mode
    #[arg(value_name = "KEY")]
    pub key: Option<String>,

    /// Print the key's value verbatim instead of decoding the secret
    #[arg(long)]
    pub raw: bool,

    /// Output format for certificate reports
    #[arg(short, long, value_enum, env = "PSST_OUTPUT")]
    pub output: Option<OutputFormat>,

    /// Expected DNS name of a TLS leaf (overrides the annotation)
    #[arg(long, value_name = "NAME")]
    pub dns_name: Option<String>,

    /// PEM bundle to trust instead of the system store
    #[arg(long, value_name = "PATH", env = "PSST_CA_BUNDLE")]
    pub ca_bundle: Option<PathBuf>,

    /// Evaluate certificates at this time instead of now
    #[arg(long, value_name = "RFC3339", value_parser = parse_time)]
    pub at: Option<DateTime<Utc>>,

    /// List the secret's keys and exit
    #[arg(long)]
    pub list_keys: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colors
    #[arg(long)]
    pub no_color: bool,
}

fn parse_time(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("invalid RFC 3339 timestamp {s:?}: {e}"))
}
