//! CLI entry point and command dispatch.

pub mod args;

use anyhow::{Context, Result};
use clap::Parser;
use console::Term;
use psst_core::codec::ensure_trailing_newline;
use psst_core::trust::{RootStore, TrustStore, UnavailableStore};
use psst_core::{DecodeOptions, Decoded, Secret, SecretKind};
use std::io::{self, Read, Write};
use std::path::Path;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

pub use args::Cli;

use crate::config::Config;
use crate::manifest;

/// Run the CLI application.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = Config::load()?;
    execute(&cli, &config, &mut io::stdout().lock(), Term::stdout().is_term())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// Decode the selected secret and write it to `out`.
pub fn execute(cli: &Cli, config: &Config, out: &mut dyn Write, is_terminal: bool) -> Result<()> {
    let input = read_input(cli.file.as_deref())?;
    let secret = manifest::parse(&input)?;

    if cli.list_keys {
        for key in secret.keys() {
            writeln!(out, "{key}")?;
        }
        return Ok(());
    }

    let opts = DecodeOptions {
        raw: cli.raw,
        key: cli.key.clone(),
        now: cli.at.unwrap_or_else(chrono::Utc::now),
        dns_name: cli.dns_name.clone(),
        dns_name_annotation: config.dns_name_annotation.clone(),
    };

    let ca_bundle = cli.ca_bundle.as_deref().or(config.ca_bundle.as_deref());
    let store = trust_store(&secret, &opts, ca_bundle);

    let decoded = psst_core::decode(&secret, &opts, store.as_ref())
        .with_context(|| format!("secret {:?}", secret.name))?;

    match decoded {
        Decoded::Raw(bytes) => out.write_all(&ensure_trailing_newline(bytes, is_terminal))?,
        Decoded::Text(text) => out.write_all(text.as_bytes())?,
        Decoded::Report(report) => {
            let format = cli.output.or(config.output_format).unwrap_or_default();
            format.renderer().render(&report, out)?;
        }
    }

    out.flush()?;
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(p) if p != Path::new("-") => {
            std::fs::read(p).with_context(|| format!("reading {}", p.display()))
        }
        _ => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("reading secret manifest from stdin")?;
            Ok(buf)
        }
    }
}

/// Trust store for this run. Only TLS reports consult it.
///
/// A store that fails to load is reported inside the report, not as a
/// fatal error.
fn trust_store(
    secret: &Secret,
    opts: &DecodeOptions,
    ca_bundle: Option<&Path>,
) -> Box<dyn TrustStore> {
    let needs_store =
        !opts.raw && SecretKind::from(secret.secret_type.as_str()) == SecretKind::Tls;
    if !needs_store {
        return Box::new(RootStore::new());
    }

    let loaded = match ca_bundle {
        Some(path) => {
            debug!(path = %path.display(), "loading CA bundle");
            RootStore::from_pem_file(path)
        }
        None => RootStore::system(),
    };

    match loaded {
        Ok(store) => {
            debug!(roots = store.len(), "trust store loaded");
            Box::new(store)
        }
        Err(e) => {
            warn!(error = %e, "trust store unavailable");
            Box::new(UnavailableStore(e))
        }
    }
}
