//! TLS certificate report assembly.

use chrono::{DateTime, Utc};

use crate::chain::CertificateChain;
use crate::fingerprint::{format_fingerprint, sha1_fingerprint, sha256_fingerprint};
use crate::san::san_rows;
use crate::trust::{evaluate, trust_rows, TrustStore, VerificationOptions};
use crate::types::{PublicKeyAlgorithm, Report, ReportRow};

/// Timestamp layout for validity rows, e.g. `02 Jan 2006 15:04:05 UTC`.
pub const TIMESTAMP_FORMAT: &str = "%d %b %Y %H:%M:%S UTC";

const PASS: &str = "✔️";
const FAIL: &str = "❌";

const fn status(ok: bool) -> &'static str {
    if ok {
        PASS
    } else {
        FAIL
    }
}

fn timestamp(t: DateTime<Utc>) -> String {
    t.format(TIMESTAMP_FORMAT).to_string()
}

/// Build the report for the leaf of `chain`.
///
/// `opts.current_time` is used both for the validity glyphs and for trust
/// verification.
pub fn build_tls_report(
    chain: &CertificateChain,
    store: &dyn TrustStore,
    opts: &VerificationOptions<'_>,
) -> Report {
    let leaf = &chain.leaf;
    let now = opts.current_time;

    let mut rows = vec![
        ReportRow::new("Subject", &leaf.subject),
        ReportRow::new("Issuer", &leaf.issuer),
        ReportRow::new(
            "Not Before",
            format!("{} {}", timestamp(leaf.not_before), status(leaf.not_before <= now)),
        ),
        ReportRow::new(
            "Not After",
            format!("{} {}", timestamp(leaf.not_after), status(now < leaf.not_after)),
        ),
        ReportRow::new("Algorithm", leaf.key_algorithm.to_string()),
    ];

    if matches!(
        leaf.key_algorithm,
        PublicKeyAlgorithm::Rsa | PublicKeyAlgorithm::Ecdsa
    ) {
        if let Some(bits) = leaf.key_size {
            rows.push(ReportRow::new("Key Size", format!("{bits}-bit")));
        }
    }

    if let Some(ski) = leaf.subject_key_id.as_deref().filter(|s| !s.is_empty()) {
        rows.push(ReportRow::new("Subject Key ID", format_fingerprint(ski)));
    }

    rows.extend(trust_rows(&evaluate(store, leaf, opts)));

    rows.push(ReportRow::blank());
    rows.push(ReportRow::header("Fingerprints"));
    rows.push(ReportRow::new("SHA-1", sha1_fingerprint(leaf.der())).indented());
    rows.push(ReportRow::new("SHA-256", sha256_fingerprint(leaf.der())).indented());

    let san = san_rows(&leaf.san);
    if !san.is_empty() {
        rows.push(ReportRow::blank());
        rows.push(ReportRow::header("SAN"));
        rows.extend(san.into_iter().map(ReportRow::indented));
    }

    Report {
        title: leaf.common_name.clone().unwrap_or_default(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::parse_pem_chain;
    use crate::testutil::{bundle, CertBuilder};
    use crate::trust::{RootStore, TRUST_LABEL};
    use chrono::TimeZone;

    fn labels(report: &Report) -> Vec<&str> {
        report.rows.iter().map(|r| r.label.as_str()).collect()
    }

    #[test]
    fn row_order_for_trusted_leaf() {
        let root = CertBuilder::new("Root").organization("Acme").ca().self_signed();
        let leaf = CertBuilder::new("api.example.com")
            .dns("api.example.com")
            .ip("10.0.0.5")
            .signed_by(&root);
        let chain = parse_pem_chain(&bundle(&[&leaf])).unwrap().unwrap();
        let store = RootStore::from_pem(root.pem().as_bytes()).unwrap();
        let opts = VerificationOptions {
            dns_name: Some("api.example.com".into()),
            intermediates: &chain.intermediates,
            current_time: Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap(),
        };

        let report = build_tls_report(&chain, &store, &opts);
        let mut expected = vec!["Subject", "Issuer", "Not Before", "Not After", "Algorithm", "Key Size"];
        if chain.leaf.subject_key_id.is_some() {
            expected.push("Subject Key ID");
        }
        expected.extend([TRUST_LABEL, "", "Fingerprints", "SHA-1", "SHA-256", "", "SAN", "DNS", "IP"]);

        assert_eq!(labels(&report), expected);
        assert_eq!(report.title, "api.example.com");
        assert_eq!(report.row("Algorithm").unwrap().value, "ECDSA");
        assert_eq!(report.row("Key Size").unwrap().value, "256-bit");
        assert_eq!(report.row(TRUST_LABEL).unwrap().value, "🔒 Acme/Root");
        assert_eq!(
            report.row("Not Before").unwrap().value,
            "01 Jan 2020 00:00:00 UTC ✔️"
        );
        assert_eq!(report.row("SHA-256").unwrap().indent, 1);
        assert_eq!(
            report.row("SHA-256").unwrap().value,
            sha256_fingerprint(leaf.der())
        );
        assert_eq!(report.row("IP").unwrap().value, "10.0.0.5");
    }

    #[test]
    fn expired_self_signed_leaf_still_reports() {
        let leaf = CertBuilder::new("old.example.com")
            .validity((2015, 1, 1), (2016, 1, 1))
            .self_signed();
        let chain = parse_pem_chain(leaf.pem().as_bytes()).unwrap().unwrap();
        let store = RootStore::from_pem(leaf.pem().as_bytes()).unwrap();
        let opts = VerificationOptions {
            dns_name: None,
            intermediates: &chain.intermediates,
            current_time: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        };

        let report = build_tls_report(&chain, &store, &opts);

        let not_after = &report.row("Not After").unwrap().value;
        assert!(not_after.ends_with(FAIL), "{not_after}");
        assert!(report.row("Not Before").unwrap().value.ends_with(PASS));
        let trust = &report.row(TRUST_LABEL).unwrap().value;
        assert!(trust.starts_with('❗'));
        assert!(trust.contains("expired"));
        assert!(report.row("SAN").is_none());
        assert!(report.row("Fingerprints").is_some());
    }
}
