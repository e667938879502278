//! Subject Alternative Name extraction.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use tracing::debug;
use x509_parser::prelude::*;

use crate::types::ReportRow;

/// SAN entries of one certificate, each list in extension order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectAltNames {
    pub dns: Vec<String>,
    pub ip: Vec<IpAddr>,
    pub email: Vec<String>,
    pub uri: Vec<String>,
}

impl SubjectAltNames {
    /// Collect the SAN extension of a parsed certificate.
    pub fn from_x509(cert: &X509Certificate<'_>) -> Self {
        let mut names = Self::default();
        let san = match cert.subject_alternative_name() {
            Ok(Some(san)) => san,
            Ok(None) => return names,
            Err(e) => {
                debug!(error = %e, "ignoring unparsable SAN extension");
                return names;
            }
        };

        for gn in &san.value.general_names {
            match gn {
                GeneralName::DNSName(name) => names.dns.push((*name).to_string()),
                GeneralName::IPAddress(bytes) => match ip_from_bytes(bytes) {
                    Some(ip) => names.ip.push(ip),
                    None => debug!(len = bytes.len(), "skipping SAN IP with bad length"),
                },
                GeneralName::RFC822Name(email) => names.email.push((*email).to_string()),
                GeneralName::URI(uri) => names.uri.push((*uri).to_string()),
                _ => {}
            }
        }
        names
    }

    /// True when no category has entries.
    pub fn is_empty(&self) -> bool {
        self.dns.is_empty() && self.ip.is_empty() && self.email.is_empty() && self.uri.is_empty()
    }
}

fn ip_from_bytes(bytes: &[u8]) -> Option<IpAddr> {
    if let Ok(v4) = <[u8; 4]>::try_from(bytes) {
        return Some(IpAddr::V4(Ipv4Addr::from(v4)));
    }
    <[u8; 16]>::try_from(bytes)
        .ok()
        .map(|v6| IpAddr::V6(Ipv6Addr::from(v6)))
}

/// SAN rows in the fixed order DNS, IP, E-mail, URI; empty categories skipped.
pub fn san_rows(names: &SubjectAltNames) -> Vec<ReportRow> {
    let mut rows = Vec::new();
    if !names.dns.is_empty() {
        rows.push(ReportRow::new("DNS", names.dns.join(", ")));
    }
    if !names.ip.is_empty() {
        let ips: Vec<String> = names.ip.iter().map(ToString::to_string).collect();
        rows.push(ReportRow::new("IP", ips.join(", ")));
    }
    if !names.email.is_empty() {
        rows.push(ReportRow::new("E-mail", names.email.join(", ")));
    }
    if !names.uri.is_empty() {
        rows.push(ReportRow::new("URI", names.uri.join(", ")));
    }
    rows
}
