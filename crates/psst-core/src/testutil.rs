//! Certificate and payload fixtures generated at test time.

use base64::Engine;
use flate2::{write::GzEncoder, Compression};
use rcgen::{
    date_time_ymd, BasicConstraints, CertificateParams, DistinguishedName, DnType, Ia5String,
    IsCa, KeyPair, SanType,
};
use std::io::Write;

pub struct CertBuilder {
    params: CertificateParams,
    key: Option<KeyPair>,
}

impl CertBuilder {
    pub fn new(common_name: &str) -> Self {
        let mut params = CertificateParams::default();
        let mut dn = DistinguishedName::new();
        dn.push(DnType::CommonName, common_name);
        params.distinguished_name = dn;
        params.not_before = date_time_ymd(2020, 1, 1);
        params.not_after = date_time_ymd(2040, 1, 1);
        Self { params, key: None }
    }

    /// Use the same key pair as an existing certificate (cross-signing).
    pub fn reuse_key(mut self, other: &Generated) -> Self {
        self.key = Some(KeyPair::from_pem(&other.key.serialize_pem()).unwrap());
        self
    }

    fn take_key(&mut self) -> KeyPair {
        self.key
            .take()
            .unwrap_or_else(|| KeyPair::generate().unwrap())
    }

    pub fn organization(mut self, org: &str) -> Self {
        self.params
            .distinguished_name
            .push(DnType::OrganizationName, org);
        self
    }

    pub fn ca(mut self) -> Self {
        self.params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        self
    }

    pub fn validity(mut self, from: (i32, u8, u8), to: (i32, u8, u8)) -> Self {
        self.params.not_before = date_time_ymd(from.0, from.1, from.2);
        self.params.not_after = date_time_ymd(to.0, to.1, to.2);
        self
    }

    /// CA allowed at most `len` intermediates below it.
    pub fn path_len(mut self, len: u8) -> Self {
        self.params.is_ca = IsCa::Ca(BasicConstraints::Constrained(len));
        self
    }

    pub fn dns(mut self, name: &str) -> Self {
        let name = Ia5String::try_from(name.to_string()).unwrap();
        self.params.subject_alt_names.push(SanType::DnsName(name));
        self
    }

    pub fn ip(mut self, ip: &str) -> Self {
        self.params
            .subject_alt_names
            .push(SanType::IpAddress(ip.parse().unwrap()));
        self
    }

    pub fn email(mut self, email: &str) -> Self {
        let email = Ia5String::try_from(email.to_string()).unwrap();
        self.params.subject_alt_names.push(SanType::Rfc822Name(email));
        self
    }

    pub fn uri(mut self, uri: &str) -> Self {
        let uri = Ia5String::try_from(uri.to_string()).unwrap();
        self.params.subject_alt_names.push(SanType::URI(uri));
        self
    }

    pub fn self_signed(mut self) -> Generated {
        let key = self.take_key();
        let cert = self.params.self_signed(&key).unwrap();
        Generated { cert, key }
    }

    pub fn signed_by(mut self, issuer: &Generated) -> Generated {
        let key = self.take_key();
        let cert = self
            .params
            .signed_by(&key, &issuer.cert, &issuer.key)
            .unwrap();
        Generated { cert, key }
    }
}

pub struct Generated {
    cert: rcgen::Certificate,
    key: KeyPair,
}

impl Generated {
    pub fn der(&self) -> &[u8] {
        self.cert.der()
    }

    pub fn pem(&self) -> String {
        self.cert.pem()
    }
}

/// Concatenate PEM blocks the way a `tls.crt` bundle stores them.
pub fn bundle(certs: &[&Generated]) -> Vec<u8> {
    certs.iter().map(|c| c.pem()).collect::<String>().into_bytes()
}

/// base64(gzip(json)), the encoding of a Helm release record.
pub fn helm_payload(json: &str) -> Vec<u8> {
    let mut gz = GzEncoder::new(Vec::new(), Compression::default());
    gz.write_all(json.as_bytes()).unwrap();
    let compressed = gz.finish().unwrap();
    base64::engine::general_purpose::STANDARD
        .encode(compressed)
        .into_bytes()
}
