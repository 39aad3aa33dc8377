//! Leaf Certificate Generation Module
//!
//! Issues end-entity certificates signed by the run's root CA: the daemon
//! (server) certificate bound to the requested hosts, and the client
//! certificate used for mutual TLS.
//!
//! # X.509 Extensions
//! - **Key Usage**: `digitalSignature`, `keyEncipherment` (critical); never `keyCertSign`
//! - **Extended Key Usage**: `clientAuth` for client certificates, plus `serverAuth`
//!   whenever at least one SAN is present
//! - **Subject Alternative Name**: one entry per host, see [`crate::host_identifier`]
//! - **Authority Key Identifier**: the root's key identifier
//!
//! Leaves carry no common name; TLS clients match on SANs.

use crate::certificate::{build_subject_name, IssuedCertificate, X509_VERSION_3};
use crate::error::{MktlsError, Result};
use crate::generate_keypair::generate_serial_number;
use crate::generate_root_ca::CertificateAuthority;
use crate::host_identifier::{san_ip_address, SubjectAltNames};
use crate::validity::ValidityWindow;
use openssl::hash::MessageDigest;
use openssl::pkey::{PKey, Private};
use openssl::x509::extension::{
    AuthorityKeyIdentifier, ExtendedKeyUsage, KeyUsage, SubjectAlternativeName,
};
use openssl::x509::X509;
use tracing::debug;

pub const DEFAULT_LEAF_ORGANIZATION: &str = "mktls certificate";

/// Builder for certificates signed by a [`CertificateAuthority`].
pub struct LeafCertificateBuilder<'a> {
    authority: &'a CertificateAuthority,
    identity_label: String,
    organization: String,
    expiry_years: u32,
    is_client: bool,
    hosts: Vec<String>,
}

impl<'a> LeafCertificateBuilder<'a> {
    /// Create a builder that signs under `authority`.
    pub fn new(authority: &'a CertificateAuthority, identity_label: impl Into<String>) -> Self {
        Self {
            authority,
            identity_label: identity_label.into(),
            organization: DEFAULT_LEAF_ORGANIZATION.to_string(),
            expiry_years: 10,
            is_client: false,
            hosts: Vec::new(),
        }
    }

    /// Set the organization (O) for the certificate
    pub fn organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = organization.into();
        self
    }

    /// Set validity period in calendar years
    pub fn expiry_years(mut self, years: u32) -> Self {
        self.expiry_years = years;
        self
    }

    /// Mark the certificate for TLS client authentication.
    pub fn client(mut self, is_client: bool) -> Self {
        self.is_client = is_client;
        self
    }

    /// Hosts to bind as Subject Alternative Names, in order.
    pub fn hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hosts = hosts.into_iter().map(Into::into).collect();
        self
    }

    /// Build and sign the certificate for `private_key`.
    ///
    /// Hosts are never rejected: anything that is not an IP or absolute URI is
    /// embedded as a DNS name.
    pub fn build(self, private_key: PKey<Private>) -> Result<IssuedCertificate> {
        let ca_cert = self.authority.certificate();
        let ca_key = self.authority.issued().private_key();
        let sans = SubjectAltNames::from_hosts(&self.hosts);
        let name = build_subject_name(&self.organization, &self.identity_label, None)?;
        let validity = ValidityWindow::years_from_now(self.expiry_years)?;

        let mut builder =
            X509::builder().map_err(MktlsError::encoding("failed to create X509 builder"))?;

        builder
            .set_version(X509_VERSION_3)
            .map_err(MktlsError::encoding("failed to set version"))?;

        let serial = generate_serial_number()?;
        let serial_number = serial.to_asn1_integer()?;
        builder
            .set_serial_number(&serial_number)
            .map_err(MktlsError::encoding("failed to set serial number"))?;

        builder
            .set_subject_name(&name)
            .map_err(MktlsError::encoding("failed to set subject"))?;

        // Issuer is the root CA's subject
        builder
            .set_issuer_name(ca_cert.subject_name())
            .map_err(MktlsError::encoding("failed to set issuer from root CA"))?;

        let not_before = validity.not_before_asn1()?;
        let not_after = validity.not_after_asn1()?;
        builder
            .set_not_before(&not_before)
            .map_err(MktlsError::encoding("failed to set not_before"))?;
        builder
            .set_not_after(&not_after)
            .map_err(MktlsError::encoding("failed to set not_after"))?;

        builder
            .set_pubkey(&private_key)
            .map_err(MktlsError::encoding("failed to set public key"))?;

        let ku = KeyUsage::new()
            .critical()
            .digital_signature()
            .key_encipherment()
            .build()
            .map_err(MktlsError::encoding("failed to build KeyUsage"))?;
        builder
            .append_extension(ku)
            .map_err(MktlsError::encoding("failed to add KeyUsage"))?;

        let grants_server_auth = !sans.is_empty();
        if self.is_client || grants_server_auth {
            let mut eku = ExtendedKeyUsage::new();
            if self.is_client {
                eku.client_auth();
            }
            if grants_server_auth {
                eku.server_auth();
            }
            let eku = eku
                .build()
                .map_err(MktlsError::encoding("failed to build ExtendedKeyUsage"))?;
            builder
                .append_extension(eku)
                .map_err(MktlsError::encoding("failed to add ExtendedKeyUsage"))?;
        }

        let aki = AuthorityKeyIdentifier::new()
            .keyid(false)
            .build(&builder.x509v3_context(Some(ca_cert), None))
            .map_err(MktlsError::encoding("failed to build AuthorityKeyIdentifier"))?;
        builder
            .append_extension(aki)
            .map_err(MktlsError::encoding("failed to add AuthorityKeyIdentifier"))?;

        if !sans.is_empty() {
            let mut san = SubjectAlternativeName::new();
            for dns in &sans.dns_names {
                san.dns(dns);
            }
            for ip in &sans.ip_addresses {
                san.ip(&san_ip_address(*ip).to_string());
            }
            for uri in &sans.uris {
                san.uri(uri);
            }
            let san = san
                .build(&builder.x509v3_context(Some(ca_cert), None))
                .map_err(MktlsError::encoding("failed to build SubjectAlternativeName"))?;
            builder
                .append_extension(san)
                .map_err(MktlsError::encoding("failed to add SubjectAlternativeName"))?;
        }

        // Sign with the root CA's private key
        builder
            .sign(ca_key, MessageDigest::sha256())
            .map_err(MktlsError::signing("failed to sign certificate"))?;

        let certificate = builder.build();
        debug!(
            serial = %serial.to_hex(),
            is_client = self.is_client,
            subject_alt_names = sans.len(),
            server_auth = grants_server_auth,
            "issued leaf certificate"
        );

        IssuedCertificate::new(private_key, certificate)
    }
}

/// Issue a leaf certificate under `authority` with default organization.
///
/// `ServerAuth` is granted whenever `hosts` yields at least one SAN, also for
/// client certificates.
pub fn issue_leaf<S: AsRef<str>>(
    authority: &CertificateAuthority,
    private_key: PKey<Private>,
    expiry_years: u32,
    is_client: bool,
    hosts: &[S],
    identity_label: &str,
) -> Result<IssuedCertificate> {
    LeafCertificateBuilder::new(authority, identity_label)
        .expiry_years(expiry_years)
        .client(is_client)
        .hosts(hosts.iter().map(|host| host.as_ref().to_string()))
        .build(private_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certificate::name_entry_text;
    use crate::generate_keypair::{generate_key_pair, KeyStrength};
    use crate::generate_root_ca::issue_root;
    use openssl::nid::Nid;
    use x509_parser::extensions::GeneralName;
    use x509_parser::parse_x509_certificate;

    const LABEL: &str = "alice@workstation";

    fn authority() -> CertificateAuthority {
        let key = generate_key_pair(KeyStrength::Root).unwrap();
        issue_root(key, 10, LABEL).unwrap()
    }

    fn leaf(ca: &CertificateAuthority, is_client: bool, hosts: &[&str]) -> IssuedCertificate {
        let key = generate_key_pair(KeyStrength::Leaf).unwrap();
        issue_leaf(ca, key, 10, is_client, hosts, LABEL).unwrap()
    }

    #[test]
    fn test_daemon_gets_server_auth_only() {
        let ca = authority();
        let daemon = leaf(&ca, false, &["myservice.default.svc", "127.0.0.1"]);
        let (_, cert) = parse_x509_certificate(daemon.der()).unwrap();

        let eku = cert.extended_key_usage().unwrap().unwrap();
        assert!(eku.value.server_auth);
        assert!(!eku.value.client_auth);
    }

    #[test]
    fn test_client_gets_client_auth_only() {
        let ca = authority();
        let client = leaf(&ca, true, &[]);
        let (_, cert) = parse_x509_certificate(client.der()).unwrap();

        let eku = cert.extended_key_usage().unwrap().unwrap();
        assert!(eku.value.client_auth);
        assert!(!eku.value.server_auth);
        assert!(cert.subject_alternative_name().unwrap().is_none());
    }

    #[test]
    fn test_client_with_hosts_also_gets_server_auth() {
        // ServerAuth follows the SANs, not the role.
        let ca = authority();
        let client = leaf(&ca, true, &["client.local"]);
        let (_, cert) = parse_x509_certificate(client.der()).unwrap();

        let eku = cert.extended_key_usage().unwrap().unwrap();
        assert!(eku.value.client_auth);
        assert!(eku.value.server_auth);
    }

    #[test]
    fn test_no_hosts_and_not_client_has_no_eku() {
        let ca = authority();
        let bare = leaf(&ca, false, &[]);
        let (_, cert) = parse_x509_certificate(bare.der()).unwrap();
        assert!(cert.extended_key_usage().unwrap().is_none());
    }

    #[test]
    fn test_leaf_key_usage() {
        let ca = authority();
        let daemon = leaf(&ca, false, &["localhost"]);
        let (_, cert) = parse_x509_certificate(daemon.der()).unwrap();

        let ku = cert.key_usage().unwrap().unwrap();
        assert!(ku.critical);
        assert!(ku.value.digital_signature());
        assert!(ku.value.key_encipherment());
        assert!(!ku.value.key_cert_sign());
        assert_eq!(ku.value.flags, 0b101);
        assert!(cert.basic_constraints().unwrap().is_none());
    }

    #[test]
    fn test_subject_alt_names_by_kind() {
        let ca = authority();
        let daemon = leaf(
            &ca,
            false,
            &[
                "svc.default.svc",
                "10.0.0.5",
                "https://example.com",
                "::1",
                "*.example.com",
            ],
        );
        let (_, cert) = parse_x509_certificate(daemon.der()).unwrap();
        let san = cert.subject_alternative_name().unwrap().unwrap();

        let dns: Vec<&str> = san
            .value
            .general_names
            .iter()
            .filter_map(|name| match name {
                GeneralName::DNSName(dns) => Some(*dns),
                _ => None,
            })
            .collect();
        let ips: Vec<&[u8]> = san
            .value
            .general_names
            .iter()
            .filter_map(|name| match name {
                GeneralName::IPAddress(ip) => Some(*ip),
                _ => None,
            })
            .collect();
        let uris: Vec<&str> = san
            .value
            .general_names
            .iter()
            .filter_map(|name| match name {
                GeneralName::URI(uri) => Some(*uri),
                _ => None,
            })
            .collect();

        assert_eq!(dns, vec!["svc.default.svc", "*.example.com"]);
        assert_eq!(ips.len(), 2);
        assert_eq!(ips[0], &[10, 0, 0, 5][..]);
        assert_eq!(ips[1].len(), 16);
        assert_eq!(ips[1][15], 1);
        assert_eq!(uris, vec!["https://example.com"]);
    }

    #[test]
    fn test_ipv4_mapped_address_is_four_bytes() {
        let ca = authority();
        let daemon = leaf(&ca, false, &["::ffff:10.0.0.5"]);
        let (_, cert) = parse_x509_certificate(daemon.der()).unwrap();
        let san = cert.subject_alternative_name().unwrap().unwrap();

        assert_eq!(
            san.value.general_names,
            vec![GeneralName::IPAddress(&[10, 0, 0, 5][..])]
        );
    }

    #[test]
    fn test_uri_without_authority_becomes_dns_name() {
        let ca = authority();
        let daemon = leaf(&ca, false, &["http:example.com"]);
        let (_, cert) = parse_x509_certificate(daemon.der()).unwrap();
        let san = cert.subject_alternative_name().unwrap().unwrap();

        assert_eq!(
            san.value.general_names,
            vec![GeneralName::DNSName("http:example.com")]
        );
    }

    #[test]
    fn test_leaf_chains_to_root() {
        let ca = authority();
        let daemon = leaf(&ca, false, &["localhost"]);
        let ca_public_key = ca.certificate().public_key().unwrap();

        assert!(daemon.certificate().verify(&ca_public_key).unwrap());
        assert_eq!(
            daemon.certificate().issuer_name().to_der().unwrap(),
            ca.certificate().subject_name().to_der().unwrap()
        );
    }

    #[test]
    fn test_leaf_does_not_verify_against_other_root() {
        let ca = authority();
        let other = authority();
        let daemon = leaf(&ca, false, &["localhost"]);
        let other_key = other.certificate().public_key().unwrap();

        assert!(!daemon.certificate().verify(&other_key).unwrap());
    }

    #[test]
    fn test_leaf_subject_has_no_common_name() {
        let ca = authority();
        let daemon = leaf(&ca, false, &["localhost"]);
        let subject = daemon.certificate().subject_name();

        assert!(subject.entries_by_nid(Nid::COMMONNAME).next().is_none());
        assert_eq!(
            name_entry_text(subject, Nid::ORGANIZATIONNAME).as_deref(),
            Some("mktls certificate")
        );
    }

    #[test]
    fn test_authority_key_identifier_matches_root() {
        let ca = authority();
        let daemon = leaf(&ca, false, &["localhost"]);
        let (_, root) = parse_x509_certificate(ca.issued().der()).unwrap();
        let (_, cert) = parse_x509_certificate(daemon.der()).unwrap();

        let skid = root
            .extensions()
            .iter()
            .find_map(|ext| match ext.parsed_extension() {
                x509_parser::extensions::ParsedExtension::SubjectKeyIdentifier(id) => Some(id.0),
                _ => None,
            })
            .unwrap();
        let akid = cert
            .extensions()
            .iter()
            .find_map(|ext| match ext.parsed_extension() {
                x509_parser::extensions::ParsedExtension::AuthorityKeyIdentifier(aki) => {
                    aki.key_identifier.as_ref().map(|id| id.0)
                }
                _ => None,
            })
            .unwrap();
        assert_eq!(skid, akid);
    }

    #[test]
    fn test_leaf_key_size() {
        let ca = authority();
        let client = leaf(&ca, true, &[]);
        assert_eq!(client.private_key().bits(), 2048);
    }
}
