//! Root CA Certificate Generation Module
//!
//! Issues the self-signed trust anchor for one generation run. The root only
//! ever signs the daemon and client certificates of the same run.
//!
//! # Certificate Properties
//! - **Self-signed**: Issuer and subject are the same
//! - **Subject**: `O=mktls CA`, `OU=<user@host>`, `CN=mktls <user@host>`
//! - **Key Usage**: keyCertSign only (critical)
//! - **Basic Constraints**: CA=true, pathlen=0 (critical), so it cannot delegate
//! - **Subject Key Identifier**: SHA-1 of the public key BIT STRING
//! - **Key Size**: RSA 3072-bit
//!
//! # Example
//! ```rust,no_run
//! use mktls::generate_keypair::{generate_key_pair, KeyStrength};
//! use mktls::generate_root_ca::RootCaBuilder;
//!
//! let key = generate_key_pair(KeyStrength::Root)?;
//! let ca = RootCaBuilder::new("alice@workstation")
//!     .expiry_years(10)
//!     .build(key)?;
//! assert!(!ca.issued().der().is_empty());
//! # Ok::<(), mktls::MktlsError>(())
//! ```

use crate::certificate::{
    build_subject_name, subject_key_identifier, subject_key_identifier_extension,
    IssuedCertificate, X509_VERSION_3,
};
use crate::error::{MktlsError, Result};
use crate::generate_keypair::generate_serial_number;
use crate::validity::ValidityWindow;
use openssl::hash::MessageDigest;
use openssl::pkey::{PKey, Private};
use openssl::x509::extension::{BasicConstraints, KeyUsage};
use openssl::x509::X509;
use tracing::debug;

pub const DEFAULT_CA_ORGANIZATION: &str = "mktls CA";
const COMMON_NAME_PREFIX: &str = "mktls";
const ROOT_CA_PATH_LENGTH: u32 = 0;

/// A root certificate authority: the only thing leaf issuance accepts as issuer.
///
/// Values of this type are produced exclusively by [`RootCaBuilder`], so every
/// issuer handed to leaf issuance carries CA=true and keyCertSign.
#[derive(Debug)]
pub struct CertificateAuthority {
    issued: IssuedCertificate,
}

impl CertificateAuthority {
    pub fn issued(&self) -> &IssuedCertificate {
        &self.issued
    }

    pub fn certificate(&self) -> &X509 {
        self.issued.certificate()
    }
}

/// Builder for the self-signed root CA certificate.
pub struct RootCaBuilder {
    identity_label: String,
    organization: String,
    expiry_years: u32,
}

impl RootCaBuilder {
    /// Create a builder for the given `user@host` identity label.
    pub fn new(identity_label: impl Into<String>) -> Self {
        Self {
            identity_label: identity_label.into(),
            organization: DEFAULT_CA_ORGANIZATION.to_string(),
            expiry_years: 10,
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

    /// Self-sign a root certificate for `private_key`.
    ///
    /// # Errors
    /// Returns an error if:
    /// - the serial number cannot be drawn
    /// - any name, time or extension fails to encode
    /// - signing fails
    pub fn build(self, private_key: PKey<Private>) -> Result<CertificateAuthority> {
        let key_id = subject_key_identifier(&private_key)?;
        let common_name = format!("{} {}", COMMON_NAME_PREFIX, self.identity_label);
        let name = build_subject_name(
            &self.organization,
            &self.identity_label,
            Some(&common_name),
        )?;
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
        builder
            .set_issuer_name(&name)
            .map_err(MktlsError::encoding("failed to set issuer"))?;

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
            .key_cert_sign()
            .build()
            .map_err(MktlsError::encoding("failed to build KeyUsage"))?;
        builder
            .append_extension(ku)
            .map_err(MktlsError::encoding("failed to add KeyUsage"))?;

        let bc = BasicConstraints::new()
            .critical()
            .ca()
            .pathlen(ROOT_CA_PATH_LENGTH)
            .build()
            .map_err(MktlsError::encoding("failed to build BasicConstraints"))?;
        builder
            .append_extension(bc)
            .map_err(MktlsError::encoding("failed to add BasicConstraints"))?;

        builder
            .append_extension(subject_key_identifier_extension(&key_id)?)
            .map_err(MktlsError::encoding("failed to add SubjectKeyIdentifier"))?;

        builder
            .sign(&private_key, MessageDigest::sha256())
            .map_err(MktlsError::signing("failed to self-sign CA certificate"))?;

        let certificate = builder.build();
        debug!(
            serial = %serial.to_hex(),
            subject = %common_name,
            not_after = %validity.not_after(),
            "issued root CA certificate"
        );

        Ok(CertificateAuthority {
            issued: IssuedCertificate::new(private_key, certificate)?,
        })
    }
}

/// Issue the self-signed root with default organization.
pub fn issue_root(
    private_key: PKey<Private>,
    expiry_years: u32,
    identity_label: &str,
) -> Result<CertificateAuthority> {
    RootCaBuilder::new(identity_label)
        .expiry_years(expiry_years)
        .build(private_key)
}
