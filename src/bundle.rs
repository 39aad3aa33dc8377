//! Bundle Module
//!
//! The terminal output of a run: the CA certificate plus the daemon and client
//! key/certificate pairs as PEM text, ready to be printed as one JSON object.

use crate::certificate::IssuedCertificate;
use crate::error::{MktlsError, Result};
use crate::generate_root_ca::CertificateAuthority;
use openssl::pkey::{PKeyRef, Private};
use openssl::x509::X509Ref;
use serde::{Deserialize, Serialize};

/// PEM-armored CA certificate, daemon and client credentials.
///
/// Serializes as `{expiryYears, caCert, daemonKey, daemonCert, clientKey, clientCert}`.
/// Private keys are PKCS#8 (`PRIVATE KEY`), certificates are `CERTIFICATE` blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    expiry_years: u32,
    ca_cert: String,
    daemon_key: String,
    daemon_cert: String,
    client_key: String,
    client_cert: String,
}

impl Bundle {
    /// Encode the three issued certificates into a bundle.
    ///
    /// Either every member encodes or an error is returned; there is no
    /// partially filled bundle.
    pub fn encode(
        ca: &CertificateAuthority,
        daemon: &IssuedCertificate,
        client: &IssuedCertificate,
        expiry_years: u32,
    ) -> Result<Self> {
        Ok(Self {
            expiry_years,
            ca_cert: certificate_to_pem(ca.certificate())?,
            daemon_key: private_key_to_pem(daemon.private_key())?,
            daemon_cert: certificate_to_pem(daemon.certificate())?,
            client_key: private_key_to_pem(client.private_key())?,
            client_cert: certificate_to_pem(client.certificate())?,
        })
    }

    /// Render the bundle as a single-line JSON object.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn expiry_years(&self) -> u32 {
        self.expiry_years
    }

    pub fn ca_cert(&self) -> &str {
        &self.ca_cert
    }

    pub fn daemon_key(&self) -> &str {
        &self.daemon_key
    }

    pub fn daemon_cert(&self) -> &str {
        &self.daemon_cert
    }

    pub fn client_key(&self) -> &str {
        &self.client_key
    }

    pub fn client_cert(&self) -> &str {
        &self.client_cert
    }
}

fn certificate_to_pem(certificate: &X509Ref) -> Result<String> {
    let pem = certificate
        .to_pem()
        .map_err(MktlsError::encoding("failed to encode certificate as PEM"))?;
    Ok(String::from_utf8_lossy(&pem).into_owned())
}

fn private_key_to_pem(private_key: &PKeyRef<Private>) -> Result<String> {
    let pem = private_key
        .private_key_to_pem_pkcs8()
        .map_err(MktlsError::encoding("failed to encode private key as PKCS#8"))?;
    Ok(String::from_utf8_lossy(&pem).into_owned())
}
