//! Issued certificates and the X.509 pieces shared by root and leaf issuance.

use crate::error::{MktlsError, Result};
use openssl::asn1::{Asn1Object, Asn1OctetString};
use openssl::nid::Nid;
use openssl::pkey::{PKey, PKeyRef, Private};
use openssl::sha::sha1;
use openssl::x509::{X509Extension, X509Name, X509};

pub(crate) const X509_VERSION_3: i32 = 2; // X509 version 3 is represented by 2
const SUBJECT_KEY_IDENTIFIER_OID: &str = "2.5.29.14";
const DER_TAG_OCTET_STRING: u8 = 0x04;

/// A freshly issued certificate together with the private key it certifies.
pub struct IssuedCertificate {
    private_key: PKey<Private>,
    certificate: X509,
    der: Vec<u8>,
}

impl IssuedCertificate {
    pub(crate) fn new(private_key: PKey<Private>, certificate: X509) -> Result<Self> {
        let der = certificate
            .to_der()
            .map_err(MktlsError::encoding("failed to encode certificate"))?;
        Ok(Self {
            private_key,
            certificate,
            der,
        })
    }

    pub fn private_key(&self) -> &PKeyRef<Private> {
        &self.private_key
    }

    pub fn certificate(&self) -> &X509 {
        &self.certificate
    }

    /// The signed certificate in DER form.
    pub fn der(&self) -> &[u8] {
        &self.der
    }
}

impl std::fmt::Debug for IssuedCertificate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedCertificate")
            .field("private_key", &"<redacted>")
            .field("certificate", &self.certificate)
            .finish()
    }
}

/// Build a subject name in `O`, `OU`, `CN` order.
pub(crate) fn build_subject_name(
    organization: &str,
    organizational_unit: &str,
    common_name: Option<&str>,
) -> Result<X509Name> {
    let mut name_builder =
        X509Name::builder().map_err(MktlsError::encoding("failed to create name builder"))?;

    name_builder
        .append_entry_by_nid(Nid::ORGANIZATIONNAME, organization)
        .map_err(MktlsError::encoding("failed to set organization"))?;

    name_builder
        .append_entry_by_nid(Nid::ORGANIZATIONALUNITNAME, organizational_unit)
        .map_err(MktlsError::encoding("failed to set organizational unit"))?;

    if let Some(cn) = common_name {
        name_builder
            .append_entry_by_nid(Nid::COMMONNAME, cn)
            .map_err(MktlsError::encoding("failed to set CN"))?;
    }

    Ok(name_builder.build())
}

/// SHA-1 over the `subjectPublicKey` BIT STRING contents of the key's SPKI.
///
/// For RSA the BIT STRING carries the PKCS#1 `RSAPublicKey`, so the digest is
/// taken over that encoding rather than the whole SubjectPublicKeyInfo.
pub fn subject_key_identifier(key: &PKeyRef<Private>) -> Result<[u8; 20]> {
    let rsa = key
        .rsa()
        .map_err(MktlsError::encoding("failed to read RSA public key"))?;
    let public_key = rsa
        .public_key_to_der_pkcs1()
        .map_err(MktlsError::encoding("failed to encode public key"))?;
    Ok(sha1(&public_key))
}

/// Non-critical subjectKeyIdentifier extension carrying `key_id`.
pub(crate) fn subject_key_identifier_extension(key_id: &[u8; 20]) -> Result<X509Extension> {
    let oid = Asn1Object::from_str(SUBJECT_KEY_IDENTIFIER_OID)
        .map_err(MktlsError::encoding("failed to create SKID object"))?;

    let mut value = Vec::with_capacity(key_id.len() + 2);
    value.push(DER_TAG_OCTET_STRING);
    value.push(key_id.len() as u8);
    value.extend_from_slice(key_id);

    let contents = Asn1OctetString::new_from_bytes(&value)
        .map_err(MktlsError::encoding("failed to encode SKID"))?;

    X509Extension::new_from_der(&oid, false, &contents)
        .map_err(MktlsError::encoding("failed to build SubjectKeyIdentifier"))
}

/// Text of the first `nid` entry in `name`.
#[cfg(test)]
pub(crate) fn name_entry_text(name: &openssl::x509::X509NameRef, nid: Nid) -> Option<String> {
    name.entries_by_nid(nid)
        .next()
        .map(|entry| String::from_utf8_lossy(entry.data().as_slice()).into_owned())
}
