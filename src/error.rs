//! Error types for certificate generation.
//!
//! Every failure is fatal for the current run. The variants only say which
//! class of primitive broke so the caller can report it; none of them is
//! retried.

use openssl::error::ErrorStack;
use thiserror::Error;
use time::OffsetDateTime;

/// The error type for key, certificate and bundle generation.
#[derive(Error, Debug)]
pub enum MktlsError {
    /// The secure random source or the key-generation primitive failed.
    #[error("environment failure: {context}: {source}")]
    Environment {
        context: &'static str,
        #[source]
        source: ErrorStack,
    },

    /// ASN.1, PKCS#8 or PEM encoding of an otherwise valid object failed.
    #[error("encoding failure: {context}: {source}")]
    Encoding {
        context: &'static str,
        #[source]
        source: ErrorStack,
    },

    /// The validity window cannot be represented in a certificate.
    #[error("encoding failure: expiry of {years} years from {start} is out of range")]
    ValidityOutOfRange { years: u32, start: OffsetDateTime },

    /// The signing primitive or the issuer rejected the certificate template.
    #[error("signing failure: {context}: {source}")]
    Signing {
        context: &'static str,
        #[source]
        source: ErrorStack,
    },

    /// The finished bundle could not be rendered as JSON.
    #[error("encoding failure: failed to serialize bundle: {0}")]
    Json(#[from] serde_json::Error),
}

impl MktlsError {
    pub(crate) fn environment(context: &'static str) -> impl FnOnce(ErrorStack) -> Self {
        move |source| Self::Environment { context, source }
    }

    pub(crate) fn encoding(context: &'static str) -> impl FnOnce(ErrorStack) -> Self {
        move |source| Self::Encoding { context, source }
    }

    pub(crate) fn signing(context: &'static str) -> impl FnOnce(ErrorStack) -> Self {
        move |source| Self::Signing { context, source }
    }
}

/// A specialized Result type for certificate generation.
pub type Result<T> = std::result::Result<T, MktlsError>;
