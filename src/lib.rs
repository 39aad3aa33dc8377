//! mktls - Local Development Certificate Bundles
//!
//! Generates a throwaway certificate authority together with a daemon (server)
//! certificate and a client certificate signed by it, and hands all of them
//! back as one PEM bundle.
//!
//! ```text
//! Root CA (self-signed, RSA 3072, pathlen=0, keyCertSign)
//!   ├── Daemon certificate (RSA 2048, SANs from the host list, ServerAuth)
//!   └── Client certificate (RSA 2048, no SANs, ClientAuth)
//! ```
//!
//! # Quick Start
//!
//! ```bash
//! mktls myservice.default.svc 127.0.0.1 > bundle.json
//! mktls --expiry-years 2 localhost
//! ```
//!
//! # As a Library
//!
//! ```no_run
//! use mktls::tls_certs::{generate_bundle, GenerationRequest};
//!
//! let request = GenerationRequest::new(["myservice.default.svc", "127.0.0.1"], "alice@box")
//!     .expiry_years(0);
//! let bundle = generate_bundle(&request)?;
//! assert_eq!(bundle.expiry_years(), 10);
//! println!("{}", bundle.to_json()?);
//! # Ok::<(), mktls::MktlsError>(())
//! ```
//!
//! # Module Overview
//!
//! - [`generate_keypair`]: RSA key pairs and random serial numbers
//! - [`validity`]: calendar-year validity windows
//! - [`host_identifier`]: IP / URI / DNS classification of SAN entries
//! - [`generate_root_ca`]: the self-signed CA
//! - [`generate_leaf_cert`]: daemon and client certificates signed by the CA
//! - [`bundle`]: PEM encoding and the JSON bundle
//! - [`tls_certs`]: one full generation run
//! - [`hosts`], [`identity`], [`configs`]: command-line support
//!
//! # Error Handling
//!
//! Certificate operations return [`Result<T>`] with a [`MktlsError`] describing which
//! primitive failed. Every error is fatal for the run; no partial bundle is produced.

pub mod bundle;
pub mod certificate;
pub mod configs;
pub mod error;
pub mod generate_keypair;
pub mod generate_leaf_cert;
pub mod generate_root_ca;
pub mod host_identifier;
pub mod hosts;
pub mod identity;
pub mod tls_certs;
pub mod validity;

pub use bundle::Bundle;
pub use error::{MktlsError, Result};
