//! One generation run: CA, daemon certificate, client certificate, bundle.
//!
//! Each stage takes the previous stage's output by value or reference and
//! returns a new value, so nothing is filled in after construction. The first
//! failure aborts the run and no partial bundle is produced.

use crate::bundle::Bundle;
use crate::configs::{effective_expiry_years, CertificateDefaults};
use crate::error::Result;
use crate::generate_keypair::{generate_key_pair, KeyStrength};
use crate::generate_leaf_cert::LeafCertificateBuilder;
use crate::generate_root_ca::RootCaBuilder;
use tracing::info;

/// Inputs for one run.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    hosts: Vec<String>,
    identity_label: String,
    expiry_years: u32,
    defaults: CertificateDefaults,
}

impl GenerationRequest {
    /// `hosts` must already be normalized; `identity_label` is the `user@host` string.
    pub fn new<I, S>(hosts: I, identity_label: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let defaults = CertificateDefaults::default();
        Self {
            hosts: hosts.into_iter().map(Into::into).collect(),
            identity_label: identity_label.into(),
            expiry_years: defaults.expiry_years,
            defaults,
        }
    }

    /// Requested expiry in years; zero selects the default of ten.
    pub fn expiry_years(mut self, years: u32) -> Self {
        self.expiry_years = years;
        self
    }

    /// Organization names to stamp into the CA and leaf subjects.
    pub fn defaults(mut self, defaults: CertificateDefaults) -> Self {
        self.defaults = defaults;
        self
    }
}

/// Generate the CA, the daemon and client certificates, and encode them.
///
/// # Example
/// ```rust,no_run
/// use mktls::tls_certs::{generate_bundle, GenerationRequest};
///
/// let request = GenerationRequest::new(["myservice.default.svc", "127.0.0.1"], "alice@box");
/// let bundle = generate_bundle(&request)?;
/// println!("{}", bundle.to_json()?);
/// # Ok::<(), mktls::MktlsError>(())
/// ```
pub fn generate_bundle(request: &GenerationRequest) -> Result<Bundle> {
    let expiry_years = effective_expiry_years(None, request.expiry_years);

    let ca = RootCaBuilder::new(request.identity_label.as_str())
        .organization(request.defaults.ca_organization.as_str())
        .expiry_years(expiry_years)
        .build(generate_key_pair(KeyStrength::Root)?)?;

    let daemon = LeafCertificateBuilder::new(&ca, request.identity_label.as_str())
        .organization(request.defaults.leaf_organization.as_str())
        .expiry_years(expiry_years)
        .client(false)
        .hosts(request.hosts.iter().cloned())
        .build(generate_key_pair(KeyStrength::Leaf)?)?;

    let client = LeafCertificateBuilder::new(&ca, request.identity_label.as_str())
        .organization(request.defaults.leaf_organization.as_str())
        .expiry_years(expiry_years)
        .client(true)
        .build(generate_key_pair(KeyStrength::Leaf)?)?;

    let bundle = Bundle::encode(&ca, &daemon, &client, expiry_years)?;
    info!(
        hosts = request.hosts.len(),
        expiry_years, "generated certificate bundle"
    );
    Ok(bundle)
}
