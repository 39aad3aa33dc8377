use crate::generate_leaf_cert::DEFAULT_LEAF_ORGANIZATION;
use crate::generate_root_ca::DEFAULT_CA_ORGANIZATION;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_EXPIRY_YEARS: u32 = 10;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub certificates: CertificateDefaults,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct CertificateDefaults {
    #[serde(default = "default_expiry_years")]
    pub expiry_years: u32,
    #[serde(default = "default_ca_organization")]
    pub ca_organization: String,
    #[serde(default = "default_leaf_organization")]
    pub leaf_organization: String,
}

impl Default for CertificateDefaults {
    fn default() -> Self {
        Self {
            expiry_years: default_expiry_years(),
            ca_organization: default_ca_organization(),
            leaf_organization: default_leaf_organization(),
        }
    }
}

fn default_expiry_years() -> u32 {
    DEFAULT_EXPIRY_YEARS
}

fn default_ca_organization() -> String {
    DEFAULT_CA_ORGANIZATION.to_string()
}

fn default_leaf_organization() -> String {
    DEFAULT_LEAF_ORGANIZATION.to_string()
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let config_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: AppConfig =
            toml::from_str(&config_str).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration from `path`, or fall back to the built-in defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}

/// Expiry actually used for a run: an explicit value wins over the config,
/// and zero means the default.
pub fn effective_expiry_years(requested: Option<u32>, configured: u32) -> u32 {
    match requested.unwrap_or(configured) {
        0 => DEFAULT_EXPIRY_YEARS,
        years => years,
    }
}
