//! Command-line host normalization.
//!
//! IP addresses and absolute URIs pass through untouched. Everything else is
//! converted to its ASCII (Punycode) form and checked against the hostname
//! pattern. Problems are logged and the name is still used, so a bad argument
//! never stops the run.

use crate::host_identifier::is_absolute_uri;
use anyhow::{Context, Result};
use regex::Regex;
use std::net::IpAddr;
use tracing::error;
use url::Host;

const HOSTNAME_PATTERN: &str = r"(?i)^(\*\.)?[0-9a-z_-]([0-9a-z._-]*[0-9a-z_-])?$";

/// Normalizes host arguments before certificate issuance.
pub struct HostNormalizer {
    hostname_pattern: Regex,
}

impl HostNormalizer {
    pub fn new() -> Result<Self> {
        let hostname_pattern =
            Regex::new(HOSTNAME_PATTERN).context("Failed to compile hostname pattern")?;
        Ok(Self { hostname_pattern })
    }

    /// Normalize every host, preserving order.
    pub fn normalize_all<S: AsRef<str>>(&self, hosts: &[S]) -> Vec<String> {
        hosts.iter().map(|host| self.normalize(host.as_ref())).collect()
    }

    /// Normalize one host argument.
    pub fn normalize(&self, name: &str) -> String {
        if name.parse::<IpAddr>().is_ok() || is_absolute_uri(name) {
            return name.to_string();
        }

        let ascii_host = match Host::parse(name) {
            Ok(Host::Domain(domain)) => domain,
            // Numeric forms such as "0x7f.1" are not literal IPs; keep them as written.
            Ok(_) => name.to_string(),
            Err(e) => {
                error!("{:?} is not a valid hostname, IP or URL: {}", name, e);
                name.to_string()
            }
        };

        if !self.is_valid_hostname(&ascii_host) {
            error!("{:?} is not a valid hostname, IP or URL", name);
        }

        ascii_host
    }

    pub fn is_valid_hostname(&self, host: &str) -> bool {
        self.hostname_pattern.is_match(host)
    }
}
