//! Classification of host identifiers into Subject Alternative Names.
//!
//! Each identifier lands in exactly one bucket, checked in this order:
//!
//! 1. a literal IP address becomes an `iPAddress` SAN,
//! 2. an absolute URI with both a scheme and a host becomes a `uniformResourceIdentifier` SAN,
//! 3. anything else becomes a `dNSName` SAN verbatim.
//!
//! No validation happens here. Anything that is neither an IP nor an absolute
//! URI falls through to a DNS name, so callers normalize hostnames first.

use std::net::IpAddr;
use url::Url;

/// One classified host identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostIdentifier {
    Ip(IpAddr),
    Uri(String),
    Dns(String),
}

impl HostIdentifier {
    /// Classify a single host string.
    pub fn classify(host: &str) -> Self {
        if let Ok(ip) = host.parse::<IpAddr>() {
            return HostIdentifier::Ip(ip);
        }

        if is_absolute_uri(host) {
            return HostIdentifier::Uri(host.to_string());
        }

        HostIdentifier::Dns(host.to_string())
    }
}

/// True when `host` is written as `<scheme>://<authority>...` with a non-empty host.
///
/// The URL parser repairs input such as `http:example.com` or a leading space,
/// so the literal `//` and the absence of surrounding whitespace are checked first.
pub(crate) fn is_absolute_uri(host: &str) -> bool {
    let has_authority = host
        .split_once(':')
        .is_some_and(|(scheme, rest)| !scheme.is_empty() && rest.starts_with("//"));
    if !has_authority || host.trim() != host || host.contains(['\t', '\n', '\r']) {
        return false;
    }

    Url::parse(host)
        .ok()
        .and_then(|uri| uri.host_str().map(|h| !h.is_empty()))
        .unwrap_or(false)
}

/// IPv4-mapped IPv6 addresses are embedded in their 4-byte form.
pub fn san_ip_address(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map_or(ip, IpAddr::V4),
        IpAddr::V4(_) => ip,
    }
}

/// SANs grouped by kind, each group in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectAltNames {
    pub ip_addresses: Vec<IpAddr>,
    pub uris: Vec<String>,
    pub dns_names: Vec<String>,
}

impl SubjectAltNames {
    /// Classify every host, keeping the relative order within each kind.
    pub fn from_hosts<S: AsRef<str>>(hosts: &[S]) -> Self {
        let mut names = SubjectAltNames::default();
        for host in hosts {
            match HostIdentifier::classify(host.as_ref()) {
                HostIdentifier::Ip(ip) => names.ip_addresses.push(ip),
                HostIdentifier::Uri(uri) => names.uris.push(uri),
                HostIdentifier::Dns(dns) => names.dns_names.push(dns),
            }
        }
        names
    }

    pub fn is_empty(&self) -> bool {
        self.ip_addresses.is_empty() && self.uris.is_empty() && self.dns_names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ip_addresses.len() + self.uris.len() + self.dns_names.len()
    }
}
