//! mktls - print a CA, daemon and client certificate bundle as JSON
//!
//! ```bash
//! mktls myservice.default.svc 127.0.0.1
//! mktls --expiry-years 10 myservice.default.svc 127.0.0.1
//! ```
//!
//! The bundle goes to stdout; diagnostics go to stderr (`RUST_LOG` controls verbosity).

use anyhow::{Context, Result};
use clap::Parser;
use mktls::configs::{effective_expiry_years, AppConfig};
use mktls::hosts::HostNormalizer;
use mktls::identity::identity_label;
use mktls::tls_certs::{generate_bundle, GenerationRequest};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const SHORT_USAGE: &str = "Usage of mktls:
  Provide certificates with SANs.
  $ mktls myservice.default.svc 127.0.0.1

  Provide certificates with SANs and expiry (in 10 years).
  $ mktls --expiry-years 10 myservice.default.svc 127.0.0.1
";

#[derive(Parser)]
#[command(name = "mktls")]
#[command(about = "Generate a local CA with daemon and client certificates", long_about = None)]
#[command(after_help = SHORT_USAGE)]
struct Cli {
    /// Certificate lifetime in years (0 means 10)
    #[arg(long, alias = "expiryYears")]
    expiry_years: Option<u32>,

    /// Optional TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// IP addresses, URIs or hostnames for the daemon certificate
    hosts: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if cli.hosts.is_empty() {
        eprint!("{}", SHORT_USAGE);
        return Ok(());
    }

    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let expiry_years = effective_expiry_years(cli.expiry_years, config.certificates.expiry_years);

    let hosts = HostNormalizer::new()?.normalize_all(&cli.hosts);

    let request = GenerationRequest::new(hosts, identity_label())
        .expiry_years(expiry_years)
        .defaults(config.certificates);
    let bundle = generate_bundle(&request).context("Failed to generate certificate bundle")?;

    print!("{}", bundle.to_json().context("Failed to encode bundle")?);
    Ok(())
}
