//! Server settings and configuration file discovery.
//!
//! The server section is overridden by `SMTP_SERVER_*` environment
//! variables. It describes where the protocol engine in front of the
//! acceptance pipeline listens; the pipeline itself never reads it.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

pub const CONFIG_ENV: &str = "POSTERN_CONFIG";

const DEFAULT_PATHS: [&str; 2] = ["./postern.config.ron", "/etc/postern/postern.config.ron"];

/// Network identity of the SMTP listener in front of the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "defaults::hostname")]
    pub hostname: String,
    #[serde(default = "defaults::address")]
    pub address: String,
    #[serde(default = "defaults::port")]
    pub port: u16,
    #[serde(default = "defaults::domain")]
    pub domain: String,
}

mod defaults {
    pub fn hostname() -> String {
        "localhost".to_string()
    }

    pub fn address() -> String {
        "0.0.0.0".to_string()
    }

    pub const fn port() -> u16 {
        2525
    }

    pub fn domain() -> String {
        "localhost".to_string()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            hostname: defaults::hostname(),
            address: defaults::address(),
            port: defaults::port(),
            domain: defaults::domain(),
        }
    }
}

impl ServerConfig {
    /// Apply `SMTP_SERVER_HOSTNAME`, `SMTP_SERVER_ADDRESS`, `SMTP_SERVER_PORT`
    /// and `SMTP_SERVER_DOMAIN` overrides. Empty values are ignored.
    ///
    /// # Errors
    /// If `SMTP_SERVER_PORT` is not a valid port number
    pub fn with_overrides<F>(mut self, lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.is_empty());

        if let Some(hostname) = var("SMTP_SERVER_HOSTNAME") {
            self.hostname = hostname;
        }
        if let Some(address) = var("SMTP_SERVER_ADDRESS") {
            self.address = address;
        }
        if let Some(port) = var("SMTP_SERVER_PORT") {
            self.port = port
                .parse()
                .with_context(|| format!("Invalid SMTP_SERVER_PORT {port:?}"))?;
        }
        if let Some(domain) = var("SMTP_SERVER_DOMAIN") {
            self.domain = domain;
        }

        Ok(self)
    }

    /// `address:port`, as the listener would bind it
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

/// Find the configuration file using the following precedence:
/// 1. an explicitly given path (must exist)
/// 2. `POSTERN_CONFIG` environment variable (must exist)
/// 3. ./postern.config.ron
/// 4. /etc/postern/postern.config.ron
pub fn find_config_file(
    explicit: Option<&Path>,
    from_env: Option<String>,
) -> anyhow::Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        anyhow::ensure!(path.exists(), "Config file {} does not exist", path.display());
        return Ok(Some(path.to_path_buf()));
    }

    if let Some(env_path) = from_env {
        let path = PathBuf::from(env_path);
        anyhow::ensure!(
            path.exists(),
            "{CONFIG_ENV} points to non-existent file: {}",
            path.display()
        );
        return Ok(Some(path));
    }

    Ok(DEFAULT_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|path| path.exists()))
}
