use std::{path::Path, sync::Arc};

use anyhow::Context as _;
use postern_common::{Envelope, internal};
use postern_delivery::{
    AcceptError, AcceptanceResult, DeliveryPipeline, DirectoryConfig, StaticDirectory,
};
use postern_spool::SpoolConfig;
use serde::Deserialize;

use crate::config::{CONFIG_ENV, ServerConfig, find_config_file};

/// Top level configuration
///
/// ```text
/// Postern (
///     server: (hostname: "mx.corp.com", port: 25),
///     spool: File(path: "/var/spool/postern"),
///     directory: (accounts: ["bob", "carol"]),
/// )
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Postern {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub spool: SpoolConfig,
    #[serde(default)]
    pub directory: DirectoryConfig,
}

impl Postern {
    /// Parse a RON configuration document
    ///
    /// # Errors
    /// If the document is not valid configuration
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        ron::from_str(content).context("Failed to parse configuration")
    }

    /// Read and parse a configuration file
    ///
    /// # Errors
    /// If the file cannot be read or parsed
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        Self::parse(&content).with_context(|| format!("In {}", path.display()))
    }

    /// Load the configuration the process should run with
    ///
    /// An explicit `path` wins, then `POSTERN_CONFIG`, then the default
    /// locations. When no file is found the built-in defaults are used.
    /// Environment overrides are applied last.
    ///
    /// # Errors
    /// If a named configuration file is missing or invalid, or an
    /// environment override is invalid
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let config = match find_config_file(path, std::env::var(CONFIG_ENV).ok())? {
            Some(path) => {
                internal!(level = INFO, "Loading configuration from {}", path.display());
                Self::from_file(&path)?
            }
            None => {
                internal!(
                    level = INFO,
                    "No configuration file found, using defaults and environment variables"
                );
                Self::default()
            }
        };

        config.with_env(|key| std::env::var(key).ok())
    }

    /// Apply environment overrides using `lookup`
    ///
    /// # Errors
    /// If an override is invalid
    pub fn with_env<F>(mut self, lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.server = self.server.with_overrides(lookup)?;
        Ok(self)
    }

    /// Open the configured store and wire it to the local directory
    ///
    /// # Errors
    /// If the spool cannot be opened
    pub fn into_pipeline(self) -> postern_spool::Result<DeliveryPipeline> {
        let store = self.spool.into_backing_store()?;
        let directory = StaticDirectory::from(self.directory);

        internal!(
            "Pipeline ready with {} local account(s) on {}",
            directory.len(),
            self.server.domain
        );

        Ok(DeliveryPipeline::new(Arc::new(directory), store))
    }

    /// Accept a single envelope with this configuration. A spool that cannot
    /// be opened is reported as a store failure, like one that fails mid-write.
    pub async fn accept(self, envelope: Envelope) -> AcceptanceResult {
        let pipeline = self.into_pipeline().map_err(|err| {
            internal!(level = WARN, "Failed to open spool: {err}");
            AcceptError::StoreFailure(err)
        })?;

        pipeline.accept(envelope).await
    }
}
