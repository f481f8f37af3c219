//! The local account directory recipients are validated against.

use ahash::AHashSet;
use async_trait::async_trait;
use postern_common::LocalPart;
use serde::Deserialize;

/// Answers whether a local-part names an existing local account.
///
/// Implementations must be free of side effects as far as the pipeline is
/// concerned; it calls `is_known` once per recipient and never caches.
#[async_trait]
pub trait Directory: Send + Sync + std::fmt::Debug {
    async fn is_known(&self, local_part: &LocalPart) -> bool;
}

/// A fixed set of account names, matched exactly (case-sensitive).
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    accounts: AHashSet<String>,
}

impl StaticDirectory {
    #[must_use]
    pub fn new<I, S>(accounts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            accounts: accounts.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[async_trait]
impl Directory for StaticDirectory {
    async fn is_known(&self, local_part: &LocalPart) -> bool {
        self.accounts.contains(local_part.as_str())
    }
}

/// Directory section of the configuration file
///
/// ```text
/// directory: (
///     accounts: ["bob", "carol"],
/// ),
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DirectoryConfig {
    #[serde(default)]
    pub accounts: Vec<String>,
}

impl From<DirectoryConfig> for StaticDirectory {
    fn from(config: DirectoryConfig) -> Self {
        Self::new(config.accounts)
    }
}
