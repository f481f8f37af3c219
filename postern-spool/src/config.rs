use std::{path::PathBuf, sync::Arc};

use serde::Deserialize;

use crate::{
    backends::{FileBackingStore, MemoryBackingStore},
    store::BackingStore,
};

/// Configuration for the spool backing store
///
/// File-backed spool in RON config:
/// ```text
/// spool: File(
///     path: "/var/spool/postern",
/// ),
/// ```
///
/// Memory-backed spool, optionally bounded:
/// ```text
/// spool: Memory(
///     capacity: Some(1000),
/// ),
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub enum SpoolConfig {
    /// File-based spool (production)
    File { path: PathBuf },
    /// Memory-based spool (testing/development)
    Memory {
        /// Maximum number of messages to store (omit for unlimited)
        #[serde(default)]
        capacity: Option<usize>,
    },
}

impl Default for SpoolConfig {
    fn default() -> Self {
        Self::File {
            path: FileBackingStore::default().path().to_path_buf(),
        }
    }
}

impl SpoolConfig {
    /// Build and initialise the configured backing store
    ///
    /// # Errors
    /// Returns an error if the file spool path is invalid or cannot be
    /// initialised (directory creation, permissions, etc.)
    pub fn into_backing_store(self) -> crate::Result<Arc<dyn BackingStore>> {
        match self {
            Self::File { path } => {
                let store = FileBackingStore::builder().path(path).build()?;
                store.init()?;
                Ok(Arc::new(store))
            }
            Self::Memory { capacity } => Ok(capacity.map_or_else(
                || Arc::new(MemoryBackingStore::new()) as Arc<dyn BackingStore>,
                |capacity| Arc::new(MemoryBackingStore::with_capacity(capacity)),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_file_spool() {
        let config: SpoolConfig = ron::from_str(r#"File(path: "/var/spool/postern")"#).unwrap();
        assert_eq!(
            config,
            SpoolConfig::File {
                path: PathBuf::from("/var/spool/postern")
            }
        );
    }

    #[test]
    fn parses_memory_spool() {
        let config: SpoolConfig = ron::from_str("Memory(capacity: Some(10))").unwrap();
        assert_eq!(config, SpoolConfig::Memory { capacity: Some(10) });
    }

    #[test]
    fn rejects_relative_file_spool() {
        let config = SpoolConfig::File {
            path: PathBuf::from("spool"),
        };
        assert!(config.into_backing_store().is_err());
    }

    #[tokio::test]
    async fn builds_file_spool() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spool");

        let store = SpoolConfig::File { path: path.clone() }
            .into_backing_store()
            .unwrap();

        assert!(path.is_dir());
        assert!(store.list().await.unwrap().is_empty());
    }
}
