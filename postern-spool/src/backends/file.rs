use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use postern_common::{Envelope, internal};
use tokio::fs;

use crate::{SpoolError, ValidationError, store::BackingStore, types::SpooledMessageId};

const SENSITIVE_PREFIXES: [&str; 9] = [
    "/etc", "/bin", "/sbin", "/usr/bin", "/usr/sbin", "/boot", "/sys", "/proc", "/dev",
];

/// File-based backing store implementation
///
/// Every message is kept as two files named after its ULID:
/// - `{id}.eml` - the raw message body, byte for byte
/// - `{id}.bin` - the envelope metadata (sender, recipients) as bincode
///
/// # Atomicity
/// Both files are first written under a `.tmp_` prefix and then renamed into
/// place, body first. A message only becomes visible to `list` once its
/// `.bin` file exists, so a crash part way through never exposes a partial
/// message. A failed `persist` removes whatever it wrote before returning
/// the error.
///
/// Deletes rename both files to a `.deleted` suffix before removing them;
/// leftovers are swept by [`FileBackingStore::init`].
#[derive(Debug, Clone)]
pub struct FileBackingStore {
    path: PathBuf,
}

impl Default for FileBackingStore {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/var/spool/postern"),
        }
    }
}

impl FileBackingStore {
    /// Validate a spool path
    ///
    /// Rejects relative paths, paths with `..` components and paths inside
    /// system directories.
    ///
    /// # Errors
    /// Returns an error if the path is invalid or potentially dangerous
    fn validate_path(path: &Path) -> Result<(), ValidationError> {
        if path.components().any(|c| c == Component::ParentDir) {
            return Err(ValidationError::InvalidPath(format!(
                "cannot contain '..' components: {}",
                path.display()
            )));
        }

        if !path.is_absolute() {
            return Err(ValidationError::InvalidPath(format!(
                "must be absolute: {}",
                path.display()
            )));
        }

        if let Some(prefix) = SENSITIVE_PREFIXES.iter().find(|p| path.starts_with(p)) {
            return Err(ValidationError::InvalidPath(format!(
                "cannot be in system directory {prefix}: {}",
                path.display()
            )));
        }

        Ok(())
    }

    /// Create a new `FileBackingStore` builder
    #[must_use]
    pub fn builder() -> FileBackingStoreBuilder {
        FileBackingStoreBuilder::default()
    }

    /// The spool directory
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Initialize the file-backed spool
    ///
    /// Creates the spool directory if it doesn't exist, checks that it is a
    /// directory, and removes `.deleted` files left by an interrupted delete.
    ///
    /// `.tmp_` files are left alone: another handle on the same directory may
    /// be part way through a `persist`.
    ///
    /// # Errors
    /// - If the spool path cannot be created or read
    /// - If the path exists but is not a directory
    pub fn init(&self) -> crate::Result<()> {
        internal!("Initialising spool at {}", self.path.display());

        if !self.path.try_exists()? {
            internal!("{} does not exist, creating...", self.path.display());
            std::fs::create_dir_all(&self.path)?;
        } else if !self.path.is_dir() {
            return Err(ValidationError::NotDirectory(self.path.display().to_string()).into());
        }

        self.cleanup_orphans()
    }

    fn cleanup_orphans(&self) -> crate::Result<()> {
        let mut cleaned = 0;

        for entry in std::fs::read_dir(&self.path)? {
            let entry = entry?;
            let filename = entry.file_name();
            let filename = filename.to_string_lossy();

            if filename.ends_with(".deleted") {
                std::fs::remove_file(entry.path())?;
                cleaned += 1;
            }
        }

        if cleaned > 0 {
            internal!(
                level = INFO,
                "Cleaned up {cleaned} orphaned files from spool"
            );
        }

        Ok(())
    }

    fn paths(&self, id: &SpooledMessageId) -> (PathBuf, PathBuf) {
        (
            self.path.join(format!("{id}.eml")),
            self.path.join(format!("{id}.bin")),
        )
    }
}

async fn write_temp(
    data_path: &Path,
    body: &[u8],
    meta_path: &Path,
    metadata: &[u8],
) -> std::io::Result<()> {
    fs::write(data_path, body).await?;
    fs::write(meta_path, metadata).await
}

/// Best-effort removal of the files of a failed persist
async fn discard(paths: &[&Path]) {
    for path in paths {
        if let Err(e) = fs::remove_file(path).await
            && e.kind() != std::io::ErrorKind::NotFound
        {
            internal!(
                level = WARN,
                "Failed to remove {} after an aborted write: {e}",
                path.display()
            );
        }
    }
}

fn not_found(err: std::io::Error, id: &SpooledMessageId) -> SpoolError {
    if err.kind() == std::io::ErrorKind::NotFound {
        SpoolError::NotFound(id.clone())
    } else {
        err.into()
    }
}

#[async_trait]
impl BackingStore for FileBackingStore {
    #[tracing::instrument(level = "debug", skip_all, err)]
    async fn persist(&self, envelope: &Envelope) -> crate::Result<SpooledMessageId> {
        let id = SpooledMessageId::generate();
        let (data_path, meta_path) = self.paths(&id);

        if fs::try_exists(&data_path).await? || fs::try_exists(&meta_path).await? {
            return Err(SpoolError::AlreadyExists(id));
        }

        let temp_data_path = self.path.join(format!(".tmp_{id}.eml"));
        let temp_meta_path = self.path.join(format!(".tmp_{id}.bin"));

        let metadata = bincode::serde::encode_to_vec(envelope, bincode::config::standard())?;

        if let Err(e) = write_temp(&temp_data_path, envelope.body(), &temp_meta_path, &metadata).await
        {
            discard(&[&temp_data_path, &temp_meta_path]).await;
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&temp_data_path, &data_path).await {
            discard(&[&temp_data_path, &temp_meta_path]).await;
            return Err(e.into());
        }

        // The body is visible under its final name but `list` only sees the
        // message once the metadata is renamed too
        if let Err(e) = fs::rename(&temp_meta_path, &meta_path).await {
            discard(&[&data_path, &temp_meta_path]).await;
            return Err(e.into());
        }

        internal!(
            level = DEBUG,
            "Spooled message {id} to {}",
            data_path.display()
        );

        Ok(id)
    }

    /// Scans the spool directory for `.bin` metadata files. Temporary and
    /// deleted files, and anything not named after a ULID, are skipped.
    #[tracing::instrument(level = "debug", skip_all, err)]
    async fn list(&self) -> crate::Result<Vec<SpooledMessageId>> {
        let mut entries = fs::read_dir(&self.path).await?;
        let mut ids = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let filename = entry.file_name();
            let filename = filename.to_string_lossy();

            if filename.ends_with(".bin")
                && let Some(id) = SpooledMessageId::from_filename(&filename)
            {
                ids.push(id);
            }
        }

        ids.sort();

        Ok(ids)
    }

    #[tracing::instrument(level = "debug", skip_all, fields(id = %id), err)]
    async fn read(&self, id: &SpooledMessageId) -> crate::Result<Envelope> {
        let (data_path, meta_path) = self.paths(id);

        let meta = fs::read(&meta_path).await.map_err(|e| not_found(e, id))?;
        let (envelope, _): (Envelope, usize) =
            bincode::serde::decode_from_slice(&meta, bincode::config::standard())?;

        let body = fs::read(&data_path).await.map_err(|e| not_found(e, id))?;

        Ok(envelope.with_body(body))
    }

    #[tracing::instrument(level = "debug", skip_all, fields(id = %id), err)]
    async fn delete(&self, id: &SpooledMessageId) -> crate::Result<()> {
        let (data_path, meta_path) = self.paths(id);

        let deleted_meta_path = self.path.join(format!("{id}.bin.deleted"));
        let deleted_data_path = self.path.join(format!("{id}.eml.deleted"));

        // Metadata first, so the message drops out of `list` straight away
        fs::rename(&meta_path, &deleted_meta_path)
            .await
            .map_err(|e| not_found(e, id))?;
        fs::rename(&data_path, &deleted_data_path).await?;

        fs::remove_file(&deleted_meta_path).await?;
        fs::remove_file(&deleted_data_path).await?;

        internal!(level = DEBUG, "Deleted message {id} from spool");

        Ok(())
    }
}

/// Builder for `FileBackingStore`
#[derive(Debug, Default)]
pub struct FileBackingStoreBuilder {
    path: PathBuf,
}

impl FileBackingStoreBuilder {
    /// Set the spool directory path
    #[must_use]
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    /// Build the final `FileBackingStore`
    ///
    /// # Errors
    /// Returns an error if the path is invalid or potentially dangerous
    pub fn build(self) -> Result<FileBackingStore, ValidationError> {
        FileBackingStore::validate_path(&self.path)?;
        Ok(FileBackingStore { path: self.path })
    }
}
