//! Generated document storage
//!
//! Documents live flat in one directory. Lookups accept a bare file name
//! only, and the resolved path must canonicalize to somewhere under the
//! canonical root, so neither `..` segments nor symlinks can escape it.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

/// File name prefix for generated reports
pub const DOCUMENT_PREFIX: &str = "FIR_";

/// File name extension for generated reports
pub const DOCUMENT_EXTENSION: &str = ".pdf";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid file name")]
    InvalidName,

    #[error("File not found")]
    NotFound,

    #[error("Storage I/O error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    /// Create the directory if needed and pin its canonical path
    pub fn open(dir: impl AsRef<Path>) -> io::Result<Self> {
        std::fs::create_dir_all(dir.as_ref())?;
        let root = dir.as_ref().canonicalize()?;
        debug!(root = %root.display(), "Opened document store");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// A fresh `FIR_<uuid>.pdf` name; collisions are not checked
    pub fn generate_name() -> String {
        format!("{}{}{}", DOCUMENT_PREFIX, Uuid::new_v4(), DOCUMENT_EXTENSION)
    }

    /// Whether `name` is a plain file name with no path semantics
    pub fn is_safe_name(name: &str) -> bool {
        !name.is_empty()
            && name.len() <= 255
            && !name.starts_with('.')
            && !name.contains(['/', '\\', '\0', ':'])
    }

    /// Write a new document and return its file name
    pub async fn save(&self, bytes: &[u8]) -> Result<String, StorageError> {
        let name = Self::generate_name();
        tokio::fs::write(self.root.join(&name), bytes).await?;
        debug!(name = %name, size = bytes.len(), "Saved document");
        Ok(name)
    }

    /// Resolve `name` to a canonical path inside the store
    pub async fn resolve(&self, name: &str) -> Result<PathBuf, StorageError> {
        if !Self::is_safe_name(name) {
            warn!(name = %name, "Rejected unsafe file name");
            return Err(StorageError::InvalidName);
        }

        let canonical = match tokio::fs::canonicalize(self.root.join(name)).await {
            Ok(path) => path,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(StorageError::NotFound),
            Err(e) => return Err(e.into()),
        };

        if !canonical.starts_with(&self.root) {
            warn!(name = %name, "Rejected file name resolving outside the store");
            return Err(StorageError::InvalidName);
        }
        if !tokio::fs::metadata(&canonical).await?.is_file() {
            return Err(StorageError::NotFound);
        }

        Ok(canonical)
    }

    pub async fn read(&self, name: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.resolve(name).await?;
        Ok(tokio::fs::read(path).await?)
    }
}
