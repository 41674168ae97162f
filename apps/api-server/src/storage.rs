//! # Upload Storage
//!
//! Content-addressed storage for uploaded QR images.
//!
//! ```text
//! <upload_dir>/
//! ├── 3f1c...9a.png     key = sha256(bytes) + sanitized extension
//! └── .8d2e...-....tmp  in-flight write, renamed into place when complete
//! ```
//!
//! The client filename contributes nothing but its extension, so two
//! clients uploading `label.png` never overwrite each other, and uploading
//! identical bytes twice stores one file.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// Extension used when the client filename has none worth keeping.
const FALLBACK_EXTENSION: &str = "bin";

const MAX_EXTENSION_LEN: usize = 8;

/// Upload storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload storage error: {0}")]
    Io(#[from] std::io::Error),
}

/// A stored upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    /// File name inside the upload directory.
    pub key: String,
    pub path: PathBuf,
    pub size: usize,

    /// The same content had been stored before.
    pub already_present: bool,
}

/// Filesystem upload store rooted at one directory.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    /// Opens the store, creating the directory if needed.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(UploadStore { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Storage key for `bytes` uploaded under `filename`.
    pub fn key_for(bytes: &[u8], filename: Option<&str>) -> String {
        let digest = Sha256::digest(bytes);
        format!("{:x}.{}", digest, sanitized_extension(filename))
    }

    /// Persists `bytes`, returning where they live.
    ///
    /// The write goes to a temporary file in the same directory and is
    /// renamed into place, so a reader never sees a partial image.
    pub async fn put(&self, bytes: &[u8], filename: Option<&str>) -> Result<StoredUpload, StorageError> {
        let key = Self::key_for(bytes, filename);
        let path = self.root.join(&key);

        if tokio::fs::try_exists(&path).await? {
            debug!(key = %key, "Upload already stored");
            return Ok(StoredUpload {
                key,
                path,
                size: bytes.len(),
                already_present: true,
            });
        }

        let tmp = self.root.join(format!(".{}.tmp", Uuid::new_v4()));
        if let Err(e) = tokio::fs::write(&tmp, bytes).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        debug!(key = %key, size = bytes.len(), "Upload stored");

        Ok(StoredUpload {
            key,
            path,
            size: bytes.len(),
            already_present: false,
        })
    }
}

/// Lowercased alphanumeric extension of `filename`, or `bin`.
fn sanitized_extension(filename: Option<&str>) -> String {
    let ext = filename
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();

    if ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return FALLBACK_EXTENSION.to_string();
    }

    ext.to_ascii_lowercase()
}
