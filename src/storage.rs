//! Capability-scoped JSON document storage.
//!
//! All file-backed adapters persist through [`DocumentStore`], which confines
//! access to one root directory and replaces documents atomically: content is
//! written and synced to a temporary sibling file which is then renamed over
//! the target, so a reader never observes a partially written document.
//! Blocking filesystem calls run on the blocking thread pool.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use serde::{Serialize, de::DeserializeOwned};
use std::io::{self, Write};
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

/// Result type for document storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors raised by [`DocumentStore`].
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path relative to the storage root.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A stored document could not be decoded.
    #[error("malformed document at {path}: {source}")]
    Malformed {
        /// Path relative to the storage root.
        path: Utf8PathBuf,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// A value could not be encoded.
    #[error("failed to encode document for {path}: {source}")]
    Encode {
        /// Path relative to the storage root.
        path: Utf8PathBuf,
        /// Underlying encode error.
        #[source]
        source: serde_json::Error,
    },

    /// The blocking worker running the operation failed.
    #[error("storage worker failed: {0}")]
    Worker(String),
}

impl StorageError {
    fn io(path: impl Into<Utf8PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let owned = path.into();
        move |source| Self::Io {
            path: owned,
            source,
        }
    }
}

/// JSON document store rooted at a capability directory.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: Arc<Dir>,
}

impl DocumentStore {
    /// Opens (creating if necessary) a storage root on the ambient
    /// filesystem.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] when the directory cannot be created or
    /// opened.
    pub fn open(root: &Utf8Path) -> StorageResult<Self> {
        Dir::create_ambient_dir_all(root, ambient_authority()).map_err(StorageError::io(root))?;
        let dir =
            Dir::open_ambient_dir(root, ambient_authority()).map_err(StorageError::io(root))?;
        Ok(Self::from_dir(dir))
    }

    /// Wraps an already opened capability directory.
    #[must_use]
    pub fn from_dir(dir: Dir) -> Self {
        Self {
            root: Arc::new(dir),
        }
    }

    /// Reads and decodes a document.
    ///
    /// Returns `Ok(None)` when the document does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] for read failures and
    /// [`StorageError::Malformed`] when the content cannot be decoded.
    pub async fn read_json<T>(&self, path: Utf8PathBuf) -> StorageResult<Option<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let root = Arc::clone(&self.root);
        run_blocking(move || {
            let raw = match root.read_to_string(&path) {
                Ok(raw) => raw,
                Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
                Err(source) => return Err(StorageError::Io { path, source }),
            };
            serde_json::from_str(&raw)
                .map(Some)
                .map_err(|source| StorageError::Malformed { path, source })
        })
        .await
    }

    /// Encodes and atomically replaces a document, creating parent
    /// directories as needed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Encode`] when the value cannot be encoded and
    /// [`StorageError::Io`] when writing or renaming fails.
    pub async fn write_json<T>(&self, path: Utf8PathBuf, value: &T) -> StorageResult<()>
    where
        T: Serialize + ?Sized,
    {
        let bytes = serde_json::to_vec_pretty(value).map_err(|source| StorageError::Encode {
            path: path.clone(),
            source,
        })?;
        let root = Arc::clone(&self.root);
        run_blocking(move || write_atomically(&root, &path, &bytes)).await
    }

    /// Removes a document; a missing document is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] when removal fails.
    pub async fn remove(&self, path: Utf8PathBuf) -> StorageResult<()> {
        let root = Arc::clone(&self.root);
        run_blocking(move || match root.remove_file(&path) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => {
                Err(StorageError::Io { path, source: err })
            }
            _ => Ok(()),
        })
        .await
    }

    /// Lists the names of the directories directly below the root.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] when the root cannot be enumerated.
    pub async fn list_dirs(&self) -> StorageResult<Vec<String>> {
        let root = Arc::clone(&self.root);
        run_blocking(move || {
            let mut names = Vec::new();
            for entry in root.entries().map_err(StorageError::io("."))? {
                let dir_entry = entry.map_err(StorageError::io("."))?;
                let is_dir = dir_entry
                    .file_type()
                    .map_err(StorageError::io("."))?
                    .is_dir();
                if is_dir {
                    names.push(dir_entry.file_name().map_err(StorageError::io("."))?);
                }
            }
            names.sort();
            Ok(names)
        })
        .await
    }
}

fn write_atomically(root: &Dir, path: &Utf8Path, bytes: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_str().is_empty()) {
        root.create_dir_all(parent)
            .map_err(StorageError::io(parent))?;
    }
    let file_name = path.file_name().unwrap_or("document");
    let temp_path = path.with_file_name(format!(".{file_name}.{}.tmp", Uuid::new_v4()));

    let written = root.create(&temp_path).and_then(|mut file| {
        file.write_all(bytes)?;
        file.sync_all()
    });
    if let Err(source) = written {
        discard_temp(root, &temp_path);
        return Err(StorageError::Io {
            path: temp_path,
            source,
        });
    }

    if let Err(source) = root.rename(&temp_path, root, path) {
        discard_temp(root, &temp_path);
        return Err(StorageError::Io {
            path: path.to_owned(),
            source,
        });
    }
    Ok(())
}

fn discard_temp(root: &Dir, temp_path: &Utf8Path) {
    if let Err(err) = root.remove_file(temp_path) {
        warn!(path = %temp_path, error = %err, "failed to remove temporary document");
    }
}

/// Runs a blocking storage operation on the blocking thread pool.
async fn run_blocking<F, T>(f: F) -> StorageResult<T>
where
    F: FnOnce() -> StorageResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|err| StorageError::Worker(format!("task join error: {err}")))?
}
