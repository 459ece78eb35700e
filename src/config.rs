//! Crate-wide configuration.
//!
//! Settings are grouped per concern and read from a JSON document, by
//! default `config.json` inside the storage root. Every field has a
//! default, so a missing file or a partial document is valid. The loaded
//! value is passed explicitly to the services that need it.

use crate::generation::domain::{AnalysisOptions, GenerationConfig, GenerationConfigError};
use crate::storage::{DocumentStore, StorageResult};
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::fs_utf8::Dir;
use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// Default storage root, relative to the working directory.
pub const DEFAULT_STORAGE_ROOT: &str = ".pr-review";

/// Default configuration file name inside the storage root.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file exists but could not be read.
    #[error("failed to read configuration {path}: {source}")]
    Read {
        /// Path of the configuration file.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The configuration is not valid JSON for this schema.
    #[error("failed to parse configuration {path}: {source}")]
    Parse {
        /// Path of the configuration file.
        path: Utf8PathBuf,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// A value is out of range.
    #[error(transparent)]
    Invalid(#[from] GenerationConfigError),
}

/// Where persisted documents live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding one `PR-<n>` folder per review unit.
    pub root: Utf8PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: Utf8PathBuf::from(DEFAULT_STORAGE_ROOT),
        }
    }
}

impl StorageConfig {
    /// Opens the storage root, creating it when missing.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the directory cannot be created or
    /// opened.
    pub fn open(&self) -> StorageResult<DocumentStore> {
        DocumentStore::open(&self.root)
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewTaskConfig {
    /// Batch generation settings.
    pub generation: GenerationConfig,
    /// Hints forwarded to the analyzer.
    pub analysis: AnalysisOptions,
    /// Persistence location.
    pub storage: StorageConfig,
}

impl ReviewTaskConfig {
    /// Parses and validates a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(|source| ConfigError::Parse {
            path: Utf8PathBuf::from("<inline>"),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates the configuration at `path` inside `dir`.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, parsed, or
    /// validated.
    pub fn load(dir: &Dir, path: &Utf8Path) -> Result<Self, ConfigError> {
        let raw = match dir.read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_owned(),
                    source,
                });
            }
        };
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for out-of-range values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.generation.validate()?;
        Ok(())
    }
}
