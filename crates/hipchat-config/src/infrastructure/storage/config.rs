//! TOML-based persistence of the relay configuration.
//!
//! [`ConfigurationStore`] owns the single configuration file of an
//! installation (`<config dir>/hipchat.toml`) and keeps it in step with the
//! [`SharedConfiguration`] handed to it at construction.
//!
//! # Lifecycle
//!
//! ```text
//! initialise()
//!  ├─ file absent  → reset shared model to defaults, save()
//!  └─ file present → migrate_if_needed(), load()
//! ```
//!
//! `load()` parses the file into a fresh model and copies it field by field
//! onto the shared instance.  Other components hold clones of the same
//! handle, so the instance itself is never swapped.
//!
//! `save()` serializes the shared model to a temporary file in the same
//! directory and renames it over the config file.  The file handle is scoped
//! to the write, and a failure at any point leaves the previous file intact.
//!
//! # Errors
//!
//! `initialise()` never fails; it logs and reports [`InitialiseOutcome::Failed`]
//! and leaves the shared model as it was.  `load()`, `save()` and
//! `migrate_if_needed()` return [`StoreError`] to the caller.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use hipchat_core::{ConfigurationModel, HostPaths};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::application::shared_configuration::SharedConfiguration;
use crate::infrastructure::storage::document::ConfigDocument;
use crate::infrastructure::storage::migration::{migrate_text, MigrationError};

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The file could not be read, created or written.
    #[error("I/O error accessing config at {}: {source}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file content is not a valid configuration document.
    #[error("failed to parse config at {}: {source}", .path.display())]
    Serialization {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The model could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Encoding(#[from] toml::ser::Error),

    /// The file was read but could not be migrated or written back.
    #[error("failed to migrate config at {}: {source}", .path.display())]
    Migration {
        path: PathBuf,
        #[source]
        source: MigrationError,
    },
}

/// What [`ConfigurationStore::initialise`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitialiseOutcome {
    /// No file existed; a default one was written.
    Created,
    /// An existing file was loaded, after migration if `migrated`.
    Loaded { migrated: bool },
    /// Something went wrong; the shared model was left untouched.
    Failed,
}

/// Reads and writes the shared configuration to its file.
#[derive(Debug, Clone)]
pub struct ConfigurationStore {
    path: PathBuf,
    configuration: SharedConfiguration,
}

impl ConfigurationStore {
    /// Creates a store for the config file under the host's config directory.
    pub fn new(paths: &HostPaths, configuration: SharedConfiguration) -> Self {
        Self::with_path(paths.config_file(), configuration)
    }

    /// Creates a store for an explicit file path.
    pub fn with_path(path: impl Into<PathBuf>, configuration: SharedConfiguration) -> Self {
        Self {
            path: path.into(),
            configuration,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The shared model this store loads into and saves from.
    pub fn configuration(&self) -> &SharedConfiguration {
        &self.configuration
    }

    /// Ensures a current-schema file exists and the shared model reflects it.
    ///
    /// Safe to call again; a second run finds the file, has nothing to
    /// migrate, and reloads it.
    pub fn initialise(&self) -> InitialiseOutcome {
        match self.try_initialise() {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("could not initialise configuration: {e}");
                InitialiseOutcome::Failed
            }
        }
    }

    fn try_initialise(&self) -> Result<InitialiseOutcome, StoreError> {
        let exists = self.path.try_exists().map_err(|source| self.file_access(source))?;
        if exists {
            debug!(path = %self.path.display(), "loading existing configuration");
            let migrated = self.migrate_if_needed()?;
            self.load()?;
            Ok(InitialiseOutcome::Loaded { migrated })
        } else {
            debug!(path = %self.path.display(), "no configuration file exists; creating new one");
            // Write the defaults first so a failed save leaves memory untouched.
            let defaults = ConfigurationModel::default();
            self.write_model(&defaults)?;
            self.configuration.update(|model| model.copy_from(&defaults));
            Ok(InitialiseOutcome::Created)
        }
    }

    /// Rewrites an older-schema file in place.
    ///
    /// Returns `true` if the file was rewritten, `false` if it was already
    /// current (in which case nothing is written).
    ///
    /// # Errors
    ///
    /// [`StoreError::FileAccess`] if the file cannot be read,
    /// [`StoreError::Migration`] if the rewrite fails or its text cannot be
    /// written.
    pub fn migrate_if_needed(&self) -> Result<bool, StoreError> {
        let text = std::fs::read_to_string(&self.path).map_err(|source| self.file_access(source))?;
        let Some(migrated) = migrate_text(&text).map_err(|e| self.migration(e))? else {
            return Ok(false);
        };
        write_atomically(&self.path, migrated.text.as_bytes())
            .map_err(|e| self.migration(e.into()))?;
        for name in &migrated.applied {
            info!(path = %self.path.display(), "migrated configuration: {name}");
        }
        Ok(true)
    }

    /// Parses the file into a fresh model without touching the shared one.
    ///
    /// # Errors
    ///
    /// [`StoreError::FileAccess`] or [`StoreError::Serialization`].
    pub fn read_model(&self) -> Result<ConfigurationModel, StoreError> {
        let text = std::fs::read_to_string(&self.path).map_err(|source| self.file_access(source))?;
        let document: ConfigDocument =
            toml::from_str(&text).map_err(|source| StoreError::Serialization {
                path: self.path.clone(),
                source,
            })?;
        Ok(document.into_model())
    }

    /// Loads the file and copies every value onto the shared model.
    ///
    /// # Errors
    ///
    /// [`StoreError::FileAccess`] or [`StoreError::Serialization`]; the shared
    /// model is unchanged on error.
    pub fn load(&self) -> Result<(), StoreError> {
        let loaded = self.read_model()?;
        self.configuration.update(|model| model.copy_from(&loaded));
        debug!(path = %self.path.display(), "configuration loaded");
        Ok(())
    }

    /// Writes the shared model's current values to the file, replacing it.
    ///
    /// Creates the config directory and file if they do not exist.
    ///
    /// # Errors
    ///
    /// [`StoreError::Encoding`] or [`StoreError::FileAccess`].
    pub fn save(&self) -> Result<(), StoreError> {
        let snapshot = self.configuration.snapshot();
        self.write_model(&snapshot)?;
        debug!(path = %self.path.display(), "configuration saved");
        Ok(())
    }

    fn write_model(&self, model: &ConfigurationModel) -> Result<(), StoreError> {
        let content = toml::to_string_pretty(&ConfigDocument::from(model))?;
        write_atomically(&self.path, content.as_bytes()).map_err(|source| self.file_access(source))
    }

    fn file_access(&self, source: io::Error) -> StoreError {
        StoreError::FileAccess {
            path: self.path.clone(),
            source,
        }
    }

    fn migration(&self, source: MigrationError) -> StoreError {
        StoreError::Migration {
            path: self.path.clone(),
            source,
        }
    }
}

/// Replaces `path` with `contents` via a temporary file in the same directory.
fn write_atomically(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(contents)?;
    file.flush()?;
    file.as_file().sync_all()?;
    // Dropping `file` on an early return removes the temporary.
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
