//! Host-provided paths and controller settings.
//!
//! The CI server tells the plugin where its configuration directory is; the
//! plugin owns one file in that directory.  [`ControllerSettings`] carries the
//! remaining runtime knobs.  Both are plain structs built once at startup, so
//! tests can construct them directly with a temporary directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the configuration file inside the host's config directory.
pub const CONFIG_FILE_NAME: &str = "hipchat.toml";

/// Default upper bound for one connectivity check.
pub const DEFAULT_CONNECTIVITY_TIMEOUT: Duration = Duration::from_secs(10);

/// Directories supplied by the hosting server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPaths {
    config_dir: PathBuf,
}

impl HostPaths {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Full path of the configuration file.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }
}

/// Runtime settings of the configuration controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSettings {
    /// Maximum time one connectivity check may take before it counts as a
    /// failed authentication.
    pub connectivity_timeout: Duration,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            connectivity_timeout: DEFAULT_CONNECTIVITY_TIMEOUT,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
