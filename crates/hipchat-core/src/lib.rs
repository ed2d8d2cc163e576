//! # hipchat-core
//!
//! Domain model for the HipChat notification relay's persisted configuration.
//!
//! The relay runs as a plugin inside a CI server.  It keeps exactly one
//! configuration record: the HipChat API endpoint and token, the default room
//! that build notifications go to, a global enable/disable switch, and a set
//! of per-project overrides.
//!
//! This crate has no I/O.  It defines:
//!
//! - **`domain::configuration`** – [`ConfigurationModel`] and
//!   [`ProjectOverride`], plus the accessor rules (empty default-room input is
//!   stored as absent, overrides are keyed by project id).
//!
//! - **`domain::keys`** – Names of the request parameters and persisted
//!   fields, including the legacy v0.1 default-room key.
//!
//! - **`domain::settings`** – Host-supplied paths and controller settings.

pub mod domain;

// Re-export the most-used types at the crate root so callers can write
// `hipchat_core::ConfigurationModel` instead of the full module path.
pub use domain::configuration::{
    ConfigurationModel, NotificationTarget, ProjectIdError, ProjectOverride, DEFAULT_API_URL,
};
pub use domain::settings::{ControllerSettings, HostPaths, CONFIG_FILE_NAME};
