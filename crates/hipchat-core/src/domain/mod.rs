//! Domain entities for the HipChat relay configuration.
//!
//! Pure data and rules only.  Reading and writing the configuration file, and
//! talking to the HipChat API, belong to the `hipchat-config` crate; code here
//! must stay free of file system and network access so it can be unit-tested
//! in isolation.

/// The configuration record and its project overrides.
///
/// See [`configuration::ConfigurationModel`] for the main type.
pub mod configuration;

/// Request parameter and file field names.
pub mod keys;

/// Host-provided paths and runtime settings.
pub mod settings;
