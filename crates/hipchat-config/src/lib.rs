//! hipchat-config library entry point.
//!
//! Persisted configuration subsystem of the HipChat notification relay:
//! loading, migrating and saving the configuration file, and applying the
//! settings page's edit/test/enable requests to the shared model.
//!
//! ```text
//! host ─► ConfigurationController::initialise()      (once, at startup)
//!            └─ ConfigurationStore: migrate, load or create
//! host ─► ConfigurationController::handle_request()  (per request)
//!            ├─ mutate SharedConfiguration
//!            ├─ ConnectivityChecker (test rule only)
//!            └─ ConfigurationStore::save() after a persisting rule
//! ```
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.

pub mod application;
pub mod infrastructure;
