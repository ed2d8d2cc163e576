//! Storage infrastructure: configuration file persistence.
//!
//! - **`document`** – The serde schema of the TOML file and its conversions
//!   to and from [`ConfigurationModel`](hipchat_core::ConfigurationModel).
//! - **`migration`** – Text rewrites that bring an older file up to the
//!   current schema before it is parsed.
//! - **`config`** – [`ConfigurationStore`]: first-run bootstrap, migrate,
//!   load into the shared model, save.
//!
//! The store is the only component that reads or writes the file.

pub mod config;
pub mod document;
pub mod migration;

pub use config::{ConfigurationStore, InitialiseOutcome, StoreError};
