//! Application layer of the configuration subsystem.
//!
//! Code here works on the shared [`ConfigurationModel`](hipchat_core::ConfigurationModel)
//! and on traits; it performs no file system access and no network I/O.
//!
//! # Sub-modules
//!
//! - **`shared_configuration`** – The one handle through which every
//!   component reads and mutates the live configuration.
//!
//! - **`request`** – The flat key/value request, the ordered list of rules
//!   evaluated against it, and the typed inputs each rule reads.
//!
//! - **`check_connectivity`** – The `ConnectivityChecker` abstraction and the
//!   time-bounded check used by the test rule.

pub mod check_connectivity;
pub mod request;
pub mod shared_configuration;
