//! Infrastructure layer of the configuration subsystem.
//!
//! Contains the adapters that touch the outside world: the configuration
//! file, the HipChat API, and the controller the host calls into.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `hipchat_core`, but MUST NOT be imported by the `application` layer.

pub mod connectivity;
pub mod controller;
pub mod storage;
