//! The single shared handle to the live configuration.
//!
//! The store, the request controller and the notification logic must all
//! observe the same record.  [`SharedConfiguration`] is a cloneable handle to
//! one `ConfigurationModel`; clones share the instance, and reloading from
//! disk copies values into it rather than swapping it out.
//!
//! Requests are delivered one at a time by the host, so the lock only has to
//! keep readers from observing a half-applied update.  Guards must not be
//! held across an `.await`.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use hipchat_core::ConfigurationModel;

/// Cloneable handle to the authoritative configuration record.
#[derive(Debug, Clone, Default)]
pub struct SharedConfiguration {
    inner: Arc<RwLock<ConfigurationModel>>,
}

impl SharedConfiguration {
    /// Wraps `model` as the authoritative instance.
    pub fn new(model: ConfigurationModel) -> Self {
        Self {
            inner: Arc::new(RwLock::new(model)),
        }
    }

    /// Read access to the live record.
    pub fn read(&self) -> RwLockReadGuard<'_, ConfigurationModel> {
        // A panic while holding the lock leaves a fully-typed model behind;
        // keep serving it.
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write access to the live record.
    pub fn write(&self) -> RwLockWriteGuard<'_, ConfigurationModel> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies `f` to the live record under the write lock.
    pub fn update<R>(&self, f: impl FnOnce(&mut ConfigurationModel) -> R) -> R {
        f(&mut self.write())
    }

    /// Returns a copy of the current values.
    pub fn snapshot(&self) -> ConfigurationModel {
        self.read().clone()
    }

    /// `true` if both handles refer to the same instance.
    pub fn same_instance(&self, other: &SharedConfiguration) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
