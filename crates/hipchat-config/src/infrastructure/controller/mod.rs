//! Host-facing controller of the configuration subsystem.
//!
//! The CI server calls [`ConfigurationController::initialise`] once at plugin
//! startup and [`ConfigurationController::handle_request`] for every request
//! to the settings page.  Neither call ever returns an error to the host:
//! failures are logged and the subsystem carries on with the values it has.
//!
//! # Request handling
//!
//! Each request is checked against [`RequestRule::ORDERED`]; every rule whose
//! trigger key is present is applied, in order:
//!
//! 1. **edit-project** – insert or replace a project override in memory.
//! 2. **edit-settings** – overwrite the global settings, save, then record
//!    the `configurationSaved` acknowledgment.
//! 3. **test-connectivity** – apply the submitted URL and token in memory,
//!    run the connectivity check, set `200 OK` or `400 Bad Request`.
//! 4. **change-status** – enable or disable the plugin and save.
//!
//! The first rule that fails stops the remaining rules of that request.

use std::sync::Arc;

use http::StatusCode;
use hipchat_core::domain::keys::{CONFIGURATION_SAVED_MESSAGE, CONFIGURATION_SAVED_MESSAGE_KEY};
use hipchat_core::{ControllerSettings, HostPaths};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::application::check_connectivity::{check_with_timeout, ConnectivityChecker};
use crate::application::request::{
    ConfigRequest, ConnectivityProbe, ProjectEdit, RequestError, RequestRule, ResponseSink,
    SettingsEdit, StatusChange,
};
use crate::application::shared_configuration::SharedConfiguration;
use crate::infrastructure::storage::{ConfigurationStore, InitialiseOutcome, StoreError};

/// Error raised while applying one rule.  Never leaves the controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Orchestrates the store, the shared model and the connectivity checker.
pub struct ConfigurationController {
    store: ConfigurationStore,
    checker: Arc<dyn ConnectivityChecker>,
    settings: ControllerSettings,
}

impl ConfigurationController {
    pub fn new(
        paths: &HostPaths,
        configuration: SharedConfiguration,
        checker: Arc<dyn ConnectivityChecker>,
        settings: ControllerSettings,
    ) -> Self {
        let store = ConfigurationStore::new(paths, configuration);
        debug!(path = %store.path().display(), "config file path");
        info!("controller created");
        Self {
            store,
            checker,
            settings,
        }
    }

    pub fn store(&self) -> &ConfigurationStore {
        &self.store
    }

    pub fn configuration(&self) -> &SharedConfiguration {
        self.store.configuration()
    }

    /// Creates or migrates and loads the config file.  Never fails.
    pub fn initialise(&self) -> InitialiseOutcome {
        let outcome = self.store.initialise();
        info!(?outcome, "controller initialised");
        outcome
    }

    /// Applies every matching rule of `request`.  Never fails.
    pub async fn handle_request(&self, request: &ConfigRequest, response: &mut dyn ResponseSink) {
        debug!("handling request");
        if let Err(e) = self.dispatch(request, response).await {
            error!("could not handle request: {e}");
        }
    }

    async fn dispatch(
        &self,
        request: &ConfigRequest,
        response: &mut dyn ResponseSink,
    ) -> Result<(), ControllerError> {
        for rule in RequestRule::matching(request) {
            debug!(%rule, "applying rule");
            match rule {
                RequestRule::EditProject => self.edit_project(request),
                RequestRule::EditSettings => self.edit_settings(request, response)?,
                RequestRule::TestConnectivity => self.test_connectivity(request, response).await,
                RequestRule::ChangeStatus => self.change_status(request)?,
            }
        }
        Ok(())
    }

    // ── Rules ─────────────────────────────────────────────────────────────────

    fn edit_project(&self, request: &ConfigRequest) {
        let edit = ProjectEdit::from_request(request);
        debug!(
            project_id = ?edit.project_id,
            room_id = ?edit.room_id,
            notify = edit.notify,
            "changing project configuration"
        );
        match edit.to_override() {
            Some(project) => {
                self.configuration()
                    .update(|model| model.set_project_configuration(project));
            }
            None => warn!("project configuration needs a project id and a room id; ignoring"),
        }
    }

    fn edit_settings(
        &self,
        request: &ConfigRequest,
        response: &mut dyn ResponseSink,
    ) -> Result<(), ControllerError> {
        let edit = SettingsEdit::from_request(request)?;
        debug!(
            api_url = %edit.api_url,
            api_token_set = edit.api_token.is_some(),
            default_room_id = ?edit.default_room_id,
            notify = edit.notify,
            "changing configuration"
        );
        self.configuration().update(|model| edit.apply_to(model));
        self.store.save()?;
        response.add_message(CONFIGURATION_SAVED_MESSAGE_KEY, CONFIGURATION_SAVED_MESSAGE);
        Ok(())
    }

    async fn test_connectivity(&self, request: &ConfigRequest, response: &mut dyn ResponseSink) {
        let probe = match ConnectivityProbe::from_request(request) {
            Ok(probe) => probe,
            Err(e) => {
                warn!("{e}");
                response.set_status(StatusCode::BAD_REQUEST);
                return;
            }
        };
        debug!(
            api_url = %probe.endpoint.url,
            api_token_set = probe.endpoint.token.is_some(),
            "testing authentication"
        );
        self.configuration().update(|model| probe.apply_to(model));

        let authenticated = check_with_timeout(
            self.checker.as_ref(),
            probe.endpoint,
            self.settings.connectivity_timeout,
        )
        .await;
        debug!(authenticated, "authentication status");
        response.set_status(if authenticated {
            StatusCode::OK
        } else {
            StatusCode::BAD_REQUEST
        });
    }

    fn change_status(&self, request: &ConfigRequest) -> Result<(), ControllerError> {
        let Some(change) = StatusChange::from_request(request) else {
            return Ok(());
        };
        debug!(disabled = change.disabled, "changing status");
        self.configuration().update(|model| change.apply_to(model));
        self.store.save()?;
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
