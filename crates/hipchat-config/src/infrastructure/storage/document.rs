//! On-disk schema of the configuration file.
//!
//! ```toml
//! [hipchat]
//! apiUrl = "https://api.hipchat.com/v2/"
//! apiToken = "token"
//! defaultRoomId = "12345"
//! notify = false
//! disabled = false
//!
//! [[hipchat.projects]]
//! projectId = "project1"
//! roomId = "room1"
//! notify = true
//! ```
//!
//! Absent optional values are omitted rather than written as empty strings.
//! Every field except the `[hipchat]` table itself has a serde default, so a
//! file written by an older release that lacks newer fields still loads.
//! Unknown keys are ignored.

use hipchat_core::{ConfigurationModel, ProjectOverride, DEFAULT_API_URL};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// The whole file.  The root table is named after the plugin.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfigDocument {
    pub hipchat: HipChatSection,
}

/// Global settings plus the project overrides.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HipChatSection {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_room_id: Option<String>,
    #[serde(default)]
    pub notify: bool,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub projects: Vec<ProjectEntry>,
}

/// One `[[hipchat.projects]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectEntry {
    pub project_id: String,
    pub room_id: String,
    #[serde(default)]
    pub notify: bool,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl From<&ConfigurationModel> for ConfigDocument {
    fn from(model: &ConfigurationModel) -> Self {
        Self {
            hipchat: HipChatSection {
                api_url: model.api_url().to_string(),
                api_token: model.api_token().map(str::to_string),
                default_room_id: model.default_room_id().map(str::to_string),
                notify: model.notify_status(),
                disabled: model.disabled_status(),
                projects: model
                    .project_configurations()
                    .map(|project| ProjectEntry {
                        project_id: project.project_id().to_string(),
                        room_id: project.room_id().to_string(),
                        notify: project.notify_status(),
                    })
                    .collect(),
            },
        }
    }
}

impl ConfigDocument {
    /// Builds a fresh model from the document.
    ///
    /// Values go through the model's setters, so `defaultRoomId = ""` loads
    /// as absent.  Project entries with an empty id are skipped; a repeated
    /// id keeps the last entry.
    pub fn into_model(self) -> ConfigurationModel {
        let section = self.hipchat;
        let mut model = ConfigurationModel::new();
        model.set_api_url(section.api_url);
        model.set_api_token(section.api_token);
        model.set_default_room_id(section.default_room_id);
        model.set_notify_status(section.notify);
        model.set_disabled_status(section.disabled);
        for entry in section.projects {
            match ProjectOverride::new(entry.project_id, entry.room_id, entry.notify) {
                Ok(project) => {
                    model.set_project_configuration(project);
                }
                Err(e) => warn!("skipping project override in config file: {e}"),
            }
        }
        model
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
