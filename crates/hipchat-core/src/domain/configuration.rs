//! The relay's configuration record.
//!
//! [`ConfigurationModel`] holds the global settings (endpoint, token, default
//! room, notify flag, disabled flag) and a map of project id to
//! [`ProjectOverride`].  It is a plain value type: sharing one live instance
//! between the request handler and the notification logic is the job of the
//! `SharedConfiguration` handle in `hipchat-config`.
//!
//! # Accessor rules
//!
//! - Setting the default room to `Some("")` stores `None`.  The settings form
//!   posts an empty string when the field is cleared, and the file must never
//!   contain an empty room id.
//! - Every other setter stores its argument verbatim.  Business validation
//!   (such as "the API URL must not be empty") is the caller's job.
//! - Overrides are keyed by project id.  Inserting an override for a project
//!   that already has one replaces it.

use std::collections::BTreeMap;

use thiserror::Error;

/// Endpoint used until the administrator configures another one.
pub const DEFAULT_API_URL: &str = "https://api.hipchat.com/v2/";

/// Error returned when a [`ProjectOverride`] is built with an empty project id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("project id must not be empty")]
pub struct ProjectIdError;

/// Per-project exception to the global notification target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectOverride {
    project_id: String,
    room_id: String,
    notify_status: bool,
}

impl ProjectOverride {
    /// Creates an override for `project_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectIdError`] if `project_id` is empty.
    pub fn new(
        project_id: impl Into<String>,
        room_id: impl Into<String>,
        notify_status: bool,
    ) -> Result<Self, ProjectIdError> {
        let project_id = project_id.into();
        if project_id.is_empty() {
            return Err(ProjectIdError);
        }
        Ok(Self {
            project_id,
            room_id: room_id.into(),
            notify_status,
        })
    }

    /// The project this override applies to.  Fixed at construction.
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn set_room_id(&mut self, room_id: impl Into<String>) {
        self.room_id = room_id.into();
    }

    pub fn notify_status(&self) -> bool {
        self.notify_status
    }

    pub fn set_notify_status(&mut self, notify_status: bool) {
        self.notify_status = notify_status;
    }
}

/// Where and how a notification for a given project should be sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationTarget<'a> {
    pub room_id: &'a str,
    pub notify: bool,
}

/// The durable configuration record.
///
/// `Default` yields the first-run state: the public HipChat endpoint, no
/// token, no default room, notify off, plugin enabled, no overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationModel {
    api_url: String,
    api_token: Option<String>,
    default_room_id: Option<String>,
    notify_status: bool,
    disabled_status: bool,
    // BTreeMap keeps the file output ordered by project id.
    project_overrides: BTreeMap<String, ProjectOverride>,
}

impl Default for ConfigurationModel {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_token: None,
            default_room_id: None,
            notify_status: false,
            disabled_status: false,
            project_overrides: BTreeMap::new(),
        }
    }
}

impl ConfigurationModel {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Global settings ───────────────────────────────────────────────────────

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn set_api_url(&mut self, api_url: impl Into<String>) {
        self.api_url = api_url.into();
    }

    pub fn api_token(&self) -> Option<&str> {
        self.api_token.as_deref()
    }

    pub fn set_api_token(&mut self, api_token: Option<String>) {
        self.api_token = api_token;
    }

    pub fn default_room_id(&self) -> Option<&str> {
        self.default_room_id.as_deref()
    }

    /// Sets the default room.  `Some("")` is stored as `None`.
    pub fn set_default_room_id(&mut self, default_room_id: Option<String>) {
        self.default_room_id = default_room_id.filter(|id| !id.is_empty());
    }

    pub fn notify_status(&self) -> bool {
        self.notify_status
    }

    pub fn set_notify_status(&mut self, notify_status: bool) {
        self.notify_status = notify_status;
    }

    /// `true` means the plugin must not emit notifications.
    pub fn disabled_status(&self) -> bool {
        self.disabled_status
    }

    pub fn set_disabled_status(&mut self, disabled_status: bool) {
        self.disabled_status = disabled_status;
    }

    // ── Project overrides ─────────────────────────────────────────────────────

    /// Returns the override for `project_id`, if one exists.
    pub fn project_configuration(&self, project_id: &str) -> Option<&ProjectOverride> {
        self.project_overrides.get(project_id)
    }

    /// Inserts `project`, replacing any override with the same project id.
    ///
    /// Returns the replaced override, if there was one.
    pub fn set_project_configuration(&mut self, project: ProjectOverride) -> Option<ProjectOverride> {
        self.project_overrides
            .insert(project.project_id.clone(), project)
    }

    /// Removes and returns the override for `project_id`.
    pub fn remove_project_configuration(&mut self, project_id: &str) -> Option<ProjectOverride> {
        self.project_overrides.remove(project_id)
    }

    /// Iterates over all overrides in project id order.
    pub fn project_configurations(&self) -> impl Iterator<Item = &ProjectOverride> {
        self.project_overrides.values()
    }

    // ── Derived reads ─────────────────────────────────────────────────────────

    /// Resolves the room and notify flag for a build of `project_id`.
    ///
    /// Returns `None` when the plugin is disabled, or when the project has no
    /// override and no default room is configured.
    pub fn notification_target(&self, project_id: &str) -> Option<NotificationTarget<'_>> {
        if self.disabled_status {
            return None;
        }
        match self.project_overrides.get(project_id) {
            Some(project) => Some(NotificationTarget {
                room_id: &project.room_id,
                notify: project.notify_status,
            }),
            None => self.default_room_id.as_deref().map(|room_id| NotificationTarget {
                room_id,
                notify: self.notify_status,
            }),
        }
    }

    /// Copies every field of `other` onto `self`, including the full override
    /// map.  Existing overrides that `other` lacks are dropped.
    pub fn copy_from(&mut self, other: &ConfigurationModel) {
        self.set_api_url(other.api_url.clone());
        self.set_api_token(other.api_token.clone());
        self.set_default_room_id(other.default_room_id.clone());
        self.set_notify_status(other.notify_status);
        self.set_disabled_status(other.disabled_status);
        self.project_overrides.clear();
        for project in other.project_configurations() {
            self.set_project_configuration(project.clone());
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn project(id: &str, room: &str, notify: bool) -> ProjectOverride {
        ProjectOverride::new(id, room, notify).unwrap()
    }

    // ── Defaults ──────────────────────────────────────────────────────────────

    #[test]
    fn test_default_model_uses_public_endpoint() {
        // Arrange / Act
        let model = ConfigurationModel::default();

        // Assert
        assert_eq!(model.api_url(), "https://api.hipchat.com/v2/");
        assert_eq!(model.api_token(), None);
        assert_eq!(model.default_room_id(), None);
        assert!(!model.notify_status());
        assert!(!model.disabled_status());
        assert_eq!(model.project_configurations().count(), 0);
    }

    // ── Accessor rules ────────────────────────────────────────────────────────

    #[test]
    fn test_empty_default_room_is_stored_as_absent() {
        let mut model = ConfigurationModel::new();
        model.set_default_room_id(Some(String::new()));
        assert_eq!(model.default_room_id(), None);
    }

    #[test]
    fn test_non_empty_default_room_is_stored_verbatim() {
        let mut model = ConfigurationModel::new();
        model.set_default_room_id(Some("room_id".to_string()));
        assert_eq!(model.default_room_id(), Some("room_id"));
    }

    #[test]
    fn test_api_token_can_be_cleared() {
        let mut model = ConfigurationModel::new();
        model.set_api_token(Some("admin_token".to_string()));
        model.set_api_token(None);
        assert_eq!(model.api_token(), None);
    }

    #[test]
    fn test_api_url_is_stored_without_validation() {
        // Empty URLs are rejected by the request layer, not the model.
        let mut model = ConfigurationModel::new();
        model.set_api_url("");
        assert_eq!(model.api_url(), "");
    }

    // ── Project overrides ─────────────────────────────────────────────────────

    #[test]
    fn test_project_override_rejects_empty_id() {
        assert_eq!(ProjectOverride::new("", "room1", true), Err(ProjectIdError));
    }

    #[test]
    fn test_unknown_project_resolves_to_none() {
        let mut model = ConfigurationModel::new();
        model.set_project_configuration(project("project1", "room1", true));
        assert!(model.project_configuration("project3").is_none());
    }

    #[test]
    fn test_setting_existing_project_replaces_entry() {
        // Arrange
        let mut model = ConfigurationModel::new();
        model.set_project_configuration(project("project1", "room1", true));

        // Act
        let previous = model.set_project_configuration(project("project1", "room9", false));

        // Assert
        assert_eq!(previous.unwrap().room_id(), "room1");
        assert_eq!(model.project_configurations().count(), 1);
        let stored = model.project_configuration("project1").unwrap();
        assert_eq!(stored.room_id(), "room9");
        assert!(!stored.notify_status());
    }

    #[test]
    fn test_project_configurations_are_ordered_by_id() {
        let mut model = ConfigurationModel::new();
        model.set_project_configuration(project("b", "room-b", false));
        model.set_project_configuration(project("a", "room-a", true));
        let ids: Vec<&str> = model.project_configurations().map(|p| p.project_id()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_remove_project_configuration() {
        let mut model = ConfigurationModel::new();
        model.set_project_configuration(project("project1", "room1", true));
        assert!(model.remove_project_configuration("project1").is_some());
        assert!(model.project_configuration("project1").is_none());
    }

    // ── Notification target ───────────────────────────────────────────────────

    #[test]
    fn test_notification_target_prefers_project_override() {
        // Arrange
        let mut model = ConfigurationModel::new();
        model.set_default_room_id(Some("lobby".to_string()));
        model.set_project_configuration(project("project1", "room1", true));

        // Act
        let target = model.notification_target("project1").unwrap();

        // Assert
        assert_eq!(target.room_id, "room1");
        assert!(target.notify);
    }

    #[test]
    fn test_notification_target_falls_back_to_default_room() {
        let mut model = ConfigurationModel::new();
        model.set_default_room_id(Some("lobby".to_string()));
        model.set_notify_status(true);
        let target = model.notification_target("other").unwrap();
        assert_eq!(target.room_id, "lobby");
        assert!(target.notify);
    }

    #[test]
    fn test_notification_target_is_none_without_any_room() {
        let model = ConfigurationModel::new();
        assert!(model.notification_target("project1").is_none());
    }

    #[test]
    fn test_notification_target_is_none_when_disabled() {
        let mut model = ConfigurationModel::new();
        model.set_default_room_id(Some("lobby".to_string()));
        model.set_project_configuration(project("project1", "room1", true));
        model.set_disabled_status(true);
        assert!(model.notification_target("project1").is_none());
        assert!(model.notification_target("other").is_none());
    }

    // ── copy_from ─────────────────────────────────────────────────────────────

    #[test]
    fn test_copy_from_transfers_every_field() {
        // Arrange
        let mut source = ConfigurationModel::new();
        source.set_api_url("http://example.com/");
        source.set_api_token(Some("admin_token".to_string()));
        source.set_default_room_id(Some("room_id".to_string()));
        source.set_notify_status(true);
        source.set_disabled_status(true);
        source.set_project_configuration(project("project1", "room1", true));

        let mut target = ConfigurationModel::new();
        target.set_project_configuration(project("stale", "old", false));

        // Act
        target.copy_from(&source);

        // Assert
        assert_eq!(target, source);
        assert!(target.project_configuration("stale").is_none());
    }
}
