//! Request surface of the settings page.
//!
//! The host delivers each request as a flat key/value bag rather than a single
//! command, so one request can both save the settings and change the enabled
//! status.  [`RequestRule::ORDERED`] lists the rules in the order they are
//! evaluated; each rule fires when its trigger key is present and reads its
//! inputs into a typed struct before anything is mutated.
//!
//! | Order | Trigger   | Input              | Persists |
//! |-------|-----------|--------------------|----------|
//! | 1     | `project` | [`ProjectEdit`]    | no       |
//! | 2     | `edit`    | [`SettingsEdit`]   | yes      |
//! | 3     | `test`    | [`ConnectivityProbe`] | no    |
//! | 4     | `action`  | [`StatusChange`]   | yes      |

use std::collections::HashMap;
use std::fmt;

use http::StatusCode;
use thiserror::Error;

use hipchat_core::domain::keys::{
    ACTION_ENABLE, ACTION_PARAMETER, API_TOKEN_KEY, API_URL_KEY, DEFAULT_ROOM_ID_KEY,
    EDIT_PARAMETER, NOTIFY_STATUS_KEY, PROJECT_ID_KEY, PROJECT_PARAMETER, ROOM_ID_KEY,
    TEST_PARAMETER,
};
use hipchat_core::{ConfigurationModel, ProjectOverride};

use crate::application::check_connectivity::ApiEndpoint;

/// Error raised when a request carries values a rule cannot apply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("{rule} request has no API URL")]
    MissingApiUrl { rule: RequestRule },
}

// ── Request bag ───────────────────────────────────────────────────────────────

/// One incoming request: an unordered set of string parameters.
///
/// Inserting a key that is already present overwrites its value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigRequest {
    params: HashMap<String, String>,
}

impl ConfigRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses an `application/x-www-form-urlencoded` string such as
    /// `edit=1&apiUrl=https%3A%2F%2Fexample.com%2F`.
    pub fn from_query(query: &str) -> Self {
        url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    fn get_owned(&self, key: &str) -> Option<String> {
        self.get(key).map(str::to_string)
    }

    /// A boolean parameter: `true` iff the value is `true` in any ASCII case.
    fn flag(&self, key: &str) -> bool {
        parse_flag(self.get(key))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ConfigRequest {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut request = ConfigRequest::new();
        for (key, value) in iter {
            request.insert(key, value);
        }
        request
    }
}

/// Parses a form checkbox value.  Absent and anything other than `true`
/// (case-insensitive) is `false`.
pub fn parse_flag(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

// ── Rules ─────────────────────────────────────────────────────────────────────

/// One condition→action pair of the request dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestRule {
    /// Create or update a project override.
    EditProject,
    /// Overwrite the global settings and save.
    EditSettings,
    /// Apply the submitted endpoint and token, then test them.
    TestConnectivity,
    /// Enable or disable the plugin and save.
    ChangeStatus,
}

impl RequestRule {
    /// Evaluation order.  Every rule is checked on every request.
    pub const ORDERED: [RequestRule; 4] = [
        RequestRule::EditProject,
        RequestRule::EditSettings,
        RequestRule::TestConnectivity,
        RequestRule::ChangeStatus,
    ];

    /// The parameter whose presence fires this rule.
    pub fn trigger_key(self) -> &'static str {
        match self {
            RequestRule::EditProject => PROJECT_PARAMETER,
            RequestRule::EditSettings => EDIT_PARAMETER,
            RequestRule::TestConnectivity => TEST_PARAMETER,
            RequestRule::ChangeStatus => ACTION_PARAMETER,
        }
    }

    pub fn matches(self, request: &ConfigRequest) -> bool {
        request.contains(self.trigger_key())
    }

    /// Whether a successful application of this rule writes the file.
    pub fn persists(self) -> bool {
        matches!(self, RequestRule::EditSettings | RequestRule::ChangeStatus)
    }

    /// Rules that fire for `request`, in evaluation order.
    pub fn matching(request: &ConfigRequest) -> impl Iterator<Item = RequestRule> + '_ {
        Self::ORDERED
            .into_iter()
            .filter(move |rule| rule.matches(request))
    }
}

impl fmt::Display for RequestRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestRule::EditProject => "edit-project",
            RequestRule::EditSettings => "edit-settings",
            RequestRule::TestConnectivity => "test-connectivity",
            RequestRule::ChangeStatus => "change-status",
        };
        f.write_str(name)
    }
}

// ── Rule inputs ───────────────────────────────────────────────────────────────

/// Inputs of [`RequestRule::EditProject`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectEdit {
    pub project_id: Option<String>,
    pub room_id: Option<String>,
    pub notify: bool,
}

impl ProjectEdit {
    pub fn from_request(request: &ConfigRequest) -> Self {
        Self {
            project_id: request.get_owned(PROJECT_ID_KEY),
            room_id: request.get_owned(ROOM_ID_KEY),
            notify: request.flag(NOTIFY_STATUS_KEY),
        }
    }

    /// The override to store, or `None` when the project id or room is
    /// missing or empty.
    pub fn to_override(&self) -> Option<ProjectOverride> {
        let room_id = self.room_id.as_deref().filter(|room| !room.is_empty())?;
        let project_id = self.project_id.as_deref()?;
        ProjectOverride::new(project_id, room_id, self.notify).ok()
    }
}

/// Inputs of [`RequestRule::EditSettings`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsEdit {
    pub api_url: String,
    pub api_token: Option<String>,
    pub default_room_id: Option<String>,
    pub notify: bool,
}

impl SettingsEdit {
    /// # Errors
    ///
    /// Returns [`RequestError::MissingApiUrl`] if `apiUrl` is missing or empty.
    pub fn from_request(request: &ConfigRequest) -> Result<Self, RequestError> {
        let api_url = required_api_url(request, RequestRule::EditSettings)?;
        Ok(Self {
            api_url,
            api_token: request.get_owned(API_TOKEN_KEY),
            default_room_id: request.get_owned(DEFAULT_ROOM_ID_KEY),
            notify: request.flag(NOTIFY_STATUS_KEY),
        })
    }

    pub fn apply_to(&self, model: &mut ConfigurationModel) {
        model.set_api_url(self.api_url.clone());
        model.set_api_token(self.api_token.clone());
        // The model turns an empty room into "no default room".
        model.set_default_room_id(self.default_room_id.clone());
        model.set_notify_status(self.notify);
    }
}

/// Inputs of [`RequestRule::TestConnectivity`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectivityProbe {
    pub endpoint: ApiEndpoint,
}

impl ConnectivityProbe {
    /// # Errors
    ///
    /// Returns [`RequestError::MissingApiUrl`] if `apiUrl` is missing or empty.
    pub fn from_request(request: &ConfigRequest) -> Result<Self, RequestError> {
        let url = required_api_url(request, RequestRule::TestConnectivity)?;
        Ok(Self {
            endpoint: ApiEndpoint {
                url,
                token: request.get_owned(API_TOKEN_KEY),
            },
        })
    }

    pub fn apply_to(&self, model: &mut ConfigurationModel) {
        model.set_api_url(self.endpoint.url.clone());
        model.set_api_token(self.endpoint.token.clone());
    }
}

/// Inputs of [`RequestRule::ChangeStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub disabled: bool,
}

impl StatusChange {
    /// `None` when the request has no `action` parameter.
    pub fn from_request(request: &ConfigRequest) -> Option<Self> {
        request.get(ACTION_PARAMETER).map(|action| Self {
            disabled: action != ACTION_ENABLE,
        })
    }

    pub fn apply_to(self, model: &mut ConfigurationModel) {
        model.set_disabled_status(self.disabled);
    }
}

fn required_api_url(request: &ConfigRequest, rule: RequestRule) -> Result<String, RequestError> {
    request
        .get(API_URL_KEY)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .ok_or(RequestError::MissingApiUrl { rule })
}

// ── Response ──────────────────────────────────────────────────────────────────

/// Where request handling reports back to the host.
///
/// Only the test rule sets a status, and only a successful edit adds a
/// message.  No response body is produced.
pub trait ResponseSink {
    fn set_status(&mut self, status: StatusCode);
    fn add_message(&mut self, key: &str, text: &str);
}

/// In-memory [`ResponseSink`] used by the admin binary and by tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOutcome {
    pub status: Option<StatusCode>,
    pub messages: Vec<(String, String)>,
}

impl RequestOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(&self, key: &str) -> Option<&str> {
        self.messages
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, text)| text.as_str())
    }
}

impl ResponseSink for RequestOutcome {
    fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    fn add_message(&mut self, key: &str, text: &str) {
        self.messages.push((key.to_string(), text.to_string()));
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
