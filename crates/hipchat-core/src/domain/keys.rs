//! Parameter and field names shared by the request surface and the file.
//!
//! The settings page posts a flat key/value form.  The same names are used for
//! the fields of the persisted document so that a value typed into the form
//! ends up under the same name on disk.

/// API endpoint (`https://api.hipchat.com/v2/` by default).
pub const API_URL_KEY: &str = "apiUrl";
/// Admin token used to talk to the API.
pub const API_TOKEN_KEY: &str = "apiToken";
/// Room that receives notifications when no project override applies.
pub const DEFAULT_ROOM_ID_KEY: &str = "defaultRoomId";
/// Name of the default room field in schema v0.1.
pub const DEFAULT_ROOM_ID_KEY_V0_1: &str = "roomId";
/// Whether room members are notified (the HipChat `notify` message flag).
pub const NOTIFY_STATUS_KEY: &str = "notify";
/// Global kill switch; `true` means no notifications are emitted.
pub const DISABLED_STATUS_KEY: &str = "disabled";
/// Room of a project override.
pub const ROOM_ID_KEY: &str = "roomId";
/// Project an override applies to.
pub const PROJECT_ID_KEY: &str = "projectId";

/// Present when the request edits a project override.
pub const PROJECT_PARAMETER: &str = "project";
/// Present when the request saves the global settings.
pub const EDIT_PARAMETER: &str = "edit";
/// Present when the request tests the API credentials.
pub const TEST_PARAMETER: &str = "test";
/// Carries the enable/disable action.
pub const ACTION_PARAMETER: &str = "action";
/// The one `action` value that enables the plugin.
pub const ACTION_ENABLE: &str = "enable";

/// Message key of the acknowledgment recorded after a successful edit.
pub const CONFIGURATION_SAVED_MESSAGE_KEY: &str = "configurationSaved";
/// Text of the acknowledgment recorded after a successful edit.
pub const CONFIGURATION_SAVED_MESSAGE: &str = "Saved";
