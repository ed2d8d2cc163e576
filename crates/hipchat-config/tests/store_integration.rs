//! Integration tests for configuration file persistence.
//!
//! These tests drive [`ConfigurationStore`] through its public API against a
//! real file in a temporary directory.  They verify:
//!
//! - First run: `initialise()` writes a file holding the defaults.
//! - Existing file: `initialise()` loads it and leaves its bytes alone.
//! - Migration: a v0.1 file (legacy `roomId` key) is rewritten once, and the
//!   room value survives a second `initialise()`.
//! - Round trip: save then load into a fresh model reproduces every field,
//!   including project overrides.

use hipchat_config::application::shared_configuration::SharedConfiguration;
use hipchat_config::infrastructure::storage::document::ConfigDocument;
use hipchat_config::infrastructure::storage::{ConfigurationStore, InitialiseOutcome};
use hipchat_core::{ConfigurationModel, HostPaths, ProjectOverride, DEFAULT_API_URL};
use tempfile::TempDir;

fn store_in(dir: &TempDir) -> ConfigurationStore {
    ConfigurationStore::new(&HostPaths::new(dir.path()), SharedConfiguration::default())
}

fn parse_file(store: &ConfigurationStore) -> ConfigDocument {
    let text = std::fs::read_to_string(store.path()).expect("config file readable");
    toml::from_str(&text).expect("config file is valid TOML")
}

// ── First-run bootstrap ───────────────────────────────────────────────────────

#[test]
fn test_config_file_gets_created_when_none_exists() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    assert!(!store.path().exists());

    // Act
    let outcome = store.initialise();

    // Assert: the file exists and holds the defaults
    assert_eq!(outcome, InitialiseOutcome::Created);
    let doc = parse_file(&store);
    assert_eq!(doc.hipchat.api_url, DEFAULT_API_URL);
    assert_eq!(doc.hipchat.api_token, None);
    assert_eq!(doc.hipchat.default_room_id, None);
    assert!(!doc.hipchat.notify);
    assert!(!doc.hipchat.disabled);
    let text = std::fs::read_to_string(store.path()).unwrap();
    assert!(!text.contains("apiToken"));
    assert!(!text.contains("defaultRoomId"));

    // And the in-memory values are still the defaults
    assert_eq!(store.configuration().snapshot(), ConfigurationModel::default());
}

#[test]
fn test_changes_saved_after_bootstrap_reach_the_file() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    store.initialise();

    // Act
    store.configuration().update(|m| {
        m.set_api_url("http://example.com/");
        m.set_api_token(Some("admin_token".to_string()));
        m.set_default_room_id(Some("room_id".to_string()));
        m.set_notify_status(true);
        m.set_disabled_status(false);
    });
    store.save().unwrap();

    // Assert
    let doc = parse_file(&store);
    assert_eq!(doc.hipchat.api_url, "http://example.com/");
    assert_eq!(doc.hipchat.api_token.as_deref(), Some("admin_token"));
    assert_eq!(doc.hipchat.default_room_id.as_deref(), Some("room_id"));
    assert!(doc.hipchat.notify);
    assert!(!doc.hipchat.disabled);
    let text = std::fs::read_to_string(store.path()).unwrap();
    assert!(text.contains("notify = true"));
    assert!(text.contains("disabled = false"));
}

// ── Existing file ─────────────────────────────────────────────────────────────

#[test]
fn test_configuration_gets_read_correctly_from_file_upon_initialisation() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    let content = "[hipchat]\n\
                   apiToken = \"admin_token\"\n\
                   apiUrl = \"http://example.com/\"\n\
                   defaultRoomId = \"room_id\"\n\
                   notify = true\n\
                   disabled = false\n";
    std::fs::write(store.path(), content).unwrap();

    // Act
    let outcome = store.initialise();

    // Assert: the file is untouched
    assert_eq!(outcome, InitialiseOutcome::Loaded { migrated: false });
    assert_eq!(std::fs::read_to_string(store.path()).unwrap(), content);

    // And the loaded configuration matches it
    let model = store.configuration().snapshot();
    assert_eq!(model.api_url(), "http://example.com/");
    assert_eq!(model.api_token(), Some("admin_token"));
    assert_eq!(model.default_room_id(), Some("room_id"));
    assert!(model.notify_status());
    assert!(!model.disabled_status());
}

#[test]
fn test_empty_default_room_in_file_loads_as_absent() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    std::fs::write(store.path(), "[hipchat]\ndefaultRoomId = \"\"\n").unwrap();

    store.initialise();

    assert_eq!(store.configuration().read().default_room_id(), None);
}

// ── Migration ─────────────────────────────────────────────────────────────────

#[test]
fn test_configuration_gets_upgraded_from_v0_1_to_v0_2() {
    // Arrange: roomId is the legacy key
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    let v0_1 = "[hipchat]\n\
                apiToken = \"token\"\n\
                apiUrl = \"https://api.hipchat.com/v2/\"\n\
                disabled = false\n\
                notify = true\n\
                roomId = \"12345\"\n";
    std::fs::write(store.path(), v0_1).unwrap();

    // Act
    let outcome = store.initialise();

    // Assert: the file was upgraded
    assert_eq!(outcome, InitialiseOutcome::Loaded { migrated: true });
    let doc = parse_file(&store);
    assert_eq!(doc.hipchat.default_room_id.as_deref(), Some("12345"));
    assert_eq!(store.configuration().read().default_room_id(), Some("12345"));

    // Re-read the config from disk
    let upgraded = std::fs::read_to_string(store.path()).unwrap();
    assert_eq!(store.initialise(), InitialiseOutcome::Loaded { migrated: false });
    assert_eq!(store.configuration().read().default_room_id(), Some("12345"));
    assert_eq!(std::fs::read_to_string(store.path()).unwrap(), upgraded);
}

// ── Round trip and project overrides ──────────────────────────────────────────

#[test]
fn test_project_configuration() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let writer = store_in(&dir);
    writer.configuration().update(|m| {
        m.set_project_configuration(ProjectOverride::new("project1", "room1", true).unwrap());
        m.set_project_configuration(ProjectOverride::new("project2", "room2", false).unwrap());
    });
    writer.save().unwrap();

    // Act: load into a fresh model
    let fresh = SharedConfiguration::default();
    assert!(fresh.read().project_configuration("project1").is_none());
    assert!(fresh.read().project_configuration("project2").is_none());
    let reader = ConfigurationStore::new(&HostPaths::new(dir.path()), fresh.clone());
    reader.load().unwrap();

    // Assert
    let model = fresh.snapshot();
    assert_eq!(model.project_configurations().count(), 2);
    let project1 = model.project_configuration("project1").unwrap();
    assert_eq!(project1.room_id(), "room1");
    assert!(project1.notify_status());
    let project2 = model.project_configuration("project2").unwrap();
    assert_eq!(project2.room_id(), "room2");
    assert!(!project2.notify_status());
    assert!(model.project_configuration("project3").is_none());
}

#[test]
fn test_project_overrides_survive_initialise_without_migration() {
    // Override entries carry a roomId key of their own; it must not be
    // mistaken for the legacy default-room key.
    let dir = tempfile::tempdir().unwrap();
    let writer = store_in(&dir);
    writer.configuration().update(|m| {
        m.set_default_room_id(Some("lobby".to_string()));
        m.set_project_configuration(ProjectOverride::new("project1", "room1", true).unwrap());
    });
    writer.save().unwrap();

    let reader = store_in(&dir);
    assert_eq!(reader.initialise(), InitialiseOutcome::Loaded { migrated: false });

    let model = reader.configuration().snapshot();
    assert_eq!(model.default_room_id(), Some("lobby"));
    assert_eq!(model.project_configuration("project1").unwrap().room_id(), "room1");
}

#[test]
fn test_save_then_load_reproduces_model() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let writer = store_in(&dir);
    writer.configuration().update(|m| {
        m.set_api_url("https://hipchat.example.com/v2/");
        m.set_api_token(Some("token".to_string()));
        m.set_default_room_id(Some("42".to_string()));
        m.set_notify_status(true);
        m.set_disabled_status(true);
        m.set_project_configuration(ProjectOverride::new("p", "r", false).unwrap());
    });
    writer.save().unwrap();

    // Act
    let reader = store_in(&dir);
    reader.load().unwrap();

    // Assert
    assert_eq!(reader.configuration().snapshot(), writer.configuration().snapshot());
}
