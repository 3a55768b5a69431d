//! Tests for the file-backed project and credential stores

use std::fs;
use std::sync::Arc;

use tempfile::TempDir;

use skyctl::domain::{Credentials, ProjectConfig};
use skyctl::infrastructure::traits::{
    ConfigStore, CredentialStore, FileCredentialStore, JsonConfigStore, RealFileSystem,
};

fn project_store(dir: &TempDir) -> JsonConfigStore {
    JsonConfigStore::new(Arc::new(RealFileSystem), dir.path(), "skyctl.json")
}

fn credentials() -> Credentials {
    Credentials {
        server_url: "https://admin.test".to_string(),
        access_token: "access".to_string(),
        refresh_token: "refresh".to_string(),
        email: None,
    }
}

// ============================================================
// Project file
// ============================================================

#[test]
fn given_written_config_when_reading_then_round_trips() {
    let temp = TempDir::new().unwrap();
    let store = project_store(&temp);
    let mut config = ProjectConfig::new();
    config.set_default("acme");

    store.write(&config).unwrap();

    assert_eq!(store.read(), config);
}

#[test]
fn given_written_config_when_inspecting_file_then_is_pretty_json_with_projects_key() {
    let temp = TempDir::new().unwrap();
    let store = project_store(&temp);
    let mut config = ProjectConfig::new();
    config.set_default("acme");

    store.write(&config).unwrap();

    let content = fs::read_to_string(temp.path().join("skyctl.json")).unwrap();
    assert!(content.contains('\n'), "should be pretty printed: {}", content);
    let value: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(value, serde_json::json!({ "projects": { "default": "acme" } }));
}

#[test]
fn given_missing_file_when_reading_then_returns_empty_config() {
    let temp = TempDir::new().unwrap();

    let config = project_store(&temp).read();

    assert!(config.is_empty());
}

#[test]
fn given_corrupt_file_when_reading_then_returns_empty_config() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("skyctl.json"), "{ not json").unwrap();

    let config = project_store(&temp).read();

    assert!(config.is_empty());
}

#[test]
fn given_file_without_projects_key_when_reading_then_returns_empty_config() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("skyctl.json"), "{}").unwrap();

    let config = project_store(&temp).read();

    assert!(config.is_empty());
}

// ============================================================
// Credentials file
// ============================================================

#[test]
fn given_nested_path_when_saving_credentials_then_creates_parent_and_loads_back() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("data").join("skyctl").join("credentials.json");
    let store = FileCredentialStore::new(Arc::new(RealFileSystem), &path);

    store.save(&credentials()).unwrap();

    assert!(path.exists());
    assert_eq!(store.load().unwrap(), Some(credentials()));
}

#[test]
fn given_no_file_when_loading_credentials_then_none() {
    let temp = TempDir::new().unwrap();
    let store = FileCredentialStore::new(Arc::new(RealFileSystem), temp.path().join("c.json"));

    assert_eq!(store.load().unwrap(), None);
}

#[test]
fn given_corrupt_credentials_when_loading_then_invalid_data_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("c.json");
    fs::write(&path, "garbage").unwrap();
    let store = FileCredentialStore::new(Arc::new(RealFileSystem), &path);

    let err = store.load().unwrap_err();

    assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
}

#[test]
fn given_saved_credentials_when_clearing_twice_then_file_is_gone() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("c.json");
    let store = FileCredentialStore::new(Arc::new(RealFileSystem), &path);
    store.save(&credentials()).unwrap();

    store.clear().unwrap();
    store.clear().unwrap();

    assert!(!path.exists());
}
