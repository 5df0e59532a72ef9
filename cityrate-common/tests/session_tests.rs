//! Tests for the persisted login session

use cityrate_common::session::SessionStore;
use tempfile::TempDir;

#[test]
fn test_load_without_file_returns_none() {
    let dir = TempDir::new().unwrap();
    let store = SessionStore::new(dir.path().join("session.toml"));

    assert_eq!(store.load().unwrap(), None);
}

#[test]
fn test_save_then_load() {
    let dir = TempDir::new().unwrap();
    let store = SessionStore::new(dir.path().join("session.toml"));

    store.save("user-123").unwrap();

    assert_eq!(store.load().unwrap(), Some("user-123".to_string()));
}

#[test]
fn test_save_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let store = SessionStore::new(dir.path().join("nested/deeper/session.toml"));

    store.save("abc").unwrap();

    assert!(store.path().exists());
}

#[test]
fn test_save_overwrites_and_leaves_no_temp_file() {
    let dir = TempDir::new().unwrap();
    let store = SessionStore::new(dir.path().join("session.toml"));

    store.save("first").unwrap();
    store.save("second").unwrap();

    assert_eq!(store.load().unwrap(), Some("second".to_string()));
    assert!(!dir.path().join("session.toml.tmp").exists());
}

#[test]
fn test_clear_removes_session() {
    let dir = TempDir::new().unwrap();
    let store = SessionStore::new(dir.path().join("session.toml"));

    store.save("user").unwrap();
    store.clear().unwrap();

    assert_eq!(store.load().unwrap(), None);
    // Clearing twice is fine
    store.clear().unwrap();
}

#[test]
fn test_blank_user_id_reads_as_logged_out() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.toml");
    std::fs::write(&path, "user_id = \"   \"\n").unwrap();

    let store = SessionStore::new(path);
    assert_eq!(store.load().unwrap(), None);
}

#[test]
fn test_corrupt_session_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.toml");
    std::fs::write(&path, "user_id = = nope").unwrap();

    let store = SessionStore::new(path);
    assert!(store.load().is_err());
}

#[cfg(unix)]
#[test]
fn test_session_file_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let store = SessionStore::new(dir.path().join("session.toml"));
    store.save("secret-id").unwrap();

    let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}
