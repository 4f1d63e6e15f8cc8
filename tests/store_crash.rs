//! Crash safety tests
//!
//! A crash between the temp-file write and the rename leaves an orphaned
//! `<resource>.json.tmp`. Readers must then see either NotFound (first
//! write) or the previously committed value (overwrite), never the
//! interrupted one.
//!
//! Two ways of producing that state:
//! - planting the `.tmp` file by hand
//! - running the `folio` binary with `FOLIO_CRASH_POINT` so it aborts

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use folio::crash_point::{points, CRASH_POINT_ENV};
use folio::Store;
use serde_json::{json, Value};
use tempfile::TempDir;

// =============================================================================
// Test Utilities
// =============================================================================

fn run_folio(dir: &Path, crash_point: Option<&str>, args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_folio"));
    cmd.arg("--dir").arg(dir).args(args);
    cmd.env_remove(CRASH_POINT_ENV);
    if let Some(point) = crash_point {
        cmd.env(CRASH_POINT_ENV, point);
    }
    cmd.output().expect("Failed to run folio binary")
}

// =============================================================================
// Planted temp files
// =============================================================================

#[test]
fn test_orphan_tmp_on_first_write_reads_not_found() {
    let temp = TempDir::new().unwrap();
    let store = Store::open(temp.path()).unwrap();

    fs::create_dir_all(temp.path().join("users")).unwrap();
    fs::write(
        temp.path().join("users/John.json.tmp"),
        "{\n\t\"Name\": \"Jo",
    )
    .unwrap();

    let err = store.read::<Value>("users", "John").unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_orphan_tmp_on_overwrite_reads_prior_value() {
    let temp = TempDir::new().unwrap();
    let store = Store::open(temp.path()).unwrap();

    store.write("users", "John", &json!({"Age": "23"})).unwrap();
    fs::write(temp.path().join("users/John.json.tmp"), "{\"Age\": \"2").unwrap();

    let read: Value = store.read("users", "John").unwrap();
    assert_eq!(read, json!({"Age": "23"}));
}

#[test]
fn test_orphan_tmp_not_enumerated_and_not_cleaned() {
    let temp = TempDir::new().unwrap();
    let store = Store::open(temp.path()).unwrap();

    store.write("users", "John", &json!({"Name": "John"})).unwrap();
    let orphan = temp.path().join("users/Bon.json.tmp");
    fs::write(&orphan, "{\"Name\": ").unwrap();

    assert_eq!(store.read_all("users").unwrap().len(), 1);
    let streamed: Vec<Value> = store.stream_all("users").unwrap().collect();
    assert_eq!(streamed.len(), 1);

    // A later write to the same resource replaces the orphan
    assert!(orphan.exists());
    store.write("users", "Bon", &json!({"Name": "Bon"})).unwrap();
    assert!(!orphan.exists());
    assert_eq!(store.read_all("users").unwrap().len(), 2);
}

// =============================================================================
// Injected crashes
// =============================================================================

#[test]
fn test_crash_before_rename_first_write() {
    let temp = TempDir::new().unwrap();

    let output = run_folio(
        temp.path(),
        Some(points::STORE_BEFORE_RENAME),
        &["write", "users", "John", "--value", r#"{"Name":"John"}"#],
    );
    assert!(!output.status.success(), "process should have aborted");

    // The temp file holds the complete new value, the record does not exist
    let tmp = temp.path().join("users/John.json.tmp");
    assert!(tmp.exists());
    let planted: Value = serde_json::from_str(&fs::read_to_string(&tmp).unwrap()).unwrap();
    assert_eq!(planted["Name"], "John");

    let store = Store::open(temp.path()).unwrap();
    assert!(store.read::<Value>("users", "John").unwrap_err().is_not_found());
}

#[test]
fn test_crash_before_rename_overwrite() {
    let temp = TempDir::new().unwrap();

    let output = run_folio(
        temp.path(),
        None,
        &["write", "users", "John", "--value", r#"{"Age":"23"}"#],
    );
    assert!(output.status.success());

    let output = run_folio(
        temp.path(),
        Some(points::STORE_BEFORE_RENAME),
        &["write", "users", "John", "--value", r#"{"Age":"24"}"#],
    );
    assert!(!output.status.success());

    let store = Store::open(temp.path()).unwrap();
    let read: Value = store.read("users", "John").unwrap();
    assert_eq!(read["Age"], "23");
}

#[test]
fn test_crash_before_temp_write_leaves_nothing() {
    let temp = TempDir::new().unwrap();

    let output = run_folio(
        temp.path(),
        Some(points::STORE_BEFORE_TEMP_WRITE),
        &["write", "users", "John", "--value", "{}"],
    );
    assert!(!output.status.success());

    assert!(!temp.path().join("users/John.json.tmp").exists());
    assert!(!temp.path().join("users/John.json").exists());
}

#[test]
fn test_crash_after_rename_is_committed() {
    let temp = TempDir::new().unwrap();

    let output = run_folio(
        temp.path(),
        Some(points::STORE_AFTER_RENAME),
        &["write", "users", "John", "--value", r#"{"Name":"John"}"#],
    );
    assert!(!output.status.success());

    let store = Store::open(temp.path()).unwrap();
    let read: Value = store.read("users", "John").unwrap();
    assert_eq!(read["Name"], "John");
    assert!(!temp.path().join("users/John.json.tmp").exists());
}

#[test]
fn test_cli_round_trip_without_crash() {
    let temp = TempDir::new().unwrap();

    let output = run_folio(temp.path(), None, &["seed"]);
    assert!(output.status.success());

    let output = run_folio(temp.path(), None, &["read", "users", "John"]);
    assert!(output.status.success());
    let response: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(response["status"], "ok");
    assert_eq!(response["data"]["Company"], "Myrl Tech");

    let output = run_folio(temp.path(), None, &["read", "users", "Nobody"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("FOLIO_NOT_FOUND"));
}
