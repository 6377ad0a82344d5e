/// Acceptance tests for the clusto CLI
///
/// Every command runs in a fresh temp directory with XDG_CONFIG_HOME pointed
/// into it, so no clusto.toml from the developer's machine is picked up.
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

mod common;

use common::MockClusto;

fn clusto_in(dir: &Path) -> Command {
    let mut cmd = Command::new(std::env!("CARGO_BIN_EXE_clusto"));
    cmd.current_dir(dir)
        .env("XDG_CONFIG_HOME", dir.join("xdg"))
        .env_remove("CLUSTO_URL")
        .env_remove("CLUSTO_AUTH")
        .env_remove("CLUSTO_CONFIG")
        .env_remove("CLUSTO_LOG_LEVEL")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_config_generate_is_valid_toml() {
    let temp = TempDir::new().unwrap();

    let output = clusto_in(temp.path())
        .args(["config", "generate"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let generated = temp.path().join("generated.toml");
    fs::write(&generated, &output.stdout).unwrap();

    clusto_in(temp.path())
        .args(["config", "validate", generated.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration file is valid"))
        .stdout(predicate::str::contains("http://clusto.example.com:9996"));
}

#[test]
fn test_config_validate_rejects_bad_auth() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("bad.toml");
    fs::write(&path, "url = \"http://clusto:9996\"\nauth = \"no-colon\"\n").unwrap();

    clusto_in(temp.path())
        .args(["config", "validate", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("user:password"));
}

#[test]
fn test_config_show_masks_password() {
    let temp = TempDir::new().unwrap();

    clusto_in(temp.path())
        .args(["config", "show"])
        .args(["--url", "http://clusto:9996", "--auth", "admin:secret"])
        .assert()
        .success()
        .stdout(predicate::str::contains("admin:********"))
        .stdout(predicate::str::contains("secret").not());
}

#[test]
fn test_discovered_config_supplies_url() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("clusto.toml"),
        "url = \"http://from-file:9996\"\n",
    )
    .unwrap();
    let nested = temp.path().join("a").join("b");
    fs::create_dir_all(&nested).unwrap();

    clusto_in(&nested)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("http://from-file:9996"));

    // Command line wins over the file
    clusto_in(&nested)
        .args(["config", "show", "--url", "http://from-flag:9996"])
        .assert()
        .success()
        .stdout(predicate::str::contains("http://from-flag:9996"));
}

#[test]
fn test_missing_url_is_reported() {
    let temp = TempDir::new().unwrap();

    clusto_in(temp.path())
        .args(["show", "web1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no clusto URL configured"));
}

#[tokio::test]
async fn test_get_prints_entity_paths() {
    let mock = MockClusto::start().await;
    mock.get_json("/query/get", json!(["/server/web1", "/appliance/web1"]));
    let url = mock.url.clone();

    // The CLI blocks, the mock server needs the runtime
    tokio::task::spawn_blocking(move || {
        let temp = TempDir::new().unwrap();
        clusto_in(temp.path())
            .args(["get", "web1", "--url", url.as_str()])
            .assert()
            .success()
            .stdout("/server/web1\n/appliance/web1\n");
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_show_not_found_fails() {
    let mock = MockClusto::start().await;
    mock.route("GET", "/query/get_by_name", 404, "");
    let url = mock.url.clone();

    tokio::task::spawn_blocking(move || {
        let temp = TempDir::new().unwrap();
        clusto_in(temp.path())
            .env("CLUSTO_URL", url.as_str())
            .args(["show", "web9"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("web9 does not exist!"));
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_attrs_json_output() {
    let mock = MockClusto::start().await;
    mock.get_json(
        "/query/get_by_name",
        json!({
            "object": "/server/web1",
            "attrs": [
                {"key": "ip", "subkey": "ipstring", "value": "10.0.0.5"},
                {"key": "system", "subkey": "serial", "value": "ABC123"}
            ]
        }),
    );
    let url = mock.url.clone();

    let stdout = tokio::task::spawn_blocking(move || {
        let temp = TempDir::new().unwrap();
        let output = clusto_in(temp.path())
            .args(["attrs", "web1", "--key", "ip", "--json", "--url", url.as_str()])
            .output()
            .unwrap();
        assert!(output.status.success());
        output.stdout
    })
    .await
    .unwrap();

    let attrs: serde_json::Value = serde_json::from_slice(&stdout).unwrap();
    assert_eq!(attrs.as_array().unwrap().len(), 1);
    assert_eq!(attrs[0]["value"], json!("10.0.0.5"));
    assert_eq!(mock.request_count(), 1);
}

#[tokio::test]
async fn test_attrs_value_filter_matches_int_attribute() {
    let mock = MockClusto::start().await;
    mock.get_json(
        "/query/get_by_name",
        json!({
            "object": "/server/web1",
            "attrs": [
                {"key": "rack", "subkey": "unit", "value": 12, "datatype": "int"},
                {"key": "rack", "subkey": "row", "value": "12"}
            ]
        }),
    );
    let url = mock.url.clone();

    let stdout = tokio::task::spawn_blocking(move || {
        let temp = TempDir::new().unwrap();
        let output = clusto_in(temp.path())
            .args(["attrs", "web1", "--key", "rack", "--value", "12", "--json"])
            .args(["--url", url.as_str()])
            .output()
            .unwrap();
        assert!(output.status.success());
        output.stdout
    })
    .await
    .unwrap();

    let attrs: serde_json::Value = serde_json::from_slice(&stdout).unwrap();
    assert_eq!(attrs.as_array().unwrap().len(), 1);
    assert_eq!(attrs[0]["subkey"], json!("unit"));
}
