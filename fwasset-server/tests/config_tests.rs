//! Tests for server configuration loading

use fwasset_server::config::{ServerConfig, ASSET_ROOT_ENV, BIND_ENV, EXPECTED_COUNT_ENV, MANIFEST_ENV};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn test_default_config() {
    let config = ServerConfig::default();
    assert_eq!(config.bind.port(), 9180);
    assert_eq!(config.manifest_name, "FILE_LIST");
    assert!(config.asset_root.is_none());
    assert!(config.manifest_path.is_none());
    assert!(config.expected_count.is_none());
}

#[test]
fn test_from_file_fills_missing_fields_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("server.json");
    fs::write(&path, r#"{ "asset_root": "/srv/www", "expected_count": 54 }"#).unwrap();

    let config = ServerConfig::from_file(&path).unwrap();
    assert_eq!(config.asset_root, Some(PathBuf::from("/srv/www")));
    assert_eq!(config.expected_count, Some(54));
    assert_eq!(config.bind, ServerConfig::default().bind);
    assert_eq!(config.manifest_name, "FILE_LIST");
}

#[test]
fn test_from_file_rejects_bad_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("server.json");
    fs::write(&path, "{ asset_root: ").unwrap();

    let err = ServerConfig::from_file(&path).unwrap_err();
    assert!(err.to_string().contains("failed to parse config"));
}

#[test]
fn test_from_file_missing() {
    let dir = tempfile::tempdir().unwrap();
    assert!(ServerConfig::from_file(&dir.path().join("nope.json")).is_err());
}

#[test]
fn test_env_overrides() {
    let mut config = ServerConfig::default();
    config
        .apply_env(lookup(&[
            (BIND_ENV, "127.0.0.1:8080"),
            (ASSET_ROOT_ENV, "dist/spa"),
            (MANIFEST_ENV, "fileList.h"),
            (EXPECTED_COUNT_ENV, "54"),
        ]))
        .unwrap();

    assert_eq!(config.bind.to_string(), "127.0.0.1:8080");
    assert_eq!(config.asset_root, Some(PathBuf::from("dist/spa")));
    assert_eq!(config.manifest_path, Some(PathBuf::from("fileList.h")));
    assert_eq!(config.expected_count, Some(54));
}

#[test]
fn test_empty_env_value_clears_setting() {
    let mut config = ServerConfig {
        asset_root: Some(PathBuf::from("/srv/www")),
        expected_count: Some(10),
        ..ServerConfig::default()
    };
    config
        .apply_env(lookup(&[(ASSET_ROOT_ENV, ""), (EXPECTED_COUNT_ENV, " ")]))
        .unwrap();

    assert!(config.asset_root.is_none());
    assert!(config.expected_count.is_none());
}

#[test]
fn test_invalid_env_values_are_errors() {
    let mut config = ServerConfig::default();
    assert!(config.apply_env(lookup(&[(BIND_ENV, "not-an-address")])).is_err());

    let mut config = ServerConfig::default();
    let err = config
        .apply_env(lookup(&[(EXPECTED_COUNT_ENV, "many")]))
        .unwrap_err();
    assert!(err.to_string().contains(EXPECTED_COUNT_ENV));
}
