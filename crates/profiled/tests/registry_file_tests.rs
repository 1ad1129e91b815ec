// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Integration tests for loading registry files from disk

use std::path::PathBuf;
use std::time::Duration;

use timing_aspect_profiled::{ConfigError, Level, ProfiledRegistry};

fn write_temp(name: &str, contents: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("timing-aspect-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_load_yaml_file() {
    let path = write_temp(
        "registry.yaml",
        r#"
methods:
  - type: billing::InvoiceService
    method: issue
    profiled:
      tag: "invoice.issue"
      logger: billing.timing
      level: WARN
      logFailuresSeparately: true
"#,
    );

    let registry = ProfiledRegistry::load(&path).unwrap();
    let config = registry.lookup("billing::InvoiceService", "issue").unwrap();

    assert_eq!(config.logger, "billing.timing");
    assert_eq!(config.severity(), Level::Warn);
    assert!(config.log_failures_separately);
}

#[test]
fn test_load_json_file() {
    let path = write_temp(
        "registry.json",
        r#"{"methods": [{"type": "Orders", "method": "place", "profiled": {"tag": "orders", "timeThreshold": 10}}]}"#,
    );

    let registry = ProfiledRegistry::load(&path).unwrap();
    let config = registry.lookup("Orders", "place").unwrap();

    assert_eq!(config.time_threshold, Duration::from_millis(10));
}

#[test]
fn test_load_unsupported_extension() {
    let path = write_temp("registry.toml", "methods = []");

    let err = ProfiledRegistry::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedFormat(ext) if ext == "toml"));
}

#[test]
fn test_load_missing_file() {
    let err = ProfiledRegistry::load("/definitely/not/here.yaml").unwrap_err();

    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("not/here.yaml"));
}

#[test]
fn test_load_malformed_yaml() {
    let path = write_temp("broken.yml", "methods: [ {type: Orders, method: ");

    let err = ProfiledRegistry::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Yaml(_)));
}
