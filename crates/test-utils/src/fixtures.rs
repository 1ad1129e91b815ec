// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Sample profiling configurations and registry files

use std::time::Duration;
use timing_aspect_profiled::ProfiledConfig;

/// Sample configs for testing
pub struct ProfiledFixtures;

impl ProfiledFixtures {
    /// Plain tag, no expressions
    pub fn plain(tag: &str) -> ProfiledConfig {
        ProfiledConfig::new(tag).with_evaluate_expressions(false)
    }

    /// Tag and message built from the first argument and the return value
    pub fn with_expressions() -> ProfiledConfig {
        ProfiledConfig::new("orders.{$0}").with_message("result={$return}")
    }

    /// `.success` / `.failure` suffixes
    pub fn failures_separately(tag: &str) -> ProfiledConfig {
        ProfiledConfig::new(tag).with_log_failures_separately(true)
    }

    /// Threshold without suffixes: fast calls are dropped
    pub fn threshold(tag: &str, millis: u64) -> ProfiledConfig {
        ProfiledConfig::new(tag).with_time_threshold(Duration::from_millis(millis))
    }

    /// Threshold with `.normal` / `.slow` suffixes
    pub fn threshold_with_suffixes(tag: &str, millis: u64) -> ProfiledConfig {
        Self::threshold(tag, millis).with_normal_and_slow_suffixes(true)
    }

    /// Registry file covering an explicit entry and a bare declaration
    pub const fn registry_yaml() -> &'static str {
        r#"methods:
  - type: billing::InvoiceService
    method: issue
    profiled:
      tag: "invoice.issue.{$0}"
      level: DEBUG
      timeThreshold: 250
  - type: billing::InvoiceService
    method: void
"#
    }

    /// Same table as [`registry_yaml`](Self::registry_yaml), in JSON
    pub const fn registry_json() -> &'static str {
        r#"{
  "methods": [
    {
      "type": "billing::InvoiceService",
      "method": "issue",
      "profiled": { "tag": "invoice.issue.{$0}", "level": "DEBUG", "timeThreshold": 250 }
    },
    { "type": "billing::InvoiceService", "method": "void" }
  ]
}"#
    }
}
