// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Profiled method registry
//!
//! Registration table mapping `(declaring type, method)` to the
//! [`ProfiledConfig`] that should time it. Tables are built in code or loaded
//! from YAML / JSON files:
//!
//! ```yaml
//! methods:
//!   - type: billing::InvoiceService
//!     method: issue
//!     profiled:
//!       tag: "invoice.issue.{$0}"
//!       level: DEBUG
//!       timeThreshold: 250
//!   - type: billing::InvoiceService
//!     method: void
//! ```
//!
//! An entry without a `profiled` block is profiled with
//! [`ProfiledConfig::declared()`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::config::ProfiledConfig;
use crate::error::{ConfigError, ConfigResult};

/// On-disk shape of a registry file
#[derive(Debug, Default, Serialize, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    methods: Vec<RegistryEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RegistryEntry {
    #[serde(rename = "type")]
    declaring_type: String,
    method: String,
    #[serde(default)]
    profiled: Option<ProfiledConfig>,
}

/// Registration table of profiled methods
#[derive(Debug, Clone, Default)]
pub struct ProfiledRegistry {
    /// Configs organized by declaring type, then method name
    methods: HashMap<String, HashMap<String, Arc<ProfiledConfig>>>,
}

impl ProfiledRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a method
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::DuplicateRegistration` if the method is already
    /// registered, or a validation error if `config` is invalid.
    pub fn register(
        &mut self,
        declaring_type: impl Into<String>,
        method: impl Into<String>,
        config: ProfiledConfig,
    ) -> ConfigResult<()> {
        let declaring_type = declaring_type.into();
        let method = method.into();

        if declaring_type.is_empty() {
            return Err(ConfigError::IncompleteEntry("type"));
        }
        if method.is_empty() {
            return Err(ConfigError::IncompleteEntry("method"));
        }

        config.validate()?;

        let methods = self.methods.entry(declaring_type.clone()).or_default();
        if methods.contains_key(&method) {
            return Err(ConfigError::DuplicateRegistration {
                declaring_type,
                method,
            });
        }

        methods.insert(method, Arc::new(config));
        Ok(())
    }

    /// Builder-style variant of [`register`](Self::register)
    pub fn with_method(
        mut self,
        declaring_type: impl Into<String>,
        method: impl Into<String>,
        config: ProfiledConfig,
    ) -> ConfigResult<Self> {
        self.register(declaring_type, method, config)?;
        Ok(self)
    }

    /// Lookup the config registered for a method
    pub fn lookup(&self, declaring_type: &str, method: &str) -> Option<Arc<ProfiledConfig>> {
        self.methods.get(declaring_type)?.get(method).cloned()
    }

    /// Check if a method is registered
    pub fn contains(&self, declaring_type: &str, method: &str) -> bool {
        self.methods
            .get(declaring_type)
            .is_some_and(|methods| methods.contains_key(method))
    }

    /// Number of registered methods
    pub fn len(&self) -> usize {
        self.methods.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over `(type, method, config)` triples
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &Arc<ProfiledConfig>)> {
        self.methods.iter().flat_map(|(declaring_type, methods)| {
            methods
                .iter()
                .map(move |(method, config)| (declaring_type.as_str(), method.as_str(), config))
        })
    }

    /// Parse a registry from YAML text
    pub fn from_yaml_str(text: &str) -> ConfigResult<Self> {
        let file: RegistryFile = serde_yaml::from_str(text)?;
        Self::from_file(file)
    }

    /// Parse a registry from JSON text
    pub fn from_json_str(text: &str) -> ConfigResult<Self> {
        let file: RegistryFile = serde_json::from_str(text)?;
        Self::from_file(file)
    }

    /// Load a registry file, picking the format from its extension
    ///
    /// `.yaml` / `.yml` are parsed as YAML, `.json` as JSON.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let registry = match extension.as_str() {
            "yaml" | "yml" => Self::from_yaml_str(&text)?,
            "json" => Self::from_json_str(&text)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };

        tracing::debug!(
            "Loaded {} profiled methods from {}",
            registry.len(),
            path.display()
        );

        Ok(registry)
    }

    /// Serialize the registry as YAML
    pub fn to_yaml_string(&self) -> ConfigResult<String> {
        let mut methods: Vec<RegistryEntry> = self
            .iter()
            .map(|(declaring_type, method, config)| RegistryEntry {
                declaring_type: declaring_type.to_string(),
                method: method.to_string(),
                profiled: Some(ProfiledConfig::clone(config)),
            })
            .collect();
        methods.sort_by(|a, b| {
            (&a.declaring_type, &a.method).cmp(&(&b.declaring_type, &b.method))
        });

        Ok(serde_yaml::to_string(&RegistryFile { methods })?)
    }

    fn from_file(file: RegistryFile) -> ConfigResult<Self> {
        let mut registry = Self::new();
        for entry in file.methods {
            let config = entry.profiled.unwrap_or_else(ProfiledConfig::declared);
            registry.register(entry.declaring_type, entry.method, config)?;
        }
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;
    use std::time::Duration;

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ProfiledRegistry::new();
        registry
            .register("billing::InvoiceService", "issue", ProfiledConfig::new("invoice.issue"))
            .unwrap();

        let config = registry.lookup("billing::InvoiceService", "issue").unwrap();
        assert_eq!(config.tag, "invoice.issue");
        assert!(registry.contains("billing::InvoiceService", "issue"));
        assert!(registry.lookup("billing::InvoiceService", "void").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = ProfiledRegistry::new();
        registry
            .register("Orders", "place", ProfiledConfig::declared())
            .unwrap();

        let err = registry
            .register("Orders", "place", ProfiledConfig::declared())
            .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateRegistration { .. }));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut registry = ProfiledRegistry::new();
        let err = registry
            .register("Orders", "place", ProfiledConfig::new("t").with_level("LOUD"))
            .unwrap_err();

        assert!(matches!(err, ConfigError::UnknownLevel(_)));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_from_yaml() {
        let yaml = r#"
methods:
  - type: billing::InvoiceService
    method: issue
    profiled:
      tag: "invoice.issue.{$0}"
      level: DEBUG
      timeThreshold: 250
  - type: billing::InvoiceService
    method: void
"#;

        let registry = ProfiledRegistry::from_yaml_str(yaml).unwrap();

        let issue = registry.lookup("billing::InvoiceService", "issue").unwrap();
        assert_eq!(issue.tag, "invoice.issue.{$0}");
        assert_eq!(issue.severity(), Level::Debug);
        assert_eq!(issue.time_threshold, Duration::from_millis(250));

        let void = registry.lookup("billing::InvoiceService", "void").unwrap();
        assert!(void.uses_default_tag());
    }

    #[test]
    fn test_from_json() {
        let json = r#"{"methods": [{"type": "Orders", "method": "place", "profiled": {"el": false}}]}"#;

        let registry = ProfiledRegistry::from_json_str(json).unwrap();
        let config = registry.lookup("Orders", "place").unwrap();

        assert!(!config.evaluate_expressions);
        assert!(config.uses_default_tag());
    }

    #[test]
    fn test_yaml_round_trip_preserves_entries() {
        let registry = ProfiledRegistry::new()
            .with_method("Orders", "place", ProfiledConfig::new("orders.place"))
            .unwrap();

        let yaml = registry.to_yaml_string().unwrap();
        let reloaded = ProfiledRegistry::from_yaml_str(&yaml).unwrap();

        assert_eq!(
            reloaded.lookup("Orders", "place"),
            registry.lookup("Orders", "place")
        );
    }

    #[test]
    fn test_incomplete_entry() {
        let json = r#"{"methods": [{"type": "", "method": "place"}]}"#;
        let err = ProfiledRegistry::from_json_str(json).unwrap_err();

        assert!(matches!(err, ConfigError::IncompleteEntry("type")));
    }
}
