// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Profiled configuration
//!
//! A [`ProfiledConfig`] describes how one call site is timed: which tag and
//! message templates label the record, which logger receives it and at what
//! severity, and when the record is suppressed.
//!
//! ## Defaults
//!
//! Two flavours of default exist:
//!
//! - [`ProfiledConfig::default()`] is the framework default used for methods
//!   that carry no metadata at all. Its tag is
//!   [`FRAMEWORK_DEFAULT_TAG`] (`{$class.name}#{$methodName}`).
//! - [`ProfiledConfig::declared()`] is what a method gets when it is marked
//!   for profiling without further options. Its tag is the [`DEFAULT_TAG`]
//!   sentinel, which renders as the bare method name.
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//! use timing_aspect_profiled::{Level, ProfiledConfig};
//!
//! let config = ProfiledConfig::new("invoice.issue")
//!     .with_level("DEBUG")
//!     .with_time_threshold(Duration::from_millis(250))
//!     .with_normal_and_slow_suffixes(true);
//!
//! assert_eq!(config.severity(), Level::Debug);
//! assert!(config.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use crate::error::{ConfigError, ConfigResult};
use crate::level::Level;

/// Logger that receives timing records unless a config names another one
pub const DEFAULT_LOGGER_NAME: &str = "timing";

/// Tag sentinel meaning "use the method name"
pub const DEFAULT_TAG: &str = "[DEFAULT_TAG]";

/// Tag template applied to methods without any profiling metadata
pub const FRAMEWORK_DEFAULT_TAG: &str = "{$class.name}#{$methodName}";

static DEFAULT_INSTANCE: LazyLock<Arc<ProfiledConfig>> =
    LazyLock::new(|| Arc::new(ProfiledConfig::default()));

/// Immutable description of how a call site is profiled
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProfiledConfig {
    /// Tag template
    #[serde(default = "declared_tag")]
    pub tag: String,

    /// Message template, empty for no message
    pub message: String,

    /// Name of the logger that receives the record
    pub logger: String,

    /// Severity name (TRACE, DEBUG, INFO, WARN, ERROR, FATAL)
    pub level: String,

    /// Render `{...}` expressions in tag and message
    #[serde(alias = "el")]
    pub evaluate_expressions: bool,

    /// Suffix tags with `.success` / `.failure`
    pub log_failures_separately: bool,

    /// Records faster than this are suppressed; zero disables the threshold
    #[serde(with = "duration_millis")]
    pub time_threshold: Duration,

    /// Suffix tags with `.normal` / `.slow` relative to the threshold
    #[serde(alias = "useNormalSlowSuffixes")]
    pub normal_and_slow_suffixes_enabled: bool,
}

fn declared_tag() -> String {
    DEFAULT_TAG.to_string()
}

impl Default for ProfiledConfig {
    fn default() -> Self {
        Self {
            tag: FRAMEWORK_DEFAULT_TAG.to_string(),
            message: String::new(),
            logger: DEFAULT_LOGGER_NAME.to_string(),
            level: Level::Info.as_str().to_string(),
            evaluate_expressions: true,
            log_failures_separately: false,
            time_threshold: Duration::ZERO,
            normal_and_slow_suffixes_enabled: false,
        }
    }
}

impl ProfiledConfig {
    /// Create a config with the given tag template and default options
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Config for a method marked for profiling without explicit options
    pub fn declared() -> Self {
        Self::new(DEFAULT_TAG)
    }

    /// Process-wide framework default
    ///
    /// Every call returns the same shared instance.
    pub fn default_instance() -> Arc<ProfiledConfig> {
        Arc::clone(&DEFAULT_INSTANCE)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_logger(mut self, logger: impl Into<String>) -> Self {
        self.logger = logger.into();
        self
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_evaluate_expressions(mut self, enabled: bool) -> Self {
        self.evaluate_expressions = enabled;
        self
    }

    pub fn with_log_failures_separately(mut self, enabled: bool) -> Self {
        self.log_failures_separately = enabled;
        self
    }

    pub fn with_time_threshold(mut self, threshold: Duration) -> Self {
        self.time_threshold = threshold;
        self
    }

    pub fn with_normal_and_slow_suffixes(mut self, enabled: bool) -> Self {
        self.normal_and_slow_suffixes_enabled = enabled;
        self
    }

    /// Parsed severity, `INFO` when the configured name is unknown
    pub fn severity(&self) -> Level {
        Level::parse_or_info(&self.level)
    }

    /// Whether the tag is the method-name sentinel
    pub fn uses_default_tag(&self) -> bool {
        self.tag == DEFAULT_TAG
    }

    /// Whether a time threshold is configured
    pub fn has_threshold(&self) -> bool {
        !self.time_threshold.is_zero()
    }

    /// Validate the configuration
    ///
    /// Checks that:
    /// - The tag is not empty
    /// - The logger name is not empty
    /// - The level names a known severity
    pub fn validate(&self) -> ConfigResult<()> {
        if self.tag.trim().is_empty() {
            return Err(ConfigError::EmptyTag);
        }

        if self.logger.trim().is_empty() {
            return Err(ConfigError::EmptyLogger);
        }

        self.level.parse::<Level>()?;

        Ok(())
    }
}

/// Serialize a `Duration` as whole milliseconds
mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let millis = u64::try_from(value.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framework_default() {
        let config = ProfiledConfig::default();

        assert_eq!(config.tag, FRAMEWORK_DEFAULT_TAG);
        assert_eq!(config.logger, DEFAULT_LOGGER_NAME);
        assert_eq!(config.severity(), Level::Info);
        assert!(config.evaluate_expressions);
        assert!(!config.log_failures_separately);
        assert!(!config.has_threshold());
        assert!(!config.normal_and_slow_suffixes_enabled);
    }

    #[test]
    fn test_default_instance_is_shared() {
        let a = ProfiledConfig::default_instance();
        let b = ProfiledConfig::default_instance();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(*a, ProfiledConfig::default());
    }

    #[test]
    fn test_declared_uses_sentinel() {
        assert!(ProfiledConfig::declared().uses_default_tag());
        assert!(!ProfiledConfig::default().uses_default_tag());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(matches!(
            ProfiledConfig::new("  ").validate(),
            Err(ConfigError::EmptyTag)
        ));
        assert!(matches!(
            ProfiledConfig::new("t").with_logger("").validate(),
            Err(ConfigError::EmptyLogger)
        ));
        assert!(matches!(
            ProfiledConfig::new("t").with_level("LOUD").validate(),
            Err(ConfigError::UnknownLevel(_))
        ));
    }

    #[test]
    fn test_unknown_level_degrades_to_info() {
        let config = ProfiledConfig::new("t").with_level("LOUD");
        assert_eq!(config.severity(), Level::Info);
    }

    #[test]
    fn test_deserialize_option_names() {
        let json = r#"{
            "tag": "orders.place",
            "el": false,
            "logFailuresSeparately": true,
            "timeThreshold": 150,
            "normalAndSlowSuffixesEnabled": true
        }"#;

        let config: ProfiledConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.tag, "orders.place");
        assert!(!config.evaluate_expressions);
        assert!(config.log_failures_separately);
        assert_eq!(config.time_threshold, Duration::from_millis(150));
        assert!(config.normal_and_slow_suffixes_enabled);
        assert_eq!(config.logger, DEFAULT_LOGGER_NAME);
    }

    #[test]
    fn test_missing_tag_deserializes_to_sentinel() {
        let config: ProfiledConfig = serde_json::from_str(r#"{"level": "DEBUG"}"#).unwrap();

        assert!(config.uses_default_tag());
        assert_eq!(config.severity(), Level::Debug);
    }
}
