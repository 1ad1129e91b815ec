// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Error types for profiling configuration
//!
//! Errors raised while validating a [`ProfiledConfig`](crate::ProfiledConfig)
//! or loading a [`ProfiledRegistry`](crate::ProfiledRegistry).

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while building or loading profiling configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Severity name is not one of TRACE, DEBUG, INFO, WARN, ERROR, FATAL
    #[error("Unknown severity level '{0}'")]
    UnknownLevel(String),

    /// Tag template is empty
    #[error("Profiled tag must not be empty")]
    EmptyTag,

    /// Logger name is empty
    #[error("Logger name must not be empty")]
    EmptyLogger,

    /// The same method was registered more than once
    #[error("Method {declaring_type}#{method} is registered twice")]
    DuplicateRegistration {
        declaring_type: String,
        method: String,
    },

    /// Entry has an empty type or method name
    #[error("Registry entry is missing a {0} name")]
    IncompleteEntry(&'static str),

    /// Registry file could not be read
    #[error("Failed to read registry file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Registry file extension is not recognized
    #[error("Unsupported registry format: {0}")]
    UnsupportedFormat(String),

    /// YAML registry could not be parsed
    #[error("Invalid YAML registry: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON registry could not be parsed
    #[error("Invalid JSON registry: {0}")]
    Json(#[from] serde_json::Error),
}
