// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # timing-aspect - Profiling Configuration
//!
//! This crate holds the declarative side of method timing: the
//! [`ProfiledConfig`] value describing how one call site is timed, the
//! [`MethodRef`] handed over by the interception layer, and the
//! [`ProfiledRegistry`] registration table that attaches configs to methods.
//!
//! ## Configuration options
//!
//! | option | meaning |
//! |--------|---------|
//! | `tag` | tag template, `[DEFAULT_TAG]` means "method name" |
//! | `message` | message template, empty for none |
//! | `logger` | logger that receives the record |
//! | `level` | severity name |
//! | `el` / `evaluateExpressions` | render `{...}` expressions |
//! | `logFailuresSeparately` | `.success` / `.failure` tag suffixes |
//! | `timeThreshold` | milliseconds, 0 = always log |
//! | `normalAndSlowSuffixesEnabled` | `.normal` / `.slow` tag suffixes |
//!
//! Configs are immutable once built and shared behind `Arc`.

pub mod config;
pub mod error;
pub mod level;
pub mod method;
pub mod registry;

// Re-exports
pub use config::{DEFAULT_LOGGER_NAME, DEFAULT_TAG, FRAMEWORK_DEFAULT_TAG, ProfiledConfig};
pub use error::{ConfigError, ConfigResult};
pub use level::Level;
pub use method::{MethodRef, simple_name};
pub use registry::ProfiledRegistry;
