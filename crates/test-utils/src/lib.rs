// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Testing utilities for timing-aspect
//!
//! This crate provides common testing components including:
//! - In-memory sinks that record, reject or panic on timing records
//! - A `tracing` layer that captures events for assertions
//! - Mock host invocation contexts and scripted join points
//! - Sample profiling configurations and registry files

pub mod capture;
pub mod fixtures;
pub mod mocks;
pub mod sinks;

// Re-exports for convenience
pub use capture::{CapturedEvent, CapturingLayer};
pub use fixtures::ProfiledFixtures;
pub use mocks::{MockInvocationContext, Script, ScriptedError, ScriptedJoinPoint};
pub use sinks::{FailingSink, PanickingLevelSink, PanickingSink, RecordingSink};
