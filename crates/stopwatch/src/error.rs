// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Error types for timing-record sinks
//!
//! Sinks report these to the stopwatch, which logs and drops them. They never
//! reach the profiled call.

use std::io;
use thiserror::Error;

/// Result type alias for sink operations
pub type StopWatchResult<T> = Result<T, StopWatchError>;

/// Errors that can occur while persisting a timing record
#[derive(Debug, Error)]
pub enum StopWatchError {
    /// Writing the record failed
    #[error("I/O error while writing timing record: {0}")]
    Io(#[from] io::Error),

    /// Encoding the record failed
    #[error("Failed to serialize timing record: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A previous writer panicked while holding the sink
    #[error("Sink lock poisoned")]
    Poisoned,

    /// The sink cannot accept records right now
    #[error("Sink unavailable: {0}")]
    Unavailable(String),
}
