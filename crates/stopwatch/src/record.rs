// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Timing records produced at the terminal event of a stopwatch.

use serde::{Serialize, Serializer};
use std::fmt;
use std::time::Duration;
use timing_aspect_profiled::Level;

/// How the timed call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Failure,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success => f.write_str("success"),
            Outcome::Failure => f.write_str("failure"),
        }
    }
}

/// One timed invocation
///
/// Built once by the stopwatch and handed to the sink by reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingRecord {
    /// Logger the record is addressed to
    pub logger: String,
    /// Severity of the record
    pub level: Level,
    /// Rendered tag, including any suffix
    pub tag: String,
    /// Rendered message, absent when the template was empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Start time, milliseconds since the Unix epoch
    pub start_millis: u64,
    /// Stop time, milliseconds since the Unix epoch
    pub stop_millis: u64,
    /// Elapsed wall time
    #[serde(rename = "elapsedMillis", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
    /// Whether the call returned or failed
    pub outcome: Outcome,
    /// Failure description for failed calls
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl TimingRecord {
    pub fn elapsed_millis(&self) -> u64 {
        u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX)
    }

    pub fn is_failure(&self) -> bool {
        self.outcome == Outcome::Failure
    }
}

fn serialize_millis<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
}

impl fmt::Display for TimingRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "start[{}] time[{}] tag[{}]",
            self.start_millis,
            self.elapsed_millis(),
            self.tag
        )?;
        if let Some(message) = &self.message {
            write!(f, " message[{}]", message)?;
        }
        Ok(())
    }
}
