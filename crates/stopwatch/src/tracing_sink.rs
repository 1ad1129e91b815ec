// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Tracing sink
//!
//! Forwards timing records to the `tracing` ecosystem. Every record becomes
//! one event under the [`TIMING_TARGET`] target with structured fields
//! (`logger`, `tag`, `msg`, `elapsed_ms`, `start_ms`, `outcome`,
//! `failure`), so any subscriber can filter, format or ship them.
//!
//! `FATAL` has no `tracing` counterpart and is emitted at `ERROR`.

use timing_aspect_profiled::Level;

use crate::error::StopWatchResult;
use crate::record::TimingRecord;
use crate::sink::Sink;

/// Target used for every timing event
pub const TIMING_TARGET: &str = "timing";

/// Sink that emits records as `tracing` events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TracingSink {
    pub fn new() -> Self {
        Self
    }
}

macro_rules! timing_event {
    ($level:expr, $record:expr) => {
        tracing::event!(
            target: TIMING_TARGET,
            $level,
            logger = %$record.logger,
            tag = %$record.tag,
            msg = $record.message.as_deref().unwrap_or(""),
            elapsed_ms = $record.elapsed_millis(),
            start_ms = $record.start_millis,
            outcome = %$record.outcome,
            failure = $record.failure.as_deref().unwrap_or(""),
            "{}",
            $record
        )
    };
}

impl Sink for TracingSink {
    fn is_enabled(&self, _logger: &str, level: Level) -> bool {
        match level {
            Level::Trace => tracing::enabled!(target: TIMING_TARGET, tracing::Level::TRACE),
            Level::Debug => tracing::enabled!(target: TIMING_TARGET, tracing::Level::DEBUG),
            Level::Info => tracing::enabled!(target: TIMING_TARGET, tracing::Level::INFO),
            Level::Warn => tracing::enabled!(target: TIMING_TARGET, tracing::Level::WARN),
            Level::Error | Level::Fatal => {
                tracing::enabled!(target: TIMING_TARGET, tracing::Level::ERROR)
            }
        }
    }

    fn emit(&self, record: &TimingRecord) -> StopWatchResult<()> {
        match record.level {
            Level::Trace => timing_event!(tracing::Level::TRACE, record),
            Level::Debug => timing_event!(tracing::Level::DEBUG, record),
            Level::Info => timing_event!(tracing::Level::INFO, record),
            Level::Warn => timing_event!(tracing::Level::WARN, record),
            Level::Error | Level::Fatal => timing_event!(tracing::Level::ERROR, record),
        }
        Ok(())
    }
}
