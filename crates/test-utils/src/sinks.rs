// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! In-memory sinks for testing
//!
//! Provides a recording sink with builder-style level filtering, plus sinks
//! that fail or panic on every record, or on the level check, for isolation
//! tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use timing_aspect_profiled::Level;
use timing_aspect_stopwatch::{Sink, StopWatchError, StopWatchResult, TimingRecord};

/// Sink that keeps every record it receives
#[derive(Debug, Default)]
pub struct RecordingSink {
    records: Mutex<Vec<TimingRecord>>,
    min_level: Option<Level>,
    disabled: bool,
}

impl RecordingSink {
    /// Create a sink that accepts every level
    pub fn new() -> Self {
        Self::default()
    }

    /// Report levels below `level` as disabled
    pub fn with_min_level(mut self, level: Level) -> Self {
        self.min_level = Some(level);
        self
    }

    /// Create a sink that reports every level as disabled
    pub fn disabled() -> Self {
        Self {
            disabled: true,
            ..Self::default()
        }
    }

    /// Snapshot of the records received so far
    pub fn records(&self) -> Vec<TimingRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    /// Tags of the records received so far, in order
    pub fn tags(&self) -> Vec<String> {
        self.records().into_iter().map(|r| r.tag).collect()
    }

    /// The only record received
    ///
    /// # Panics
    ///
    /// Panics unless exactly one record was received.
    pub fn single(&self) -> TimingRecord {
        let mut records = self.records();
        assert_eq!(records.len(), 1, "expected exactly one record, got {records:?}");
        records.remove(0)
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every record received so far
    pub fn clear(&self) {
        if let Ok(mut records) = self.records.lock() {
            records.clear();
        }
    }
}

impl Sink for RecordingSink {
    fn is_enabled(&self, _logger: &str, level: Level) -> bool {
        !self.disabled && self.min_level.is_none_or(|min| level >= min)
    }

    fn emit(&self, record: &TimingRecord) -> StopWatchResult<()> {
        self.records
            .lock()
            .map_err(|_| StopWatchError::Poisoned)?
            .push(record.clone());
        Ok(())
    }
}

/// Sink whose every emit returns an error
#[derive(Debug, Default)]
pub struct FailingSink {
    attempts: AtomicUsize,
}

impl FailingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of emits attempted
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Sink for FailingSink {
    fn emit(&self, _record: &TimingRecord) -> StopWatchResult<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(StopWatchError::Unavailable("backend offline".to_string()))
    }
}

/// Sink whose every emit panics
#[derive(Debug, Default)]
pub struct PanickingSink;

impl Sink for PanickingSink {
    fn emit(&self, record: &TimingRecord) -> StopWatchResult<()> {
        panic!("sink exploded while writing {}", record.tag)
    }
}

/// Sink whose level check panics, before any record exists
#[derive(Debug, Default)]
pub struct PanickingLevelSink;

impl Sink for PanickingLevelSink {
    fn is_enabled(&self, logger: &str, _level: Level) -> bool {
        panic!("level lookup failed for logger {logger}")
    }

    fn emit(&self, _record: &TimingRecord) -> StopWatchResult<()> {
        Ok(())
    }
}
