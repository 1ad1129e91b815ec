// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Sink trait for timing-record persistence
//!
//! A sink is the logging backend behind a stopwatch. Implementations may
//! forward to `tracing`, write JSON lines to a file, or collect records in
//! memory for tests.
//!
//! # Examples
//!
//! ```rust
//! use timing_aspect_stopwatch::{Sink, StopWatchResult, TimingRecord};
//!
//! struct StderrSink;
//!
//! impl Sink for StderrSink {
//!     fn emit(&self, record: &TimingRecord) -> StopWatchResult<()> {
//!         eprintln!("{}", record);
//!         Ok(())
//!     }
//! }
//! ```

use std::sync::Arc;
use timing_aspect_profiled::Level;

use crate::error::StopWatchResult;
use crate::record::TimingRecord;

/// Destination for timing records
///
/// Sinks are shared by every stopwatch a factory hands out and may be called
/// from many threads at once.
pub trait Sink: Send + Sync {
    /// Whether a record for `logger` at `level` would be persisted
    ///
    /// Stopwatches skip timing entirely when this returns `false`.
    fn is_enabled(&self, _logger: &str, _level: Level) -> bool {
        true
    }

    /// Persist one record
    ///
    /// # Errors
    ///
    /// Returns a `StopWatchError` when the backend fails. Callers log the
    /// error and carry on.
    fn emit(&self, record: &TimingRecord) -> StopWatchResult<()>;
}

impl<S: Sink + ?Sized> Sink for Arc<S> {
    fn is_enabled(&self, logger: &str, level: Level) -> bool {
        (**self).is_enabled(logger, level)
    }

    fn emit(&self, record: &TimingRecord) -> StopWatchResult<()> {
        (**self).emit(record)
    }
}

impl<S: Sink + ?Sized> Sink for &S {
    fn is_enabled(&self, logger: &str, level: Level) -> bool {
        (**self).is_enabled(logger, level)
    }

    fn emit(&self, record: &TimingRecord) -> StopWatchResult<()> {
        (**self).emit(record)
    }
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn is_enabled(&self, logger: &str, level: Level) -> bool {
        (**self).is_enabled(logger, level)
    }

    fn emit(&self, record: &TimingRecord) -> StopWatchResult<()> {
        (**self).emit(record)
    }
}
