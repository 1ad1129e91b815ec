// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Stopwatches
//!
//! [`StopWatch`] is the interface the timing engine drives: start the clock,
//! run the call, then stop with a tag and message. [`LoggingStopWatch`] is the
//! implementation that turns the stop event into a [`TimingRecord`] and hands
//! it to a [`Sink`].
//!
//! ## Thresholds
//!
//! | threshold | suffixes | elapsed < T | elapsed >= T |
//! |-----------|----------|-------------|--------------|
//! | 0 | any | emit `tag` | emit `tag` |
//! | T | off | nothing | emit `tag` |
//! | T | on | emit `tag.normal` | emit `tag.slow` |

use std::borrow::Cow;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use timing_aspect_profiled::Level;

use crate::record::{Outcome, TimingRecord};
use crate::sink::Sink;

/// Suffix appended to tags under the threshold when suffixes are enabled
pub const DEFAULT_NORMAL_SUFFIX: &str = ".normal";

/// Suffix appended to tags at or over the threshold when suffixes are enabled
pub const DEFAULT_SLOW_SUFFIX: &str = ".slow";

/// Timer driven by the timing engine
///
/// `stop`, `stop_at` and `fail` are terminal events: each produces at most
/// one record and returns the elapsed time since `start`.
pub trait StopWatch {
    /// Reset the start time to now
    fn start(&mut self);

    /// Time since the last `start`
    fn elapsed(&self) -> Duration;

    /// Whether stopping would persist anything
    ///
    /// When `false` the engine runs the call without timing it.
    fn is_logging(&self) -> bool {
        true
    }

    /// Records faster than `threshold` are suppressed; zero disables it
    fn set_time_threshold(&mut self, threshold: Duration);

    /// Toggle `.normal` / `.slow` tag suffixes
    fn set_normal_and_slow_suffixes_enabled(&mut self, enabled: bool);

    /// Stop at the normal level with a successful outcome
    fn stop(&mut self, tag: &str, message: &str) -> Duration;

    /// Stop at an explicit level with a successful outcome
    fn stop_at(&mut self, tag: &str, message: &str, level: Level) -> Duration;

    /// Stop at the failure level with a failed outcome
    fn fail(&mut self, tag: &str, message: &str, cause: &str) -> Duration;
}

impl<W: StopWatch + ?Sized> StopWatch for &mut W {
    fn start(&mut self) {
        (**self).start()
    }

    fn elapsed(&self) -> Duration {
        (**self).elapsed()
    }

    fn is_logging(&self) -> bool {
        (**self).is_logging()
    }

    fn set_time_threshold(&mut self, threshold: Duration) {
        (**self).set_time_threshold(threshold)
    }

    fn set_normal_and_slow_suffixes_enabled(&mut self, enabled: bool) {
        (**self).set_normal_and_slow_suffixes_enabled(enabled)
    }

    fn stop(&mut self, tag: &str, message: &str) -> Duration {
        (**self).stop(tag, message)
    }

    fn stop_at(&mut self, tag: &str, message: &str, level: Level) -> Duration {
        (**self).stop_at(tag, message, level)
    }

    fn fail(&mut self, tag: &str, message: &str, cause: &str) -> Duration {
        (**self).fail(tag, message, cause)
    }
}

/// Stopwatch that persists its stop events through a [`Sink`]
#[derive(Debug)]
pub struct LoggingStopWatch<S> {
    sink: S,
    logger: String,
    level: Level,
    failure_level: Level,
    started: Instant,
    start_time: SystemTime,
    time_threshold: Duration,
    suffixes_enabled: bool,
    normal_suffix: Cow<'static, str>,
    slow_suffix: Cow<'static, str>,
}

impl<S: Sink> LoggingStopWatch<S> {
    /// Create a running stopwatch addressed to `logger` at `level`
    pub fn new(sink: S, logger: impl Into<String>, level: Level) -> Self {
        Self {
            sink,
            logger: logger.into(),
            level,
            failure_level: level,
            started: Instant::now(),
            start_time: SystemTime::now(),
            time_threshold: Duration::ZERO,
            suffixes_enabled: false,
            normal_suffix: Cow::Borrowed(DEFAULT_NORMAL_SUFFIX),
            slow_suffix: Cow::Borrowed(DEFAULT_SLOW_SUFFIX),
        }
    }

    /// Level used for failed outcomes
    pub fn with_failure_level(mut self, level: Level) -> Self {
        self.failure_level = level;
        self
    }

    /// Replace the `.normal` / `.slow` suffixes
    pub fn with_suffixes(
        mut self,
        normal: impl Into<Cow<'static, str>>,
        slow: impl Into<Cow<'static, str>>,
    ) -> Self {
        self.normal_suffix = normal.into();
        self.slow_suffix = slow.into();
        self
    }

    pub fn logger(&self) -> &str {
        &self.logger
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn failure_level(&self) -> Level {
        self.failure_level
    }

    pub fn time_threshold(&self) -> Duration {
        self.time_threshold
    }

    /// Tag to emit for `elapsed`, or `None` when the record is suppressed
    fn effective_tag<'a>(&self, tag: &'a str, elapsed: Duration) -> Option<Cow<'a, str>> {
        if self.time_threshold.is_zero() {
            return Some(Cow::Borrowed(tag));
        }

        let suffix = if elapsed >= self.time_threshold {
            &self.slow_suffix
        } else if self.suffixes_enabled {
            &self.normal_suffix
        } else {
            return None;
        };

        if self.suffixes_enabled {
            Some(Cow::Owned(format!("{tag}{suffix}")))
        } else {
            Some(Cow::Borrowed(tag))
        }
    }

    fn record(
        &self,
        tag: &str,
        message: &str,
        level: Level,
        outcome: Outcome,
        cause: Option<&str>,
    ) -> Duration {
        let elapsed = self.elapsed();

        // is_logging covers both levels; each record still needs its own
        if !self.sink.is_enabled(&self.logger, level) {
            return elapsed;
        }

        let Some(tag) = self.effective_tag(tag, elapsed) else {
            return elapsed;
        };

        let start_millis = self
            .start_time
            .duration_since(UNIX_EPOCH)
            .map(|since| u64::try_from(since.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or_default();
        let elapsed_millis = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

        let record = TimingRecord {
            logger: self.logger.clone(),
            level,
            tag: tag.into_owned(),
            message: (!message.is_empty()).then(|| message.to_string()),
            start_millis,
            stop_millis: start_millis.saturating_add(elapsed_millis),
            elapsed,
            outcome,
            failure: cause.map(String::from),
        };

        if let Err(e) = self.sink.emit(&record) {
            tracing::warn!(
                logger = %self.logger,
                "Failed to emit timing record for {}: {}",
                record.tag,
                e
            );
        }

        elapsed
    }
}

impl<S: Sink> StopWatch for LoggingStopWatch<S> {
    fn start(&mut self) {
        self.started = Instant::now();
        self.start_time = SystemTime::now();
    }

    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    fn is_logging(&self) -> bool {
        self.sink.is_enabled(&self.logger, self.level)
            || self.sink.is_enabled(&self.logger, self.failure_level)
    }

    fn set_time_threshold(&mut self, threshold: Duration) {
        self.time_threshold = threshold;
    }

    fn set_normal_and_slow_suffixes_enabled(&mut self, enabled: bool) {
        self.suffixes_enabled = enabled;
    }

    fn stop(&mut self, tag: &str, message: &str) -> Duration {
        self.record(tag, message, self.level, Outcome::Success, None)
    }

    fn stop_at(&mut self, tag: &str, message: &str, level: Level) -> Duration {
        self.record(tag, message, level, Outcome::Success, None)
    }

    fn fail(&mut self, tag: &str, message: &str, cause: &str) -> Duration {
        self.record(tag, message, self.failure_level, Outcome::Failure, Some(cause))
    }
}
