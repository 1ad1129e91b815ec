// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Factories that hand out a fresh stopwatch per timed call.

use std::sync::Arc;
use timing_aspect_profiled::Level;

use crate::sink::Sink;
use crate::stopwatch::{LoggingStopWatch, StopWatch};
use crate::tracing_sink::TracingSink;

/// Produces one stopwatch per invocation
///
/// Factories are shared across threads; the stopwatches they return are not.
pub trait StopWatchFactory: Send + Sync {
    type Watch: StopWatch;

    /// Create a running stopwatch addressed to `logger` at `level`
    fn new_stop_watch(&self, logger: &str, level: Level) -> Self::Watch;
}

impl<F: StopWatchFactory + ?Sized> StopWatchFactory for Arc<F> {
    type Watch = F::Watch;

    fn new_stop_watch(&self, logger: &str, level: Level) -> Self::Watch {
        (**self).new_stop_watch(logger, level)
    }
}

/// Factory of [`LoggingStopWatch`]es sharing one sink
#[derive(Debug)]
pub struct LoggingStopWatchFactory<S> {
    sink: Arc<S>,
    failure_level: Option<Level>,
}

impl<S> Clone for LoggingStopWatchFactory<S> {
    fn clone(&self) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
            failure_level: self.failure_level,
        }
    }
}

impl<S: Sink> LoggingStopWatchFactory<S> {
    pub fn new(sink: S) -> Self {
        Self::from_shared(Arc::new(sink))
    }

    /// Build a factory over a sink the caller keeps a handle to
    pub fn from_shared(sink: Arc<S>) -> Self {
        Self {
            sink,
            failure_level: None,
        }
    }

    /// Fixed level for failed outcomes, instead of the call's own level
    pub fn with_failure_level(mut self, level: Level) -> Self {
        self.failure_level = Some(level);
        self
    }

    pub fn sink(&self) -> &Arc<S> {
        &self.sink
    }
}

impl Default for LoggingStopWatchFactory<TracingSink> {
    fn default() -> Self {
        Self::new(TracingSink::new())
    }
}

impl<S: Sink + 'static> StopWatchFactory for LoggingStopWatchFactory<S> {
    type Watch = LoggingStopWatch<Arc<S>>;

    fn new_stop_watch(&self, logger: &str, level: Level) -> Self::Watch {
        let watch = LoggingStopWatch::new(Arc::clone(&self.sink), logger, level);
        match self.failure_level {
            Some(failure_level) => watch.with_failure_level(failure_level),
            None => watch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer_sink::WriterSink;

    #[test]
    fn test_watches_share_sink() {
        let factory = LoggingStopWatchFactory::new(WriterSink::new(Vec::new()));

        let a = factory.new_stop_watch("timing", Level::Info);
        let b = factory.new_stop_watch("audit", Level::Debug);

        assert_eq!(a.logger(), "timing");
        assert_eq!(b.level(), Level::Debug);
        assert_eq!(Arc::strong_count(factory.sink()), 3);
    }

    #[test]
    fn test_failure_level_override() {
        let factory =
            LoggingStopWatchFactory::new(WriterSink::new(Vec::new())).with_failure_level(Level::Error);

        let watch = factory.new_stop_watch("timing", Level::Info);

        assert_eq!(watch.level(), Level::Info);
        assert_eq!(watch.failure_level(), Level::Error);
    }
}
