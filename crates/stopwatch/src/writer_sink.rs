// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! JSON-lines sink over any `Write` implementation.

use std::io::Write;
use std::sync::Mutex;
use timing_aspect_profiled::Level;

use crate::error::{StopWatchError, StopWatchResult};
use crate::record::TimingRecord;
use crate::sink::Sink;

/// Sink that writes one JSON object per line
///
/// Records below `min_level` are reported as disabled. Writes are serialized
/// through a mutex so concurrent stopwatches never interleave lines.
#[derive(Debug)]
pub struct WriterSink<W: Write + Send> {
    writer: Mutex<W>,
    min_level: Level,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
            min_level: Level::Trace,
        }
    }

    pub fn with_min_level(mut self, level: Level) -> Self {
        self.min_level = level;
        self
    }

    /// Consume the sink and return the underlying writer
    pub fn into_inner(self) -> StopWatchResult<W> {
        self.writer.into_inner().map_err(|_| StopWatchError::Poisoned)
    }
}

impl<W: Write + Send> Sink for WriterSink<W> {
    fn is_enabled(&self, _logger: &str, level: Level) -> bool {
        level >= self.min_level
    }

    fn emit(&self, record: &TimingRecord) -> StopWatchResult<()> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let mut writer = self.writer.lock().map_err(|_| StopWatchError::Poisoned)?;
        writer.write_all(&line)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Outcome;
    use std::time::Duration;

    fn record(tag: &str) -> TimingRecord {
        TimingRecord {
            logger: "timing".to_string(),
            level: Level::Info,
            tag: tag.to_string(),
            message: None,
            start_millis: 10,
            stop_millis: 15,
            elapsed: Duration::from_millis(5),
            outcome: Outcome::Success,
            failure: None,
        }
    }

    #[test]
    fn test_writes_json_lines() {
        let sink = WriterSink::new(Vec::new());
        sink.emit(&record("a")).unwrap();
        sink.emit(&record("b")).unwrap();

        let bytes = sink.into_inner().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["tag"], "a");
        assert_eq!(first["elapsedMillis"], 5);
    }

    #[test]
    fn test_min_level() {
        let sink = WriterSink::new(Vec::new()).with_min_level(Level::Warn);

        assert!(!sink.is_enabled("timing", Level::Info));
        assert!(sink.is_enabled("timing", Level::Error));
    }
}
