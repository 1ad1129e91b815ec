// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # timing-aspect - Stopwatches
//!
//! The measuring and persisting half of method timing. The timing engine asks a
//! [`StopWatchFactory`] for a running [`StopWatch`], executes the call, then
//! stops the watch with the rendered tag and message. A [`LoggingStopWatch`]
//! applies the threshold rules and hands the resulting [`TimingRecord`] to a
//! [`Sink`].
//!
//! ## Sinks
//!
//! - [`TracingSink`]: one `tracing` event per record under the `timing` target
//! - [`WriterSink`]: JSON lines over any `std::io::Write`
//!
//! Sink failures are logged with `tracing::warn!` and never reach the timed
//! call.

pub mod error;
pub mod factory;
pub mod record;
pub mod sink;
pub mod stopwatch;
pub mod tracing_sink;
pub mod writer_sink;

// Re-exports
pub use error::{StopWatchError, StopWatchResult};
pub use factory::{LoggingStopWatchFactory, StopWatchFactory};
pub use record::{Outcome, TimingRecord};
pub use sink::Sink;
pub use stopwatch::{DEFAULT_NORMAL_SUFFIX, DEFAULT_SLOW_SUFFIX, LoggingStopWatch, StopWatch};
pub use tracing_sink::{TIMING_TARGET, TracingSink};
pub use writer_sink::WriterSink;
