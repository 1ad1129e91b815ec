// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # timing-aspect
//!
//! Times method invocations without the timed code knowing about it. An
//! interception layer wraps each call in a [`JoinPoint`]; the
//! [`TimingEngine`] runs it under a per-thread [`CallDepthTracker`] and a
//! stopwatch, then emits one timing record through a sink.
//!
//! ## Pipeline
//!
//! ```text
//! host call -> adapter -> ConfigResolver -> TimingEngine -> StopWatch -> Sink
//!                 |                              |
//!             JoinPoint  <----- proceed() -------+
//! ```
//!
//! - [`ConfigResolver`] picks the [`ProfiledConfig`](timing_aspect_profiled::ProfiledConfig)
//!   from method metadata, a registry, or the default
//! - [`TimingEngine`] tracks depth, renders tag and message
//!   [templates](template), and stops the watch
//! - adapters bind concrete interception mechanisms:
//!   [`TimingInterceptor`] for host frameworks, [`Profiler`] for closures and
//!   futures
//!
//! The call's return value and errors reach the caller unchanged. Panics are
//! resumed after recording, except at the [`TimingInterceptor`] boundary,
//! which cannot unwind and converts them into
//! [`InvocationError::Panicked`].
//!
//! ## Features
//!
//! - `async` (default): [`AsyncJoinPoint`], `TimingEngine::run_async` and
//!   task-local depth tracking on tokio

pub mod adapters;
pub mod depth;
pub mod engine;
pub mod failure;
pub mod join_point;
pub mod resolve;
pub mod template;
pub mod variables;

// Re-exports
pub use adapters::function::{FnJoinPoint, Profiler};
#[cfg(feature = "async")]
pub use adapters::future::FutureJoinPoint;
pub use adapters::interceptor::{
    InvocationContext, InvocationError, InvocationJoinPoint, InvocationResult, TimingInterceptor,
};
pub use depth::{CallDepthTracker, DepthGuard};
pub use engine::{FAILURE_SUFFIX, SUCCESS_SUFFIX, TimingEngine};
pub use failure::{Propagated, WrappedPanic, catch_boundary, panic_message};
#[cfg(feature = "async")]
pub use join_point::AsyncJoinPoint;
pub use join_point::{CallSite, JoinPoint};
pub use resolve::ConfigResolver;
pub use template::{EL_ERROR, TemplateContext};
pub use variables::Variables;

#[doc(hidden)]
pub mod __private {
    pub use serde_json;
}
