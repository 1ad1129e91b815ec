// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Timing engine
//!
//! Runs one join point under depth tracking and a stopwatch:
//!
//! 1. enter the call depth (released on every exit path)
//! 2. add `$depth`, `$threadName` and `$threadId` to the join point
//! 3. proceed, catching panics
//! 4. stop the watch with the rendered tag and message, or fail it
//! 5. hand back exactly what the call produced
//!
//! `Err` values are returned unchanged. Panics are recorded, then resumed with
//! their original payload, on the async path as well.
//!
//! Instrumentation is isolated on both sides of `proceed`. A panic while
//! asking the sink whether it logs, attaching variables or starting the watch
//! is logged and the call proceeds untimed. A panic while rendering or
//! emitting is logged and dropped. Either way the call runs and its own
//! outcome reaches the caller.
//!
//! When the stopwatch reports that nothing would be logged, the call proceeds
//! untimed; the depth is still tracked so nested calls stay correct.

use serde_json::Value;
use std::fmt::Display;
use std::panic::{self, AssertUnwindSafe};
use timing_aspect_profiled::ProfiledConfig;
use timing_aspect_stopwatch::StopWatch;

use crate::depth::CallDepthTracker;
use crate::failure::panic_message;
use crate::join_point::{CallSite, JoinPoint};
use crate::template::{self, TemplateContext};
use crate::variables;

/// Appended to tags of successful calls with `logFailuresSeparately`
pub const SUCCESS_SUFFIX: &str = ".success";

/// Appended to tags of failed calls with `logFailuresSeparately`
pub const FAILURE_SUFFIX: &str = ".failure";

/// How a timed call ended, as far as recording is concerned
enum Completion {
    Returned(Option<Value>),
    Failed(String),
}

/// The profiling core
pub struct TimingEngine;

impl TimingEngine {
    /// Time one call
    ///
    /// Returns exactly what `join_point.proceed()` returned. A panic raised by
    /// the call is resumed after the failure has been recorded.
    pub fn run<J, W>(
        join_point: &mut J,
        config: &ProfiledConfig,
        mut watch: W,
    ) -> Result<J::Output, J::Error>
    where
        J: JoinPoint,
        J::Error: Display,
        W: StopWatch,
    {
        let depth = CallDepthTracker::enter();

        if !Self::arm(join_point, config, &mut watch, depth.depth()) {
            return join_point.proceed();
        }

        match panic::catch_unwind(AssertUnwindSafe(|| join_point.proceed())) {
            Ok(Ok(output)) => {
                let rendered = join_point.render_output(&output);
                Self::record(&*join_point, config, &mut watch, Completion::Returned(rendered));
                Ok(output)
            }
            Ok(Err(error)) => {
                let cause = error.to_string();
                Self::record(&*join_point, config, &mut watch, Completion::Failed(cause));
                Err(error)
            }
            Err(payload) => {
                let cause = panic_message(&*payload);
                Self::record(&*join_point, config, &mut watch, Completion::Failed(cause));
                drop(depth);
                panic::resume_unwind(payload)
            }
        }
    }

    /// Time one asynchronous call
    ///
    /// Depth is tracked per task. The outermost timed future opens the task
    /// scope; nested timed futures awaited inside it share the count.
    ///
    /// A panic while polling the future is recorded, then resumed.
    #[cfg(feature = "async")]
    pub async fn run_async<J, W>(
        join_point: &mut J,
        config: &ProfiledConfig,
        watch: W,
    ) -> Result<J::Output, J::Error>
    where
        J: crate::join_point::AsyncJoinPoint,
        J::Error: Display,
        W: StopWatch + Send,
    {
        if CallDepthTracker::in_task_scope() {
            Self::run_in_task(join_point, config, watch).await
        } else {
            CallDepthTracker::task_scope(Self::run_in_task(join_point, config, watch)).await
        }
    }

    #[cfg(feature = "async")]
    async fn run_in_task<J, W>(
        join_point: &mut J,
        config: &ProfiledConfig,
        mut watch: W,
    ) -> Result<J::Output, J::Error>
    where
        J: crate::join_point::AsyncJoinPoint,
        J::Error: Display,
        W: StopWatch + Send,
    {
        use futures::FutureExt;

        let depth = CallDepthTracker::enter_task();

        if !Self::arm(join_point, config, &mut watch, depth.depth()) {
            return join_point.proceed().await;
        }

        match AssertUnwindSafe(join_point.proceed()).catch_unwind().await {
            Ok(Ok(output)) => {
                let rendered = join_point.render_output(&output);
                Self::record(&*join_point, config, &mut watch, Completion::Returned(rendered));
                Ok(output)
            }
            Ok(Err(error)) => {
                let cause = error.to_string();
                Self::record(&*join_point, config, &mut watch, Completion::Failed(cause));
                Err(error)
            }
            Err(payload) => {
                let cause = panic_message(&*payload);
                Self::record(&*join_point, config, &mut watch, Completion::Failed(cause));
                drop(depth);
                panic::resume_unwind(payload)
            }
        }
    }

    /// Run `join_point` with depth tracking only
    ///
    /// Used by adapters when the config or the stopwatch could not be set up.
    pub fn run_untimed<J: JoinPoint>(join_point: &mut J) -> Result<J::Output, J::Error> {
        let _depth = CallDepthTracker::enter();
        join_point.proceed()
    }

    /// Attach variables and start the watch
    ///
    /// Returns `false` when the call should proceed untimed, either because
    /// nothing would be logged or because the setup panicked.
    fn arm<S, W>(site: &mut S, config: &ProfiledConfig, watch: &mut W, depth: u64) -> bool
    where
        S: CallSite,
        W: StopWatch,
    {
        let armed = panic::catch_unwind(AssertUnwindSafe(|| {
            if !watch.is_logging() {
                return false;
            }

            variables::insert_ambient(site.additional_variables_mut(), depth);
            watch.set_time_threshold(config.time_threshold);
            watch.set_normal_and_slow_suffixes_enabled(config.normal_and_slow_suffixes_enabled);
            watch.start();
            true
        }));

        armed.unwrap_or_else(|payload| {
            tracing::warn!(
                method = site.method_name(),
                "Timing skipped: {}",
                panic_message(&*payload)
            );
            false
        })
    }

    fn record<S, W>(site: &S, config: &ProfiledConfig, watch: &mut W, completion: Completion)
    where
        S: CallSite,
        W: StopWatch,
    {
        let recorded = panic::catch_unwind(AssertUnwindSafe(|| {
            Self::stop(site, config, &mut *watch, &completion)
        }));

        if let Err(payload) = recorded {
            tracing::warn!(
                method = site.method_name(),
                "Timing record dropped: {}",
                panic_message(&*payload)
            );
        }
    }

    fn stop<S, W>(site: &S, config: &ProfiledConfig, watch: &mut W, completion: &Completion)
    where
        S: CallSite,
        W: StopWatch,
    {
        let context = TemplateContext::new(site);
        let context = match completion {
            Completion::Returned(value) => context.with_return(value.as_ref()),
            Completion::Failed(cause) => context.with_exception(cause),
        };

        let tag = if config.uses_default_tag() {
            site.method_name().to_string()
        } else {
            template::render(&config.tag, &context, config.evaluate_expressions)
        };
        let message = template::render(&config.message, &context, config.evaluate_expressions);

        match completion {
            Completion::Returned(_) if config.log_failures_separately => {
                watch.stop(&format!("{tag}{SUCCESS_SUFFIX}"), &message);
            }
            Completion::Returned(_) => {
                watch.stop(&tag, &message);
            }
            Completion::Failed(cause) if config.log_failures_separately => {
                watch.fail(&format!("{tag}{FAILURE_SUFFIX}"), &message, cause);
            }
            Completion::Failed(cause) => {
                watch.fail(&tag, &message, cause);
            }
        }
    }
}
