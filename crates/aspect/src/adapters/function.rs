// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Closure adapter
//!
//! Registration-based interception for plain Rust code: the call is a
//! closure, the method identity is supplied by the caller, and the config
//! comes from a [`ProfiledRegistry`].
//!
//! ```rust
//! use std::sync::Arc;
//! use timing_aspect::{Profiler, profile_call};
//! use timing_aspect_profiled::{ProfiledConfig, ProfiledRegistry};
//! use timing_aspect_stopwatch::{LoggingStopWatchFactory, TracingSink};
//!
//! let registry = ProfiledRegistry::new()
//!     .with_method("billing::Invoices", "issue", ProfiledConfig::new("invoice.{$0}"))
//!     .unwrap();
//! let profiler = Profiler::new(LoggingStopWatchFactory::new(TracingSink::new()))
//!     .with_registry(Arc::new(registry));
//!
//! let total: Result<u32, std::fmt::Error> =
//!     profile_call!(profiler, "billing::Invoices", "issue", ["eu"], Ok(42));
//! assert_eq!(total, Ok(42));
//! ```

use serde::Serialize;
use serde_json::Value;
use std::fmt::Display;
use std::sync::Arc;
use timing_aspect_profiled::{ProfiledConfig, ProfiledRegistry};
use timing_aspect_stopwatch::StopWatchFactory;

use super::{isolate_setup, serialize_output};
use crate::engine::TimingEngine;
use crate::join_point::{CallSite, JoinPoint};
use crate::resolve::ConfigResolver;
use crate::variables::Variables;

/// [`JoinPoint`] over a closure
pub struct FnJoinPoint<F, T> {
    call: Option<F>,
    method_name: String,
    declaring_type: Option<String>,
    parameters: Vec<Value>,
    variables: Variables,
    render: Option<fn(&T) -> Option<Value>>,
}

impl<F, T> FnJoinPoint<F, T> {
    pub fn new<E>(method_name: impl Into<String>, call: F) -> Self
    where
        F: FnOnce() -> Result<T, E>,
    {
        Self {
            call: Some(call),
            method_name: method_name.into(),
            declaring_type: None,
            parameters: Vec::new(),
            variables: Variables::new(),
            render: None,
        }
    }

    pub fn with_declaring_type(mut self, declaring_type: impl Into<String>) -> Self {
        self.declaring_type = Some(declaring_type.into());
        self
    }

    pub fn with_parameters(mut self, parameters: Vec<Value>) -> Self {
        self.parameters = parameters;
        self
    }

    /// Seed a template variable
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// Whether `proceed` has already consumed the closure
    pub fn is_spent(&self) -> bool {
        self.call.is_none()
    }
}

impl<F, T: Serialize> FnJoinPoint<F, T> {
    /// Expose the return value to `{$return}` expressions
    pub fn rendering_output(mut self) -> Self {
        self.render = Some(serialize_output::<T>);
        self
    }
}

impl<F, T> CallSite for FnJoinPoint<F, T> {
    fn parameters(&self) -> &[Value] {
        &self.parameters
    }

    fn method_name(&self) -> &str {
        &self.method_name
    }

    fn declaring_type(&self) -> Option<&str> {
        self.declaring_type.as_deref()
    }

    fn additional_variables(&self) -> &Variables {
        &self.variables
    }

    fn additional_variables_mut(&mut self) -> &mut Variables {
        &mut self.variables
    }
}

impl<F, T, E> JoinPoint for FnJoinPoint<F, T>
where
    F: FnOnce() -> Result<T, E>,
{
    type Output = T;
    type Error = E;

    /// # Panics
    ///
    /// Panics if called a second time; the closure runs at most once.
    fn proceed(&mut self) -> Result<T, E> {
        match self.call.take() {
            Some(call) => call(),
            None => panic!("join point for `{}` proceeded twice", self.method_name),
        }
    }

    fn render_output(&self, output: &T) -> Option<Value> {
        self.render.and_then(|render| render(output))
    }
}

/// Times closures under configs resolved by `(type, method)`
#[derive(Debug, Clone)]
pub struct Profiler<F> {
    factory: F,
    resolver: ConfigResolver,
}

impl<F: StopWatchFactory> Profiler<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            resolver: ConfigResolver::new(),
        }
    }

    pub fn with_registry(mut self, registry: impl Into<Arc<ProfiledRegistry>>) -> Self {
        self.resolver = self.resolver.with_registry(registry);
        self
    }

    pub fn with_resolver(mut self, resolver: ConfigResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn resolver(&self) -> &ConfigResolver {
        &self.resolver
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Time `call` as `declaring_type::method` with the given arguments
    ///
    /// Returns exactly what `call` returned.
    pub fn profile<T, E, C>(
        &self,
        declaring_type: &str,
        method: &str,
        parameters: Vec<Value>,
        call: C,
    ) -> Result<T, E>
    where
        C: FnOnce() -> Result<T, E>,
        E: Display,
    {
        let mut join_point = FnJoinPoint::new(method, call)
            .with_declaring_type(declaring_type)
            .with_parameters(parameters);
        self.profile_join_point(&mut join_point)
    }

    /// Time any join point, resolving its config by declaring type and name
    pub fn profile_join_point<J>(&self, join_point: &mut J) -> Result<J::Output, J::Error>
    where
        J: JoinPoint,
        J::Error: Display,
    {
        match isolate_setup(|| self.prepare(&*join_point)) {
            Some((config, watch)) => TimingEngine::run(join_point, &config, watch),
            None => TimingEngine::run_untimed(join_point),
        }
    }

    /// Async counterpart of [`profile_join_point`](Self::profile_join_point)
    #[cfg(feature = "async")]
    pub async fn profile_async<J>(&self, join_point: &mut J) -> Result<J::Output, J::Error>
    where
        J: crate::join_point::AsyncJoinPoint,
        J::Error: Display,
        F::Watch: Send,
    {
        match isolate_setup(|| self.prepare(&*join_point)) {
            Some((config, watch)) => TimingEngine::run_async(join_point, &config, watch).await,
            None => join_point.proceed().await,
        }
    }

    fn prepare<S: CallSite + ?Sized>(&self, site: &S) -> (Arc<ProfiledConfig>, F::Watch) {
        let config = self
            .resolver
            .resolve_named(site.declaring_type().unwrap_or_default(), site.method_name());
        let watch = self
            .factory
            .new_stop_watch(&config.logger, config.severity());
        (config, watch)
    }

    /// Time `future` as `declaring_type::method`
    #[cfg(feature = "async")]
    pub async fn profile_future<T, E, Fut>(
        &self,
        declaring_type: &str,
        method: &str,
        parameters: Vec<Value>,
        future: Fut,
    ) -> Result<T, E>
    where
        Fut: std::future::Future<Output = Result<T, E>> + Send,
        T: Send,
        E: Send + Display,
        F::Watch: Send,
    {
        let mut join_point = super::future::FutureJoinPoint::new(method, future)
            .with_declaring_type(declaring_type)
            .with_parameters(parameters);
        self.profile_async(&mut join_point).await
    }
}

/// Time an expression through a [`Profiler`]
///
/// ```rust,ignore
/// profile_call!(profiler, "shop::Orders", "place", [order_id, region], place(order_id, region))
/// profile_call!(profiler, "shop::Orders", "list", list_orders())
/// ```
///
/// Arguments are converted with `serde_json::to_value`; values that fail to
/// convert appear as `null`. The body must evaluate to a `Result`.
#[macro_export]
macro_rules! profile_call {
    ($profiler:expr, $declaring_type:expr, $method:expr, [$($arg:expr),* $(,)?], $body:expr) => {
        $profiler.profile(
            $declaring_type,
            $method,
            ::std::vec![$($crate::__private::serde_json::to_value(&$arg)
                .unwrap_or($crate::__private::serde_json::Value::Null)),*],
            || $body,
        )
    };
    ($profiler:expr, $declaring_type:expr, $method:expr, $body:expr) => {
        $profiler.profile($declaring_type, $method, ::std::vec::Vec::new(), || $body)
    };
}
