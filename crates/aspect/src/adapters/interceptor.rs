// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Interceptor adapter
//!
//! Binds a host framework's invocation context to the timing engine. The host
//! calls [`TimingInterceptor::around_invoke`] once per intercepted call and
//! hands over its context; the interceptor resolves the config, asks its
//! factory for a stopwatch and runs the engine.
//!
//! ## Boundary contract
//!
//! The host admits only `Result<Value, InvocationError>` and must not be
//! unwound through. Errors produced by the target pass through unchanged. A
//! panic raised by the target is the one failure that cannot, so it is
//! converted into [`InvocationError::Panicked`]. This changes the failure's
//! identity and is a limitation of the boundary, not something callers should
//! rely on. [`TimingInterceptor::invoke_classified`] exposes the distinction
//! as a [`Propagated`].
//!
//! A panic while resolving the config or creating the stopwatch is logged and
//! the call runs untimed; it is never reported as the target's failure.

use serde_json::Value;
use std::any::Any;
use std::sync::Arc;
use thiserror::Error;
use timing_aspect_profiled::{MethodRef, ProfiledRegistry};
use timing_aspect_stopwatch::StopWatchFactory;

use super::isolate_setup;
use crate::engine::TimingEngine;
use crate::failure::{Propagated, WrappedPanic, catch_boundary};
use crate::join_point::{CallSite, JoinPoint};
use crate::resolve::ConfigResolver;
use crate::variables::Variables;

/// Result type alias for host invocations
pub type InvocationResult = Result<Value, InvocationError>;

/// Failures visible to the host
#[derive(Debug, Error)]
pub enum InvocationError {
    /// Error raised by the target method
    #[error("{0}")]
    Application(Box<dyn std::error::Error + Send + Sync>),

    /// Failure reported by the host runtime itself
    #[error("System failure: {message}")]
    System { message: String },

    /// A panic converted at the boundary
    #[error(transparent)]
    Panicked(#[from] WrappedPanic),
}

impl InvocationError {
    pub fn application(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Application(error.into())
    }

    pub fn system(message: impl Into<String>) -> Self {
        Self::System {
            message: message.into(),
        }
    }

    /// Whether this error is a converted panic rather than the target's own
    pub fn is_boundary_wrapped(&self) -> bool {
        matches!(self, Self::Panicked(_))
    }
}

impl From<Propagated<InvocationError>> for InvocationError {
    fn from(failure: Propagated<InvocationError>) -> Self {
        match failure {
            Propagated::Original(error) => error,
            Propagated::BoundaryWrapped(panic) => Self::Panicked(panic),
        }
    }
}

/// Invocation context supplied by the host framework
pub trait InvocationContext {
    /// Continue the intercepted call
    fn proceed(&mut self) -> InvocationResult;

    /// Instance the call runs on
    fn target(&self) -> Option<&dyn Any> {
        None
    }

    fn parameters(&self) -> &[Value];

    /// The intercepted method, if the host can identify it
    fn method(&self) -> Option<&MethodRef>;

    /// Variables the host wants available to templates
    fn context_data(&self) -> Variables {
        Variables::new()
    }
}

/// [`JoinPoint`] over a host [`InvocationContext`]
pub struct InvocationJoinPoint<'a, C: ?Sized> {
    context: &'a mut C,
    variables: Variables,
}

impl<'a, C: InvocationContext + ?Sized> InvocationJoinPoint<'a, C> {
    /// Wrap `context`, seeding variables from its context data
    pub fn new(context: &'a mut C) -> Self {
        let variables = context.context_data();
        Self { context, variables }
    }
}

impl<C: InvocationContext + ?Sized> CallSite for InvocationJoinPoint<'_, C> {
    fn executing_object(&self) -> Option<&dyn Any> {
        self.context.target()
    }

    fn parameters(&self) -> &[Value] {
        self.context.parameters()
    }

    fn method_name(&self) -> &str {
        self.context.method().map_or("", MethodRef::name)
    }

    fn declaring_type(&self) -> Option<&str> {
        self.context.method().map(MethodRef::declaring_type)
    }

    fn additional_variables(&self) -> &Variables {
        &self.variables
    }

    fn additional_variables_mut(&mut self) -> &mut Variables {
        &mut self.variables
    }
}

impl<C: InvocationContext + ?Sized> JoinPoint for InvocationJoinPoint<'_, C> {
    type Output = Value;
    type Error = InvocationError;

    fn proceed(&mut self) -> InvocationResult {
        self.context.proceed()
    }

    fn render_output(&self, output: &Value) -> Option<Value> {
        Some(output.clone())
    }
}

/// Entry point invoked by the host for every intercepted call
#[derive(Debug, Clone)]
pub struct TimingInterceptor<F> {
    factory: F,
    resolver: ConfigResolver,
}

impl<F: StopWatchFactory> TimingInterceptor<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            resolver: ConfigResolver::new(),
        }
    }

    pub fn with_resolver(mut self, resolver: ConfigResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Consult `registry` for methods without their own metadata
    pub fn with_registry(mut self, registry: impl Into<Arc<ProfiledRegistry>>) -> Self {
        self.resolver = self.resolver.with_registry(registry);
        self
    }

    pub fn resolver(&self) -> &ConfigResolver {
        &self.resolver
    }

    /// Time one host invocation
    ///
    /// # Errors
    ///
    /// Returns the target's own `InvocationError` unchanged, or
    /// `InvocationError::Panicked` if the target panicked.
    pub fn around_invoke<C>(&self, context: &mut C) -> InvocationResult
    where
        C: InvocationContext + ?Sized,
    {
        self.invoke_classified(context)
            .map_err(InvocationError::from)
    }

    /// Like [`around_invoke`](Self::around_invoke), keeping converted panics
    /// distinguishable from the target's own errors
    pub fn invoke_classified<C>(
        &self,
        context: &mut C,
    ) -> Result<Value, Propagated<InvocationError>>
    where
        C: InvocationContext + ?Sized,
    {
        let prepared = isolate_setup(|| {
            let config = self.resolver.resolve(context.method());
            let watch = self
                .factory
                .new_stop_watch(&config.logger, config.severity());
            (config, watch)
        });

        catch_boundary(|| {
            let mut join_point = InvocationJoinPoint::new(context);
            match prepared {
                Some((config, watch)) => TimingEngine::run(&mut join_point, &config, watch),
                None => TimingEngine::run_untimed(&mut join_point),
            }
        })
    }
}
