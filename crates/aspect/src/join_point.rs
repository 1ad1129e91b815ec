// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Join points
//!
//! A join point is one intercepted call: something that can be proceeded
//! with, plus what is known about it. The timing engine only talks to these
//! traits; every interception mechanism supplies its own implementation.
//!
//! - [`CallSite`]: the descriptive half (method, declaring type, arguments,
//!   template variables)
//! - [`JoinPoint`]: a synchronous call
//! - [`AsyncJoinPoint`]: a call that completes as a future (feature `async`)
//!
//! Arguments and return values are exposed as `serde_json::Value` so
//! templates can index into them.

use serde_json::Value;
use std::any::Any;

use crate::variables::Variables;

/// What is known about an intercepted call
pub trait CallSite {
    /// Instance the method runs on, absent for free functions
    fn executing_object(&self) -> Option<&dyn Any> {
        None
    }

    /// Arguments in declaration order
    fn parameters(&self) -> &[Value];

    /// Name of the called method; empty when the host could not tell
    fn method_name(&self) -> &str;

    /// Type that declares the method, if known
    fn declaring_type(&self) -> Option<&str>;

    fn additional_variables(&self) -> &Variables;

    /// Mutable access used by the engine to add depth and thread variables
    fn additional_variables_mut(&mut self) -> &mut Variables;
}

/// A synchronous intercepted call
///
/// `proceed` runs the wrapped call and is invoked exactly once per join point.
pub trait JoinPoint: CallSite {
    type Output;
    type Error;

    /// Execute the wrapped call
    fn proceed(&mut self) -> Result<Self::Output, Self::Error>;

    /// JSON view of a return value for `{$return}` expressions
    fn render_output(&self, _output: &Self::Output) -> Option<Value> {
        None
    }
}

/// An intercepted call that completes asynchronously
#[cfg(feature = "async")]
#[async_trait::async_trait]
pub trait AsyncJoinPoint: CallSite + Send {
    type Output: Send;
    type Error: Send;

    /// Execute the wrapped call
    async fn proceed(&mut self) -> Result<Self::Output, Self::Error>;

    /// JSON view of a return value for `{$return}` expressions
    fn render_output(&self, _output: &Self::Output) -> Option<Value> {
        None
    }
}
