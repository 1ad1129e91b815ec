// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! [`AsyncJoinPoint`] over a future.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;

use super::serialize_output;
use crate::join_point::{AsyncJoinPoint, CallSite};
use crate::variables::Variables;

/// Join point that awaits a future exactly once
pub struct FutureJoinPoint<Fut, T> {
    future: Option<Fut>,
    method_name: String,
    declaring_type: Option<String>,
    parameters: Vec<Value>,
    variables: Variables,
    render: Option<fn(&T) -> Option<Value>>,
}

impl<Fut, T, E> FutureJoinPoint<Fut, T>
where
    Fut: Future<Output = Result<T, E>>,
{
    pub fn new(method_name: impl Into<String>, future: Fut) -> Self {
        Self {
            future: Some(future),
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

    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }
}

impl<Fut, T: Serialize> FutureJoinPoint<Fut, T> {
    /// Expose the resolved value to `{$return}` expressions
    pub fn rendering_output(mut self) -> Self {
        self.render = Some(serialize_output::<T>);
        self
    }
}

impl<Fut, T> CallSite for FutureJoinPoint<Fut, T> {
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

#[async_trait]
impl<Fut, T, E> AsyncJoinPoint for FutureJoinPoint<Fut, T>
where
    Fut: Future<Output = Result<T, E>> + Send,
    T: Send,
    E: Send,
{
    type Output = T;
    type Error = E;

    /// # Panics
    ///
    /// Panics if awaited a second time.
    async fn proceed(&mut self) -> Result<T, E> {
        match self.future.take() {
            Some(future) => future.await,
            None => panic!("join point for `{}` proceeded twice", self.method_name),
        }
    }

    fn render_output(&self, output: &T) -> Option<Value> {
        self.render.and_then(|render| render(output))
    }
}
