// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Mock invocation contexts and scripted join points
//!
//! Both record how often they were proceeded and what call depth was active
//! at that moment, so tests can assert on the engine's bookkeeping.

use serde_json::Value;
use std::any::Any;
use std::thread;
use std::time::Duration;
use thiserror::Error;
use timing_aspect::{
    CallDepthTracker, CallSite, InvocationContext, InvocationError, InvocationResult, JoinPoint,
    Variables,
};
use timing_aspect_profiled::{MethodRef, ProfiledConfig};

type Behaviour = Box<dyn FnMut(&[Value]) -> InvocationResult + Send>;

/// Host invocation context with a programmable target
pub struct MockInvocationContext {
    method: Option<MethodRef>,
    parameters: Vec<Value>,
    target: Option<Box<dyn Any + Send>>,
    context_data: Variables,
    behaviour: Behaviour,
    calls: usize,
    observed_depth: Option<u64>,
}

impl MockInvocationContext {
    /// Context for `declaring_type::method` whose target returns `null`
    pub fn new(declaring_type: &str, method: &str) -> Self {
        Self {
            method: Some(MethodRef::new(declaring_type, method)),
            parameters: Vec::new(),
            target: None,
            context_data: Variables::new(),
            behaviour: Box::new(|_| Ok(Value::Null)),
            calls: 0,
            observed_depth: None,
        }
    }

    /// Context whose host cannot identify the method
    pub fn without_method() -> Self {
        Self {
            method: None,
            ..Self::new("", "")
        }
    }

    /// Attach profiling metadata to the method
    pub fn with_profiled(mut self, config: ProfiledConfig) -> Self {
        self.method = self.method.map(|m| m.with_profiled(config));
        self
    }

    pub fn with_parameters(mut self, parameters: Vec<Value>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_target<T: Any + Send>(mut self, target: T) -> Self {
        self.target = Some(Box::new(target));
        self
    }

    pub fn with_context_data(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.context_data.insert(name.to_string(), value.into());
        self
    }

    /// Target returns `value`
    pub fn returning(mut self, value: Value) -> Self {
        self.behaviour = Box::new(move |_| Ok(value.clone()));
        self
    }

    /// Target computes its result from the arguments
    pub fn answering(
        mut self,
        behaviour: impl FnMut(&[Value]) -> InvocationResult + Send + 'static,
    ) -> Self {
        self.behaviour = Box::new(behaviour);
        self
    }

    /// Target fails with the error built by `error`
    pub fn failing_with(mut self, error: impl Fn() -> InvocationError + Send + 'static) -> Self {
        self.behaviour = Box::new(move |_| Err(error()));
        self
    }

    /// Target panics with `message`
    pub fn panicking(mut self, message: &str) -> Self {
        let message = message.to_string();
        self.behaviour = Box::new(move |_| panic!("{}", message));
        self
    }

    /// Number of times the target ran
    pub fn calls(&self) -> usize {
        self.calls
    }

    /// Call depth seen by the target on its last run
    pub fn observed_depth(&self) -> Option<u64> {
        self.observed_depth
    }
}

impl InvocationContext for MockInvocationContext {
    fn proceed(&mut self) -> InvocationResult {
        self.calls += 1;
        self.observed_depth = Some(CallDepthTracker::current());
        (self.behaviour)(&self.parameters)
    }

    fn target(&self) -> Option<&dyn Any> {
        self.target.as_deref().map(|t| t as &dyn Any)
    }

    fn parameters(&self) -> &[Value] {
        &self.parameters
    }

    fn method(&self) -> Option<&MethodRef> {
        self.method.as_ref()
    }

    fn context_data(&self) -> Variables {
        self.context_data.clone()
    }
}

/// Error returned by a [`ScriptedJoinPoint`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ScriptedError(pub String);

/// What a [`ScriptedJoinPoint`] does when proceeded
#[derive(Debug, Clone)]
pub enum Script {
    Return(Value),
    Fail(String),
    Panic(String),
    /// Sleep, then return
    Sleep(Duration, Value),
}

/// Join point that plays back a [`Script`]
#[derive(Debug)]
pub struct ScriptedJoinPoint {
    script: Script,
    method_name: String,
    declaring_type: Option<String>,
    parameters: Vec<Value>,
    variables: Variables,
    calls: usize,
    observed_depth: Option<u64>,
}

impl ScriptedJoinPoint {
    pub fn new(method_name: &str, script: Script) -> Self {
        Self {
            script,
            method_name: method_name.to_string(),
            declaring_type: None,
            parameters: Vec::new(),
            variables: Variables::new(),
            calls: 0,
            observed_depth: None,
        }
    }

    pub fn returning(method_name: &str, value: Value) -> Self {
        Self::new(method_name, Script::Return(value))
    }

    pub fn failing(method_name: &str, message: &str) -> Self {
        Self::new(method_name, Script::Fail(message.to_string()))
    }

    pub fn panicking(method_name: &str, message: &str) -> Self {
        Self::new(method_name, Script::Panic(message.to_string()))
    }

    pub fn sleeping(method_name: &str, duration: Duration) -> Self {
        Self::new(method_name, Script::Sleep(duration, Value::Null))
    }

    pub fn with_declaring_type(mut self, declaring_type: &str) -> Self {
        self.declaring_type = Some(declaring_type.to_string());
        self
    }

    pub fn with_parameters(mut self, parameters: Vec<Value>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls
    }

    pub fn observed_depth(&self) -> Option<u64> {
        self.observed_depth
    }
}

impl CallSite for ScriptedJoinPoint {
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

impl JoinPoint for ScriptedJoinPoint {
    type Output = Value;
    type Error = ScriptedError;

    fn proceed(&mut self) -> Result<Value, ScriptedError> {
        self.calls += 1;
        self.observed_depth = Some(CallDepthTracker::current());

        match &self.script {
            Script::Return(value) => Ok(value.clone()),
            Script::Fail(message) => Err(ScriptedError(message.clone())),
            Script::Panic(message) => panic!("{}", message),
            Script::Sleep(duration, value) => {
                thread::sleep(*duration);
                Ok(value.clone())
            }
        }
    }

    fn render_output(&self, output: &Value) -> Option<Value> {
        Some(output.clone())
    }
}
