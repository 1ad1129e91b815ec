// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Failure classification
//!
//! A profiled call can end in three ways besides returning:
//!
//! - it returns `Err(e)`: a business failure, handed back unchanged
//! - it panics: an unchecked failure, recorded and then resumed with the
//!   original payload, so callers that catch panics see the same payload
//! - it panics underneath a host boundary that cannot unwind
//!
//! The last case is the single place where a failure changes identity. A host
//! whose calling convention only admits `Result` receives the panic as a
//! [`WrappedPanic`], and [`Propagated::BoundaryWrapped`] marks that
//! conversion explicitly. Only panics are converted; `Err` values pass
//! through as [`Propagated::Original`].

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;

/// A panic captured at a boundary that cannot propagate it
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("profiled call panicked: {message}")]
pub struct WrappedPanic {
    message: String,
}

impl WrappedPanic {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn from_payload(payload: &(dyn Any + Send)) -> Self {
        Self::new(panic_message(payload))
    }

    /// The panic message
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Outcome of a failed call as seen at the host boundary
#[derive(Debug)]
pub enum Propagated<E> {
    /// The call's own error, identical to what it returned
    Original(E),
    /// A panic converted into an error
    BoundaryWrapped(WrappedPanic),
}

impl<E> Propagated<E> {
    pub fn is_boundary_wrapped(&self) -> bool {
        matches!(self, Propagated::BoundaryWrapped(_))
    }

    /// The original error, if this failure was not converted
    pub fn into_original(self) -> Option<E> {
        match self {
            Propagated::Original(e) => Some(e),
            Propagated::BoundaryWrapped(_) => None,
        }
    }
}

impl<E: fmt::Display> fmt::Display for Propagated<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Propagated::Original(e) => e.fmt(f),
            Propagated::BoundaryWrapped(w) => w.fmt(f),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for Propagated<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Propagated::Original(e) => e.source(),
            Propagated::BoundaryWrapped(_) => None,
        }
    }
}

/// Run `call`, converting a panic into [`Propagated::BoundaryWrapped`]
pub fn catch_boundary<T, E>(call: impl FnOnce() -> Result<T, E>) -> Result<T, Propagated<E>> {
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(Propagated::Original(e)),
        Err(payload) => Err(Propagated::BoundaryWrapped(WrappedPanic::from_payload(
            &*payload,
        ))),
    }
}

/// Best-effort text of a panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "Box<dyn Any>".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Declined(u32);

    #[test]
    fn test_err_passes_through() {
        let result: Result<(), _> = catch_boundary(|| Err(Declined(7)));

        match result {
            Err(Propagated::Original(e)) => assert_eq!(e, Declined(7)),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_panic_is_wrapped() {
        let result: Result<(), Propagated<Declined>> = catch_boundary(|| panic!("disk on fire"));

        let failure = result.unwrap_err();
        assert!(failure.is_boundary_wrapped());
        match failure {
            Propagated::BoundaryWrapped(wrapped) => {
                assert_eq!(wrapped.message(), "disk on fire");
                assert_eq!(wrapped.to_string(), "profiled call panicked: disk on fire");
            }
            Propagated::Original(e) => panic!("unexpected original: {e:?}"),
        }
    }

    #[test]
    fn test_panic_messages() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&format!("owned {}", 1)), "owned 1");
        assert_eq!(panic_message(&42u8), "Box<dyn Any>");
    }
}
