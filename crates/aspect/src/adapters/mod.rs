// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Join point adapters, one per interception mechanism
//!
//! - [`interceptor`]: a host framework hands over an invocation context
//! - [`function`]: plain closures, configured through a registry
//! - `future`: futures, for the async engine (feature `async`)

pub mod function;
#[cfg(feature = "async")]
pub mod future;
pub mod interceptor;

use serde::Serialize;
use serde_json::Value;
use std::panic::{self, AssertUnwindSafe};

use crate::failure::panic_message;

fn serialize_output<T: Serialize>(output: &T) -> Option<Value> {
    serde_json::to_value(output).ok()
}

/// Resolve the config and create the watch, or `None` if either panicked
fn isolate_setup<T>(setup: impl FnOnce() -> T) -> Option<T> {
    match panic::catch_unwind(AssertUnwindSafe(setup)) {
        Ok(prepared) => Some(prepared),
        Err(payload) => {
            tracing::warn!("Timing skipped, setup failed: {}", panic_message(&*payload));
            None
        }
    }
}
