// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Capturing `tracing` layer
//!
//! Collects every event into memory so tests can assert on diagnostics and on
//! records emitted through the tracing sink.
//!
//! ```rust
//! use timing_aspect_test_utils::CapturingLayer;
//! use tracing_subscriber::layer::SubscriberExt;
//!
//! let layer = CapturingLayer::new();
//! let subscriber = tracing_subscriber::registry().with(layer.clone());
//!
//! tracing::subscriber::with_default(subscriber, || {
//!     tracing::warn!(tag = "orders", "slow call");
//! });
//!
//! assert_eq!(layer.events()[0].field("tag"), Some("orders"));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

/// One captured event
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub target: String,
    pub message: String,
    pub fields: HashMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Layer that stores every event it sees
///
/// Clones share the same buffer, so keep one clone for assertions and hand
/// the other to the subscriber.
#[derive(Debug, Clone, Default)]
pub struct CapturingLayer {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl CapturingLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Events emitted under `target`
    pub fn events_for(&self, target: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.target == target)
            .collect()
    }

    /// Events at `level` or more severe
    pub fn events_at_least(&self, level: Level) -> Vec<CapturedEvent> {
        // tracing orders levels by verbosity: ERROR < WARN < ... < TRACE
        self.events()
            .into_iter()
            .filter(|e| e.level <= level)
            .collect()
    }
}

impl<S: Subscriber> Layer<S> for CapturingLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let captured = CapturedEvent {
            level: *meta.level(),
            target: meta.target().to_string(),
            message: visitor.message,
            fields: visitor.fields,
        };

        if let Ok(mut events) = self.events.lock() {
            events.push(captured);
        }
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: HashMap<String, String>,
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.fields
                .insert(field.name().to_string(), format!("{value:?}"));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields
                .insert(field.name().to_string(), value.to_string());
        }
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields
            .insert(field.name().to_string(), value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields
            .insert(field.name().to_string(), value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields
            .insert(field.name().to_string(), value.to_string());
    }
}
