// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Ambient template variables: call depth and thread identity.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

/// Variable name to value, consulted by tag and message templates
pub type Variables = HashMap<String, Value>;

/// Depth of the current call, 1 for the outermost
pub const DEPTH: &str = "$depth";

/// Name of the calling thread
pub const THREAD_NAME: &str = "$threadName";

/// Process-unique id of the calling thread
pub const THREAD_ID: &str = "$threadId";

/// Rendered for threads spawned without a name
pub const UNNAMED_THREAD: &str = "unnamed";

static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static CURRENT_THREAD_ID: u64 = NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed);
}

/// Stable numeric id of the calling thread, assigned on first use
pub fn thread_id() -> u64 {
    CURRENT_THREAD_ID.with(|id| *id)
}

pub fn thread_name() -> String {
    thread::current()
        .name()
        .unwrap_or(UNNAMED_THREAD)
        .to_string()
}

/// Add `$depth`, `$threadName` and `$threadId` to `variables`
///
/// Seeded variables with the same names are overwritten.
pub fn insert_ambient(variables: &mut Variables, depth: u64) {
    variables.insert(DEPTH.to_string(), Value::from(depth));
    variables.insert(THREAD_NAME.to_string(), Value::from(thread_name()));
    variables.insert(THREAD_ID.to_string(), Value::from(thread_id()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_ambient() {
        let mut variables = Variables::new();
        variables.insert("$tenant".to_string(), Value::from("acme"));

        insert_ambient(&mut variables, 3);

        assert_eq!(variables[DEPTH], 3);
        assert_eq!(variables[THREAD_ID], thread_id());
        assert_eq!(variables["$tenant"], "acme");
    }

    #[test]
    fn test_thread_ids_are_stable_and_distinct() {
        let here = thread_id();
        assert_eq!(thread_id(), here);

        let there = thread::spawn(thread_id).join().unwrap();
        assert_ne!(there, here);
        assert!(there >= 1);
    }

    #[test]
    fn test_thread_names() {
        let named = thread::Builder::new()
            .name("worker-7".to_string())
            .spawn(thread_name)
            .unwrap()
            .join()
            .unwrap();
        assert_eq!(named, "worker-7");

        let unnamed = thread::spawn(thread_name).join().unwrap();
        assert_eq!(unnamed, UNNAMED_THREAD);
    }
}
