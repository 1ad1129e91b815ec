// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Async timing: task-local depth and future join points

#![cfg(feature = "async")]

use serde_json::json;
use std::sync::Arc;
use timing_aspect::{CallDepthTracker, FutureJoinPoint, Profiler, TimingEngine};
use timing_aspect_profiled::{Level, ProfiledConfig, ProfiledRegistry};
use timing_aspect_stopwatch::{LoggingStopWatch, LoggingStopWatchFactory, Outcome};
use timing_aspect_test_utils::RecordingSink;

type TestProfiler = Profiler<LoggingStopWatchFactory<RecordingSink>>;

fn profiler() -> (Arc<RecordingSink>, TestProfiler) {
    let registry = ProfiledRegistry::new()
        .with_method("jobs::Sync", "outer", ProfiledConfig::new("outer@{$depth}"))
        .unwrap()
        .with_method("jobs::Sync", "inner", ProfiledConfig::new("inner@{$depth}"))
        .unwrap();
    let sink = Arc::new(RecordingSink::new());
    let profiler = Profiler::new(LoggingStopWatchFactory::from_shared(Arc::clone(&sink)))
        .with_registry(registry);
    (sink, profiler)
}

async fn nested(profiler: &TestProfiler) -> Result<(Option<u64>, Option<u64>), String> {
    profiler
        .profile_future("jobs::Sync", "outer", vec![], async {
            let outer = CallDepthTracker::current_task();
            let inner = profiler
                .profile_future("jobs::Sync", "inner", vec![], async {
                    tokio::task::yield_now().await;
                    Ok::<_, String>(CallDepthTracker::current_task())
                })
                .await?;
            Ok::<_, String>((outer, inner))
        })
        .await
}

#[tokio::test]
async fn test_nested_futures_share_task_depth() {
    let (sink, profiler) = profiler();

    let depths = nested(&profiler).await;

    assert_eq!(depths, Ok((Some(1), Some(2))));
    assert_eq!(sink.tags(), vec!["inner@2", "outer@1"]);
    assert_eq!(CallDepthTracker::current_task(), None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_spawned_tasks_count_independently() {
    let (sink, profiler) = profiler();
    let profiler = Arc::new(profiler);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let profiler = Arc::clone(&profiler);
            tokio::spawn(async move { nested(&profiler).await })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap(), Ok((Some(1), Some(2))));
    }
    assert_eq!(sink.len(), 8);
}

#[tokio::test]
async fn test_async_error_returned_unchanged() {
    let (sink, profiler) = profiler();

    let result: Result<u32, String> = profiler
        .profile_future("jobs::Sync", "outer", vec![json!("eu")], async {
            Err("queue closed".to_string())
        })
        .await;

    assert_eq!(result, Err("queue closed".to_string()));
    let record = sink.single();
    assert_eq!(record.outcome, Outcome::Failure);
    assert_eq!(record.failure.as_deref(), Some("queue closed"));
}

#[tokio::test]
async fn test_run_async_renders_return() {
    let sink = Arc::new(RecordingSink::new());
    let watch = LoggingStopWatch::new(Arc::clone(&sink), "timing", Level::Debug);
    let config = ProfiledConfig::new("fetch.{$0}").with_message("{$return.rows}");
    let mut join_point = FutureJoinPoint::new("fetch", async { Ok::<_, String>(json!({"rows": 3})) })
        .with_parameters(vec![json!("users")])
        .rendering_output();

    let result = TimingEngine::run_async(&mut join_point, &config, watch).await;

    assert_eq!(result, Ok(json!({"rows": 3})));
    let record = sink.single();
    assert_eq!(record.tag, "fetch.users");
    assert_eq!(record.message.as_deref(), Some("3"));
    assert_eq!(record.level, Level::Debug);
}

#[test]
fn test_runs_on_any_executor() {
    let (sink, profiler) = profiler();

    let depths = tokio_test::block_on(nested(&profiler));

    assert_eq!(depths, Ok((Some(1), Some(2))));
    assert_eq!(sink.len(), 2);
}

async fn lose_worker() -> Result<(), String> {
    panic!("worker lost")
}

#[tokio::test]
async fn test_panicking_future_is_recorded_then_resumed() {
    let (sink, profiler) = profiler();
    let profiler = Arc::new(profiler);

    let handle = tokio::spawn(async move {
        profiler
            .profile_future("jobs::Sync", "outer", vec![], lose_worker())
            .await
    });
    let error = handle.await.unwrap_err();

    assert!(error.is_panic());
    let payload = error.into_panic();
    assert_eq!(payload.downcast_ref::<&str>(), Some(&"worker lost"));

    let record = sink.single();
    assert_eq!(record.tag, "outer@1");
    assert_eq!(record.outcome, Outcome::Failure);
    assert_eq!(record.failure.as_deref(), Some("worker lost"));
}
