// End to end in memory tests for the change poller.
//
// Responsibilities
// - Drive full cycles through the public API with the in memory object store and sync tool.
// - Assert the watermark rules: forward only, untouched on failure, strictly greater change detection.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use realtime_sync::adapters::in_memory::in_memory_object_store::InMemoryObjectStore;
use realtime_sync::adapters::in_memory::in_memory_sync_tool::InMemorySyncTool;
use realtime_sync::application::errors::PollerError;
use realtime_sync::application::poller::runner::{ChangePoller, CycleOutcome};
use realtime_sync::application::poller::startup::StartupPolicy;
use realtime_sync::core::object_record::ObjectRecord;
use realtime_sync::core::watermark::Watermark;
use rstest::{fixture, rstest};
use std::sync::Arc;
use std::time::Duration;

const BUCKET: &str = "xsky-data";

struct Harness {
    store: Arc<InMemoryObjectStore>,
    sync_tool: Arc<InMemorySyncTool>,
    poller: ChangePoller<InMemoryObjectStore, InMemorySyncTool>,
}

impl Harness {
    fn start(&self) -> DateTime<Utc> {
        self.poller.watermark().at()
    }

    async fn put(&self, key: &str, at: DateTime<Utc>) {
        self.store.put(BUCKET, ObjectRecord::new(key, at, 1)).await;
    }
}

fn harness_with(sync_tool: InMemorySyncTool) -> Harness {
    let store = Arc::new(InMemoryObjectStore::new());
    let sync_tool = Arc::new(sync_tool);
    let start = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
    let poller = ChangePoller::new(BUCKET, Duration::from_secs(10), store.clone(), sync_tool.clone())
        .with_startup_policy(StartupPolicy::single_attempt())
        .with_watermark(Watermark::starting_at(start));
    Harness {
        store,
        sync_tool,
        poller,
    }
}

#[fixture]
fn before_each() -> Harness {
    harness_with(InMemorySyncTool::new())
}

#[rstest]
#[tokio::test]
async fn detects_only_objects_modified_strictly_after_the_watermark(before_each: Harness) {
    let harness = before_each;
    let start = harness.start();
    harness.put("t1.bin", start - ChronoDuration::seconds(1)).await;
    harness.put("t2.bin", start).await;
    harness.put("t3.bin", start + ChronoDuration::seconds(1)).await;

    let changes = harness
        .poller
        .list_changes_since(harness.poller.watermark())
        .await
        .unwrap();

    let keys: Vec<&str> = changes.iter().map(|record| record.key.as_str()).collect();
    assert_eq!(keys, vec!["t3.bin"]);
}

#[rstest]
#[tokio::test]
async fn startup_fails_when_the_bucket_does_not_exist(before_each: Harness) {
    let mut harness = before_each;
    let result = harness.poller.run(std::future::pending()).await;
    assert!(matches!(result, Err(PollerError::BucketNotFound { ref bucket }) if bucket == BUCKET));
    assert_eq!(harness.sync_tool.invocations(), 0);
}

#[rstest]
#[tokio::test]
async fn clean_cycle_triggers_no_sync(before_each: Harness) {
    let mut harness = before_each;
    harness.store.create_bucket(BUCKET).await;
    let before = harness.poller.watermark();

    assert_eq!(harness.poller.poll_once().await, CycleOutcome::Idle);
    assert_eq!(harness.sync_tool.invocations(), 0);
    assert_eq!(harness.poller.watermark(), before);
}

#[rstest]
#[tokio::test]
async fn successful_sync_advances_the_watermark_past_sync_completion(before_each: Harness) {
    let mut harness = before_each;
    let start = harness.start();
    harness.put("a.bin", start + ChronoDuration::seconds(3)).await;
    harness.put("b.bin", start + ChronoDuration::seconds(4)).await;
    let before = harness.poller.watermark();

    let outcome = harness.poller.poll_once().await;
    let completed_by = Utc::now();

    let CycleOutcome::Synced { changes, watermark } = outcome else {
        panic!("unexpected outcome: {outcome:?}");
    };
    assert_eq!(changes, 2);
    assert!(watermark <= completed_by);
    assert!(harness.poller.watermark() >= before);
    assert_eq!(harness.sync_tool.invocations(), 1);
    assert_eq!(harness.poller.poll_once().await, CycleOutcome::Idle);
}

#[rstest]
#[tokio::test]
async fn failed_sync_is_retried_on_the_next_cycle() {
    let mut harness = harness_with(InMemorySyncTool::with_exit_codes([3]));
    let start = harness.start();
    harness.put("a.bin", start + ChronoDuration::seconds(1)).await;
    let before = harness.poller.watermark();

    assert_eq!(
        harness.poller.poll_once().await,
        CycleOutcome::SyncFailed { changes: 1 }
    );
    assert_eq!(harness.poller.watermark(), before);

    let pending = harness
        .poller
        .list_changes_since(harness.poller.watermark())
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].key, "a.bin");
}

#[rstest]
#[tokio::test]
async fn objects_arriving_after_a_failed_sync_join_the_retry() {
    let mut harness = harness_with(InMemorySyncTool::with_exit_codes([1]));
    let start = harness.start();
    harness.put("a.bin", start + ChronoDuration::seconds(1)).await;
    assert!(matches!(
        harness.poller.poll_once().await,
        CycleOutcome::SyncFailed { .. }
    ));

    harness.put("b.bin", start + ChronoDuration::seconds(2)).await;
    assert!(matches!(
        harness.poller.poll_once().await,
        CycleOutcome::Synced { changes: 2, .. }
    ));
}

#[rstest]
#[tokio::test]
async fn watermark_never_decreases_across_cycles(before_each: Harness) {
    let mut harness = before_each;
    let mut previous = harness.poller.watermark();

    for round in 1..=3 {
        let at = previous.at() + ChronoDuration::seconds(1);
        harness.put(&format!("round-{round}.bin"), at).await;
        harness.poller.poll_once().await;
        assert!(harness.poller.watermark() >= previous);
        previous = harness.poller.watermark();
    }
    assert_eq!(harness.sync_tool.invocations(), 3);
}

#[rstest]
#[tokio::test]
async fn listing_failure_is_distinct_from_idle(before_each: Harness) {
    let mut harness = before_each;
    harness.store.create_bucket(BUCKET).await;
    harness.store.toggle_offline();

    assert_eq!(harness.poller.poll_once().await, CycleOutcome::ListingFailed);

    harness.store.toggle_offline();
    assert_eq!(harness.poller.poll_once().await, CycleOutcome::Idle);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn run_stops_when_shutdown_is_requested(before_each: Harness) {
    let mut harness = before_each;
    harness.store.create_bucket(BUCKET).await;
    let (stop, stopped) = tokio::sync::oneshot::channel::<()>();

    let stop_later = async move {
        tokio::time::sleep(Duration::from_secs(25)).await;
        let _ = stop.send(());
    };
    let shutdown = async move {
        let _ = stopped.await;
    };

    let (result, _) = tokio::join!(harness.poller.run(shutdown), stop_later);
    assert!(result.is_ok());
    assert_eq!(harness.sync_tool.invocations(), 0);
}
