// Change poller: lists the bucket, detects changes against the watermark,
// triggers the sync tool, and advances the watermark on success.
//
// Purpose
// - Keep the mounted filesystem in step with the bucket by re-running the sync whenever objects change.
//
// Responsibilities
// - Verify the bucket before polling; a missing bucket is fatal.
// - Run one cycle at a time, sleeping the fixed interval between cycles.
// - Move the watermark only after a confirmed successful sync, to the time the sync finished.

use crate::application::errors::PollerError;
use crate::application::poller::startup::StartupPolicy;
use crate::core::object_record::ObjectRecord;
use crate::core::ports::{ObjectStore, ObjectStoreError, SyncTool};
use crate::core::watermark::Watermark;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// What a single poll cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Nothing changed since the watermark.
    Idle,
    /// The listing failed; nothing was synced and the watermark was kept.
    ListingFailed,
    Synced {
        changes: usize,
        watermark: DateTime<Utc>,
    },
    SyncFailed {
        changes: usize,
    },
}

pub struct ChangePoller<TStore, TSync>
where
    TStore: ObjectStore + 'static,
    TSync: SyncTool + 'static,
{
    bucket: String,
    interval: Duration,
    startup: StartupPolicy,
    store: Arc<TStore>,
    sync_tool: Arc<TSync>,
    watermark: Watermark,
}

impl<TStore, TSync> ChangePoller<TStore, TSync>
where
    TStore: ObjectStore + 'static,
    TSync: SyncTool + 'static,
{
    /// Creates a poller whose watermark starts now.
    pub fn new(
        bucket: impl Into<String>,
        interval: Duration,
        store: Arc<TStore>,
        sync_tool: Arc<TSync>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            interval,
            startup: StartupPolicy::default(),
            store,
            sync_tool,
            watermark: Watermark::now(),
        }
    }

    pub fn with_startup_policy(mut self, startup: StartupPolicy) -> Self {
        self.startup = startup;
        self
    }

    pub fn with_watermark(mut self, watermark: Watermark) -> Self {
        self.watermark = watermark;
        self
    }

    pub fn watermark(&self) -> Watermark {
        self.watermark
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub async fn verify_target_reachable(&self) -> Result<bool, ObjectStoreError> {
        self.store
            .bucket_exists(&self.bucket)
            .await
            .inspect_err(|e| error!(bucket = %self.bucket, error = %e, "failed to check bucket"))
    }

    /// Waits until the bucket is confirmed, retrying store errors with backoff.
    pub async fn await_target(&self) -> Result<(), PollerError> {
        let mut attempt = 1;
        loop {
            match self.verify_target_reachable().await {
                Ok(true) => return Ok(()),
                Ok(false) => {
                    error!(bucket = %self.bucket, "bucket does not exist");
                    return Err(PollerError::BucketNotFound {
                        bucket: self.bucket.clone(),
                    });
                }
                Err(source) if attempt >= self.startup.attempts => {
                    return Err(PollerError::Unreachable {
                        bucket: self.bucket.clone(),
                        attempts: attempt,
                        source,
                    });
                }
                Err(_) => {
                    let delay = self.startup.backoff(attempt);
                    warn!(
                        bucket = %self.bucket,
                        attempt,
                        max_attempts = self.startup.attempts,
                        retry_in = ?delay,
                        "bucket check failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    pub async fn list_changes_since(
        &self,
        since: Watermark,
    ) -> Result<Vec<ObjectRecord>, ObjectStoreError> {
        let listing = self.store.list_objects(&self.bucket).await?;
        Ok(since.changes_in(listing))
    }

    /// Runs the sync tool to completion. True iff it exited with status 0.
    pub async fn trigger_sync(&self) -> bool {
        match self.sync_tool.sync().await {
            Ok(report) if report.succeeded() => {
                info!("sync completed");
                true
            }
            Ok(report) => {
                error!(
                    exit_code = ?report.exit_code,
                    stderr = %report.stderr.trim_end(),
                    "sync failed"
                );
                false
            }
            Err(e) => {
                error!(error = %e, "failed to run sync command");
                false
            }
        }
    }

    pub async fn poll_once(&mut self) -> CycleOutcome {
        let changes = match self.list_changes_since(self.watermark).await {
            Ok(changes) => changes,
            Err(e) => {
                error!(bucket = %self.bucket, error = %e, "failed to list objects");
                return CycleOutcome::ListingFailed;
            }
        };

        if changes.is_empty() {
            debug!(since = %self.watermark, "no changes");
            return CycleOutcome::Idle;
        }

        info!(changes = changes.len(), since = %self.watermark, "found modified objects");
        for record in &changes {
            info!(
                key = %record.key,
                modified_at = %record.last_modified.to_rfc3339(),
                size = record.size,
                "modified object"
            );
        }

        if !self.trigger_sync().await {
            return CycleOutcome::SyncFailed {
                changes: changes.len(),
            };
        }

        // Captured after the sync so objects written during it are picked up next cycle.
        self.watermark.advance_to(Utc::now());
        info!(watermark = %self.watermark, "watermark advanced");
        CycleOutcome::Synced {
            changes: changes.len(),
            watermark: self.watermark.at(),
        }
    }

    /// Awaits the bucket unless shutdown comes first. `Ok(false)` means shutdown won.
    async fn start<F>(&self, shutdown: Pin<&mut F>) -> Result<bool, PollerError>
    where
        F: Future<Output = ()>,
    {
        info!(bucket = %self.bucket, "starting change poller");
        tokio::select! {
            biased;
            _ = shutdown => {
                info!("shutdown requested before polling started");
                Ok(false)
            }
            result = self.await_target() => result.map(|()| true),
        }
    }

    /// Verifies the bucket, then polls until `shutdown` resolves.
    ///
    /// Shutdown interrupts the startup check at any point. Once polling, it is observed
    /// between cycles only; an in-flight listing or sync always runs to completion.
    pub async fn run<F>(&mut self, shutdown: F) -> Result<(), PollerError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        if !self.start(shutdown.as_mut()).await? {
            return Ok(());
        }
        info!(
            bucket = %self.bucket,
            interval_secs = self.interval.as_secs(),
            watermark = %self.watermark,
            "watching bucket"
        );

        loop {
            self.poll_once().await;
            tokio::select! {
                biased;
                _ = shutdown.as_mut() => {
                    info!("shutdown requested, stopping change poller");
                    return Ok(());
                }
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
    }

    /// Verifies the bucket and runs a single cycle. `None` when shutdown arrived during startup.
    pub async fn run_once<F>(&mut self, shutdown: F) -> Result<Option<CycleOutcome>, PollerError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        if !self.start(shutdown.as_mut()).await? {
            return Ok(None);
        }
        Ok(Some(self.poll_once().await))
    }
}
