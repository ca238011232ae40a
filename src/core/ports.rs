// Ports define what the poller needs from the outside world, without implementing it.
//
// Purpose
// - Describe the object store and the sync tool as traits (ObjectStore, SyncTool).
//
// Responsibilities
// - Keep the change poller independent of any SDK or executable by coding against traits.
//
// Boundaries
// - No concrete input or output here. Adapters implement these traits in the adapters layer.
//
// Testing guidance
// - In memory implementations live in adapters::in_memory.

use crate::core::object_record::ObjectRecord;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool, ObjectStoreError>;

    /// Lists every object in the bucket, recursively, in store listing order.
    async fn list_objects(&self, bucket: &str) -> Result<Vec<ObjectRecord>, ObjectStoreError>;
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to launch sync command `{command}`: {reason}")]
    Spawn { command: String, reason: String },

    #[error("sync command timed out after {secs}s")]
    TimedOut { secs: u64 },
}

/// Outcome of one finished sync tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl SyncReport {
    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }
}

#[async_trait]
pub trait SyncTool: Send + Sync {
    /// Runs one full synchronization and waits for it to finish.
    async fn sync(&self) -> Result<SyncReport, SyncError>;
}
