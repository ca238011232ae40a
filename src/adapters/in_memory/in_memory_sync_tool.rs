// In memory implementation of the SyncTool port.
//
// Purpose
// - Drive the change poller through successful and failing sync runs without spawning processes.
//
// Responsibilities
// - Replay scripted exit codes, then keep succeeding.
// - Count invocations so tests can assert whether a sync was triggered.
// - Simulate a missing executable through an offline switch.

use crate::core::ports::{SyncError, SyncReport, SyncTool};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Mutex;

#[derive(Default)]
pub struct InMemorySyncTool {
    exit_codes: Mutex<VecDeque<i32>>,
    invocations: AtomicUsize,
    is_offline: AtomicBool,
}

impl InMemorySyncTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exit codes returned by the next invocations, in order. Afterwards every run exits with 0.
    pub fn with_exit_codes(exit_codes: impl IntoIterator<Item = i32>) -> Self {
        Self {
            exit_codes: Mutex::new(exit_codes.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    pub fn toggle_offline(&self) {
        self.is_offline.fetch_xor(true, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl SyncTool for InMemorySyncTool {
    async fn sync(&self) -> Result<SyncReport, SyncError> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        if self.is_offline.load(Ordering::SeqCst) {
            return Err(SyncError::Spawn {
                command: "in-memory".into(),
                reason: "Sync tool offline".into(),
            });
        }

        let exit_code = self.exit_codes.lock().await.pop_front().unwrap_or(0);
        let stderr = if exit_code == 0 {
            String::new()
        } else {
            format!("sync exited with {exit_code}")
        };
        Ok(SyncReport {
            exit_code: Some(exit_code),
            stdout: String::new(),
            stderr,
        })
    }
}
