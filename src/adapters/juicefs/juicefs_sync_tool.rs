// SyncTool adapter that shells out to `juicefs sync`.
//
// Purpose
// - Replicate the whole bucket into the mounted filesystem by running the external CLI.
//
// Responsibilities
// - Build the source URL (credentials + endpoint + bucket) and destination path.
// - Capture stdout, stderr and the exit status of the child process.
// - Never log the secret key.

use crate::config::{StoreConfig, SyncConfig};
use crate::core::ports::{SyncError, SyncReport, SyncTool};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

const REDACTED: &str = "******";

#[derive(Debug, Clone)]
pub struct JuiceFsSyncTool {
    program: String,
    access_key: String,
    secret_key: String,
    endpoint: String,
    bucket: String,
    mount_point: String,
    secure: bool,
    timeout: Option<Duration>,
}

impl JuiceFsSyncTool {
    pub fn from_config(store: &StoreConfig, sync: &SyncConfig) -> Self {
        Self {
            program: sync.command.clone(),
            access_key: store.access_key.clone(),
            secret_key: store.secret_key.clone(),
            endpoint: store.endpoint.clone(),
            bucket: store.bucket.clone(),
            mount_point: sync.mount_point.to_string_lossy().into_owned(),
            secure: store.secure,
            timeout: sync.timeout_secs.map(Duration::from_secs),
        }
    }

    fn source_url(&self, secret_key: &str) -> String {
        format!(
            "s3://{}:{}@{}/{}/",
            self.access_key,
            secret_key,
            self.endpoint.trim_end_matches('/'),
            self.bucket.trim_matches('/'),
        )
    }

    fn destination(&self) -> String {
        format!("{}/", self.mount_point.trim_end_matches('/'))
    }

    fn args_with_secret(&self, secret_key: &str) -> Vec<String> {
        let mut args = vec!["sync".to_string()];
        if !self.secure {
            args.push("--no-https".to_string());
        }
        args.push(self.source_url(secret_key));
        args.push(self.destination());
        args.push("--verbose".to_string());
        args
    }

    pub fn args(&self) -> Vec<String> {
        self.args_with_secret(&self.secret_key)
    }

    /// The command line as it may appear in logs.
    pub fn redacted_command_line(&self) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args_with_secret(REDACTED));
        parts.join(" ")
    }
}

#[async_trait::async_trait]
impl SyncTool for JuiceFsSyncTool {
    async fn sync(&self) -> Result<SyncReport, SyncError> {
        debug!(command = %self.redacted_command_line(), "running sync command");

        let child = Command::new(&self.program)
            .args(self.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SyncError::Spawn {
                command: self.program.clone(),
                reason: e.to_string(),
            })?;

        let output = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, child.wait_with_output())
                .await
                .map_err(|_| SyncError::TimedOut {
                    secs: timeout.as_secs(),
                })?,
            None => child.wait_with_output().await,
        }
        .map_err(|e| SyncError::Spawn {
            command: self.program.clone(),
            reason: e.to_string(),
        })?;

        Ok(SyncReport {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
