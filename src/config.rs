// Configuration for the realtime sync daemon.
//
// Purpose
// - Describe every setting the binary needs and load it once at startup.
//
// Responsibilities
// - Merge, in order: defaults, an optional TOML file, REALTIME_SYNC_* environment variables.
// - Reject unusable values before anything connects to the store.

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const ENV_PREFIX: &str = "REALTIME_SYNC_";
pub const DEFAULT_CONFIG_FILENAME: &str = "realtime-sync.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// `host:port` of the S3-compatible endpoint, without scheme.
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    pub region: String,
    pub secure: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            endpoint: "127.0.0.1:9000".into(),
            access_key: "minioadmin".into(),
            secret_key: "minioadmin123".into(),
            bucket: "xsky-data".into(),
            region: "us-east-1".into(),
            secure: false,
        }
    }
}

impl StoreConfig {
    pub fn endpoint_url(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        format!("{scheme}://{}", self.endpoint)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub command: String,
    pub mount_point: PathBuf,
    /// Unset means the poller waits for the sync tool indefinitely.
    pub timeout_secs: Option<u64>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            command: "juicefs".into(),
            mount_point: PathBuf::from("/tmp/s3_xsky_mount"),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    pub interval_secs: u64,
    pub startup_attempts: u32,
    pub startup_backoff_secs: u64,
    pub startup_max_backoff_secs: u64,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_secs: 10,
            startup_attempts: 5,
            startup_backoff_secs: 1,
            startup_max_backoff_secs: 30,
        }
    }
}

impl PollerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub directory: PathBuf,
    pub file_prefix: String,
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./logs"),
            file_prefix: "realtime-sync.log".into(),
            level: "info".into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub sync: SyncConfig,
    pub poller: PollerConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Loads from `path` when given, otherwise from `realtime-sync.toml` in the working directory if present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::Invalid(format!(
                        "config file {} does not exist",
                        path.display()
                    )));
                }
                figment = figment.merge(Toml::file(path));
            }
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILENAME);
                if default_path.exists() {
                    figment = figment.merge(Toml::file(default_path));
                }
            }
        }

        Self::from_figment(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: AppConfig = figment.extract().map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("store.endpoint", self.store.endpoint.as_str()),
            ("store.bucket", self.store.bucket.as_str()),
            ("sync.command", self.sync.command.as_str()),
            ("logging.file_prefix", self.logging.file_prefix.as_str()),
        ];
        if let Some((name, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!("{name} must not be empty")));
        }
        if self.sync.mount_point.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("sync.mount_point must not be empty".into()));
        }
        if self.poller.interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "poller.interval_secs must be greater than zero".into(),
            ));
        }
        if self.poller.startup_attempts == 0 {
            return Err(ConfigError::Invalid(
                "poller.startup_attempts must be at least one".into(),
            ));
        }
        if self.sync.timeout_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "sync.timeout_secs must be greater than zero when set".into(),
            ));
        }
        Ok(())
    }
}
