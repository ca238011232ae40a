// Composition root for the realtime sync daemon.
//
// Responsibilities
// - Parse the command line.
// - Set up logging from the loaded configuration.
// - Instantiate the S3 and juicefs adapters and wire them into the change poller.
// - Translate Ctrl-C / SIGTERM into poller shutdown.

pub mod cli;
pub mod logging;
pub mod shutdown;

use crate::adapters::juicefs::juicefs_sync_tool::JuiceFsSyncTool;
use crate::adapters::s3::s3_object_store::S3ObjectStore;
use crate::application::poller::runner::ChangePoller;
use crate::application::poller::startup::StartupPolicy;
use crate::config::AppConfig;
use std::sync::Arc;

pub fn build_poller(config: &AppConfig) -> ChangePoller<S3ObjectStore, JuiceFsSyncTool> {
    let store = Arc::new(S3ObjectStore::from_config(&config.store));
    let sync_tool = Arc::new(JuiceFsSyncTool::from_config(&config.store, &config.sync));
    ChangePoller::new(
        config.store.bucket.clone(),
        config.poller.interval(),
        store,
        sync_tool,
    )
    .with_startup_policy(StartupPolicy::from_config(&config.poller))
}

#[cfg(test)]
mod shell_tests {
    use super::*;
    use crate::config::{PollerConfig, StoreConfig};
    use rstest::rstest;
    use std::time::Duration;

    #[rstest]
    #[tokio::test]
    async fn it_should_wire_the_poller_from_the_default_config() {
        let poller = build_poller(&AppConfig::default());
        assert_eq!(poller.bucket(), "xsky-data");
        assert_eq!(poller.interval(), Duration::from_secs(10));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_take_bucket_and_interval_from_the_config() {
        let config = AppConfig {
            store: StoreConfig {
                bucket: "archive".into(),
                ..StoreConfig::default()
            },
            poller: PollerConfig {
                interval_secs: 45,
                ..PollerConfig::default()
            },
            ..AppConfig::default()
        };
        let poller = build_poller(&config);
        assert_eq!(poller.bucket(), "archive");
        assert_eq!(poller.interval(), Duration::from_secs(45));
    }
}
