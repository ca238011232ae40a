use clap::Parser;
use tracing::{error, info, warn};

use realtime_sync::config::AppConfig;
use realtime_sync::shell::build_poller;
use realtime_sync::shell::cli::Cli;
use realtime_sync::shell::logging::init_logging;
use realtime_sync::shell::shutdown::listen_for_signals;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let shutdown = listen_for_signals()?;
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    let _guard = init_logging(&config.logging)?;

    info!(
        endpoint = %config.store.endpoint_url(),
        bucket = %config.store.bucket,
        mount_point = %config.sync.mount_point.display(),
        "realtime sync starting"
    );

    let mut poller = build_poller(&config);
    let result = if cli.once {
        poller
            .run_once(shutdown.requested())
            .await
            .map(|outcome| match outcome {
                Some(outcome) => info!(?outcome, "single cycle finished"),
                None => warn!("shutdown requested before the cycle ran"),
            })
    } else {
        poller.run(shutdown.requested()).await
    };

    if let Err(e) = result {
        error!(error = %e, "realtime sync stopped");
        return Err(e.into());
    }

    info!("realtime sync stopped");
    Ok(())
}
