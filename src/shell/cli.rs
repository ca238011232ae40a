use clap::Parser;
use std::path::PathBuf;

/// Watch an S3-compatible bucket and run `juicefs sync` whenever objects change.
#[derive(Debug, Parser)]
#[command(name = "realtime_sync", version, about)]
pub struct Cli {
    /// TOML configuration file. Defaults to ./realtime-sync.toml when present.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Verify the bucket, run a single poll cycle, then exit.
    #[arg(long)]
    pub once: bool,
}
