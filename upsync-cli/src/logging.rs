//! Logging bootstrap for the CLI
//!
//! Configures `tracing-subscriber` once at startup: workspace crates at the
//! requested level, everything else at warn. `RUST_LOG` overrides the
//! defaults entirely.

use anyhow::anyhow;
use tracing_subscriber::EnvFilter;

pub fn init(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose { "debug" } else { "info" };
    let default_filter = format!(
        "upsync_cli={level},core_sync={level},core_journal={level},provider_ssh={level},warn"
    );

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .map_err(|e| anyhow!("Invalid log filter: {e}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {e}"))?;

    Ok(())
}
