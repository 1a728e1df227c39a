//! `upsync` uploads folders to an owner-namespaced archive on a remote host.
//!
//! Walks the top-level folders of a source directory, classifies each by its
//! inferred owner key, resolves the key through the journal's alias table,
//! skips folders already transferred, and copies the rest over ssh. The
//! journal file makes runs resumable: re-running with the same arguments
//! retries only what is not yet done.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use core_journal::Journal;
use core_sync::{
    RunSummary, SyncDriver, SyncSessionConfig, DEFAULT_JOURNAL_FILE, DEFAULT_REMOTE_BASE,
    DEFAULT_REMOTE_HOST,
};
use provider_ssh::SshTransport;

mod logging;

#[derive(Parser, Debug)]
#[command(
    name = "upsync",
    version,
    about = "Upload folders to an owner-namespaced archive on a remote host",
    long_about = "Walks the top-level folders of SOURCE, classifies each by its inferred \
owner key, and copies it to <remote-base>/<owner>/ on the remote host over ssh.\n\n\
State lives in the journal file: MAP: lines map a raw owner key to the directory \
actually used on the remote side (edit them between runs to redirect an owner), \
OK: lines mark folders already transferred and are never retried."
)]
struct Cli {
    /// Directory whose top-level folders are uploaded
    source: PathBuf,

    /// Remote host, an ssh config alias or user@host
    #[arg(long, default_value = DEFAULT_REMOTE_HOST)]
    host: String,

    /// Remote base path; folders land under <base>/<owner>/
    #[arg(long, default_value = DEFAULT_REMOTE_BASE)]
    remote_base: String,

    /// Skip folders whose name contains TERM (repeatable)
    #[arg(long = "exclude", value_name = "TERM")]
    exclude: Vec<String>,

    /// Path of the alias/ledger journal file
    #[arg(long, default_value = DEFAULT_JOURNAL_FILE)]
    journal: PathBuf,

    /// Announce remote operations without performing them; alias discoveries
    /// are still recorded so they can be edited before the live run
    #[arg(long)]
    dry_run: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    let config = SyncSessionConfig::builder()
        .source_root(&cli.source)
        .remote_host(cli.host)
        .remote_base(cli.remote_base)
        .exclude_terms(cli.exclude)
        .journal_path(&cli.journal)
        .dry_run(cli.dry_run)
        .build()
        .context("Invalid configuration")?;

    tracing::debug!(?config, "Session configuration");

    let journal = Journal::open(&config.journal_path)
        .await
        .with_context(|| format!("Cannot open journal {}", config.journal_path.display()))?;

    let transport = Arc::new(SshTransport::new(config.remote_host.clone()));
    let mut driver = SyncDriver::new(config, journal, transport);
    let summary = driver.run().await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    // Per-unit failures are reported above but deliberately do not change
    // the exit status; the run itself completed.
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    let mode = if summary.dry_run { " (dry-run)" } else { "" };
    println!(
        "{} discovered, {} transferred{}, {} already done, {} excluded, {} failed, {} new aliases",
        summary.discovered,
        summary.transferred,
        mode,
        summary.already_done,
        summary.filtered_out,
        summary.failed,
        summary.aliases_added,
    );
    for failure in &summary.failures {
        println!("  failed [{}] {}: {}", failure.stage, failure.unit, failure.error);
    }
}
