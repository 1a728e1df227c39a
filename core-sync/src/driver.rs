//! # Sync Driver
//!
//! The control loop: enumerates units of work under the source root and
//! advances each through its state machine.
//!
//! ## Overview
//!
//! Per unit, in order:
//! 1. Filter: skip units whose name contains an exclusion term
//! 2. Ledger lookup: skip units already recorded as transferred
//! 3. Classify: extract the owner key, resolve it through the alias table
//!    (appending a new mapping on first sight)
//! 4. Ensure the remote directory `<base>/<resolved_key>` exists
//! 5. Transfer the unit folder into it, recursively
//! 6. Append the completion record
//!
//! Processing is strictly sequential: one unit is fully advanced before the
//! next begins, so at most one transfer is in flight and journal appends
//! cannot interleave.
//!
//! ## Failure Policy
//!
//! Remote failures are contained per unit: they are logged, counted, and the
//! loop moves on. The run itself only aborts on configuration problems
//! (caught before the loop) or journal write failures (after which durable
//! state could no longer be trusted).
//!
//! ## Dry-Run
//!
//! In dry-run mode the ensure and transfer steps are announced instead of
//! executed and the completion record is never appended. Alias discoveries
//! are still recorded so operators can edit them before the live run.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bridge_traits::RemoteTransport;
use core_journal::Journal;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::classifier;
use crate::config::SyncSessionConfig;
use crate::error::{Result, SyncError};
use crate::filter::{Filter, FilterVerdict};
use crate::unit::{UnitRun, UnitStatus};

/// One contained per-unit failure, reported in the run summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitFailure {
    /// Unit name
    pub unit: String,
    /// The state the unit failed in
    pub stage: UnitStatus,
    /// Failure detail from the transport
    pub error: String,
}

/// Counts and failure details for one completed run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Units found under the source root
    pub discovered: u64,
    /// Units transferred this run (or announced, in dry-run)
    pub transferred: u64,
    /// Units skipped because the ledger already had them
    pub already_done: u64,
    /// Units skipped by the exclusion filter
    pub filtered_out: u64,
    /// Units that failed remote directory creation or transfer
    pub failed: u64,
    /// New alias mappings appended this run
    pub aliases_added: u64,
    /// Whether this was a dry run
    pub dry_run: bool,
    /// Per-unit failure details
    pub failures: Vec<UnitFailure>,
}

impl RunSummary {
    fn new(dry_run: bool) -> Self {
        Self {
            discovered: 0,
            transferred: 0,
            already_done: 0,
            filtered_out: 0,
            failed: 0,
            aliases_added: 0,
            dry_run,
            failures: Vec::new(),
        }
    }

    fn absorb(&mut self, unit: &UnitRun) {
        if let Some(classification) = &unit.classification {
            if classification.newly_discovered {
                self.aliases_added += 1;
            }
        }

        match unit.status {
            UnitStatus::FilteredOut => self.filtered_out += 1,
            UnitStatus::AlreadyDone => self.already_done += 1,
            UnitStatus::Recorded => self.transferred += 1,
            // Dry-run units stop at Transferred.
            UnitStatus::Transferred => self.transferred += 1,
            UnitStatus::FailedDirectory | UnitStatus::FailedTransfer => {
                self.failed += 1;
                self.failures.push(UnitFailure {
                    unit: unit.name.clone(),
                    stage: unit.status,
                    error: unit.error.clone().unwrap_or_default(),
                });
            }
            UnitStatus::Pending | UnitStatus::Classified | UnitStatus::DirectoryEnsured => {}
        }
    }
}

/// Orchestrates one sync run
pub struct SyncDriver {
    config: SyncSessionConfig,
    journal: Journal,
    transport: Arc<dyn RemoteTransport>,
    filter: Filter,
}

impl SyncDriver {
    /// Create a driver from a validated configuration, a loaded journal and
    /// a remote transport
    pub fn new(
        config: SyncSessionConfig,
        journal: Journal,
        transport: Arc<dyn RemoteTransport>,
    ) -> Self {
        let filter = Filter::new(config.exclude_terms.clone());
        Self {
            config,
            journal,
            transport,
            filter,
        }
    }

    /// Run the sync loop over every unit under the source root
    ///
    /// Always completes unless enumeration or a journal append fails;
    /// per-unit remote failures are contained and reported in the summary.
    ///
    /// # Errors
    ///
    /// Returns an error if the source root cannot be enumerated or a journal
    /// append fails.
    #[instrument(skip(self), fields(source = %self.config.source_root.display(), dry_run = self.config.dry_run))]
    pub async fn run(&mut self) -> Result<RunSummary> {
        let units = self.enumerate_units().await?;
        let mut summary = RunSummary::new(self.config.dry_run);

        info!(units = units.len(), "Starting sync run");

        for (name, path) in units {
            summary.discovered += 1;
            let unit = self.process_unit(&name, &path).await?;
            summary.absorb(&unit);
        }

        info!(
            discovered = summary.discovered,
            transferred = summary.transferred,
            already_done = summary.already_done,
            filtered_out = summary.filtered_out,
            failed = summary.failed,
            aliases_added = summary.aliases_added,
            "Sync run complete"
        );

        Ok(summary)
    }

    /// List top-level directories under the source root, in listing order
    async fn enumerate_units(&self) -> Result<Vec<(String, PathBuf)>> {
        let map_err = |source| SyncError::Enumeration {
            path: self.config.source_root.display().to_string(),
            source,
        };

        let mut entries = tokio::fs::read_dir(&self.config.source_root)
            .await
            .map_err(map_err)?;

        let mut units = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(map_err)? {
            let file_type = entry.file_type().await.map_err(map_err)?;
            if !file_type.is_dir() {
                continue;
            }
            match entry.file_name().into_string() {
                // A line break in the name could never round-trip through the
                // line-oriented journal.
                Ok(name) if name.contains(['\n', '\r']) => {
                    warn!(name = ?name, "Skipping directory with line break in name");
                }
                Ok(name) => units.push((name, entry.path())),
                Err(name) => {
                    // Unit ids must round-trip through the journal as UTF-8.
                    warn!(name = ?name, "Skipping directory with non-UTF-8 name");
                }
            }
        }

        Ok(units)
    }

    async fn process_unit(&mut self, name: &str, path: &Path) -> Result<UnitRun> {
        let unit = UnitRun::new(name);

        if let FilterVerdict::Skip { term } = self.filter.verdict(name) {
            info!(unit = name, term, "Skipping excluded unit");
            return unit.filtered_out(term);
        }

        if self.journal.is_completed(name) {
            debug!(unit = name, "Already transferred, skipping");
            return unit.already_done();
        }

        let classification = classifier::classify(name, &mut self.journal).await?;
        info!(
            unit = name,
            raw = %classification.raw_key,
            resolved = %classification.resolved_key,
            new_alias = classification.newly_discovered,
            "Classified unit"
        );
        let remote_dir = format!("{}/{}", self.config.remote_base, classification.resolved_key);
        let unit = unit.classified(classification)?;

        let unit = if self.config.dry_run {
            info!(unit = name, dir = %remote_dir, "Dry-run: would ensure remote directory");
            unit.directory_ensured()?
        } else {
            match self.transport.ensure_directory(&remote_dir).await {
                Ok(()) => unit.directory_ensured()?,
                Err(e) => {
                    warn!(unit = name, dir = %remote_dir, error = %e, "Remote directory creation failed");
                    return unit.failed_directory(e.to_string());
                }
            }
        };

        if self.config.dry_run {
            info!(unit = name, dir = %remote_dir, "Dry-run: would transfer unit");
            // Dry-run stops here: the completion record is never simulated.
            return unit.transferred();
        }

        let unit = match self.transport.transfer(path, &remote_dir).await {
            Ok(()) => {
                info!(unit = name, dir = %remote_dir, "Transferred unit");
                unit.transferred()?
            }
            Err(e) => {
                warn!(unit = name, dir = %remote_dir, error = %e, "Transfer failed");
                return unit.failed_transfer(e.to_string());
            }
        };

        self.journal.record_completed(name).await?;
        unit.recorded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use mockall::mock;
    use mockall::predicate::eq;
    use tempfile::{tempdir, TempDir};

    mock! {
        Transport {}

        #[async_trait::async_trait]
        impl RemoteTransport for Transport {
            async fn ensure_directory(&self, remote_dir: &str) -> BridgeResult<()>;
            async fn transfer(&self, local_path: &Path, remote_dir: &str) -> BridgeResult<()>;
        }
    }

    struct Fixture {
        _source: TempDir,
        _state: TempDir,
        config: SyncSessionConfig,
        journal_path: PathBuf,
    }

    async fn fixture(unit_names: &[&str]) -> Fixture {
        let source = tempdir().unwrap();
        let state = tempdir().unwrap();
        for name in unit_names {
            let dir = source.path().join(name);
            tokio::fs::create_dir(&dir).await.unwrap();
            tokio::fs::write(dir.join("file.bin"), b"data").await.unwrap();
        }
        let journal_path = state.path().join("test.journal");
        let config = SyncSessionConfig::builder()
            .source_root(source.path())
            .remote_base("/volume1/archive")
            .journal_path(&journal_path)
            .build()
            .unwrap();
        Fixture {
            _source: source,
            _state: state,
            config,
            journal_path,
        }
    }

    #[tokio::test]
    async fn test_successful_unit_is_recorded() {
        let fx = fixture(&["Bob - NO.3"]).await;

        let mut transport = MockTransport::new();
        transport
            .expect_ensure_directory()
            .with(eq("/volume1/archive/Bob"))
            .times(1)
            .returning(|_| Ok(()));
        transport
            .expect_transfer()
            .withf(|local, dir| {
                local.file_name().unwrap() == "Bob - NO.3" && dir == "/volume1/archive/Bob"
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let journal = Journal::open(&fx.journal_path).await.unwrap();
        let mut driver = SyncDriver::new(fx.config.clone(), journal, Arc::new(transport));
        let summary = driver.run().await.unwrap();

        assert_eq!(summary.discovered, 1);
        assert_eq!(summary.transferred, 1);
        assert_eq!(summary.aliases_added, 1);
        assert!(summary.failures.is_empty());

        let journal = Journal::open(&fx.journal_path).await.unwrap();
        assert!(journal.is_completed("Bob - NO.3"));
    }

    #[tokio::test]
    async fn test_directory_failure_writes_no_record() {
        let fx = fixture(&["Bob - NO.3"]).await;

        let mut transport = MockTransport::new();
        transport
            .expect_ensure_directory()
            .returning(|_| Err(BridgeError::OperationFailed("mkdir denied".to_string())));
        transport.expect_transfer().never();

        let journal = Journal::open(&fx.journal_path).await.unwrap();
        let mut driver = SyncDriver::new(fx.config.clone(), journal, Arc::new(transport));
        let summary = driver.run().await.unwrap();

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.transferred, 0);
        assert_eq!(summary.failures[0].stage, UnitStatus::FailedDirectory);

        let journal = Journal::open(&fx.journal_path).await.unwrap();
        assert!(!journal.is_completed("Bob - NO.3"));
    }

    #[tokio::test]
    async fn test_transfer_failure_writes_no_record() {
        let fx = fixture(&["Bob - NO.3"]).await;

        let mut transport = MockTransport::new();
        transport.expect_ensure_directory().returning(|_| Ok(()));
        transport
            .expect_transfer()
            .returning(|_, _| Err(BridgeError::OperationFailed("scp exited 1".to_string())));

        let journal = Journal::open(&fx.journal_path).await.unwrap();
        let mut driver = SyncDriver::new(fx.config.clone(), journal, Arc::new(transport));
        let summary = driver.run().await.unwrap();

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.failures[0].stage, UnitStatus::FailedTransfer);
        assert_eq!(summary.failures[0].error, "Bridge operation failed: scp exited 1");

        let journal = Journal::open(&fx.journal_path).await.unwrap();
        assert!(!journal.is_completed("Bob - NO.3"));
    }

    #[tokio::test]
    async fn test_resolved_key_namespaces_remote_dir() {
        let fx = fixture(&["Bob - NO.3"]).await;
        // Operator redirected Bob before this run.
        tokio::fs::write(&fx.journal_path, "MAP:Bob|Robert\n")
            .await
            .unwrap();

        let mut transport = MockTransport::new();
        transport
            .expect_ensure_directory()
            .with(eq("/volume1/archive/Robert"))
            .times(1)
            .returning(|_| Ok(()));
        transport
            .expect_transfer()
            .withf(|_, dir| dir == "/volume1/archive/Robert")
            .times(1)
            .returning(|_, _| Ok(()));

        let journal = Journal::open(&fx.journal_path).await.unwrap();
        let mut driver = SyncDriver::new(fx.config.clone(), journal, Arc::new(transport));
        let summary = driver.run().await.unwrap();

        assert_eq!(summary.transferred, 1);
        assert_eq!(summary.aliases_added, 0);
    }

    #[tokio::test]
    async fn test_line_break_name_does_not_abort_the_run() {
        let fx = fixture(&["Bob - NO.3", "bad\nname"]).await;

        let mut transport = MockTransport::new();
        transport.expect_ensure_directory().returning(|_| Ok(()));
        transport
            .expect_transfer()
            .withf(|local, _| local.file_name().unwrap() == "Bob - NO.3")
            .times(1)
            .returning(|_, _| Ok(()));

        let journal = Journal::open(&fx.journal_path).await.unwrap();
        let mut driver = SyncDriver::new(fx.config.clone(), journal, Arc::new(transport));
        let summary = driver.run().await.unwrap();

        // The unjournalable name is screened out; the rest of the batch runs.
        assert_eq!(summary.discovered, 1);
        assert_eq!(summary.transferred, 1);

        let journal = Journal::open(&fx.journal_path).await.unwrap();
        assert!(journal.is_completed("Bob - NO.3"));
        assert!(!journal.is_completed("bad\nname"));
    }

    #[tokio::test]
    async fn test_files_under_root_are_ignored() {
        let fx = fixture(&[]).await;
        tokio::fs::write(fx.config.source_root.join("stray.txt"), b"x")
            .await
            .unwrap();

        let transport = MockTransport::new();
        let journal = Journal::open(&fx.journal_path).await.unwrap();
        let mut driver = SyncDriver::new(fx.config.clone(), journal, Arc::new(transport));
        let summary = driver.run().await.unwrap();

        assert_eq!(summary.discovered, 0);
    }
}
