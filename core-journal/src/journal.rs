//! # Sync Journal
//!
//! Durable state for the sync driver: one append-only log file holding both
//! the alias table and the completion ledger, fully read at startup into an
//! in-memory index.
//!
//! ## Overview
//!
//! The journal is the only state that survives between runs, and its content
//! alone determines resumability:
//!
//! - **Alias records** (`MAP:`) map a raw classifier key to the canonical key
//!   used for remote placement. First writer wins: once a raw key is present
//!   the program never rewrites it. Operators redirect future placements by
//!   editing the file between runs; whatever the file says at load time is
//!   authoritative.
//! - **Completion records** (`OK:`) mark units as transferred. A unit with a
//!   completion record is never transferred again. Records are appended only
//!   after the transport confirms success.
//!
//! The file is never rewritten in place, only appended to, so a run killed
//! mid-way leaves a journal that exactly reflects the units that finished.
//!
//! ## Concurrency
//!
//! A `Journal` is owned exclusively by one driver for the duration of a run;
//! all appends go through `&mut self`, so records cannot interleave.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::error::{JournalError, Result};
use crate::record::JournalRecord;

/// Append-only journal with an in-memory index
pub struct Journal {
    path: PathBuf,
    file: File,
    aliases: HashMap<String, String>,
    completed: HashSet<String>,
}

impl Journal {
    /// Open a journal file, creating it if missing, and rebuild the index
    ///
    /// Malformed lines are logged and skipped; they never abort the load.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or opened for append.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let mut aliases = HashMap::new();
        let mut completed = HashSet::new();

        match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                for (idx, line) in content.lines().enumerate() {
                    if line.trim().is_empty() {
                        continue;
                    }
                    match JournalRecord::parse_line(line) {
                        Some(JournalRecord::Alias {
                            raw_key,
                            resolved_key,
                        }) => {
                            // First writer wins, also across duplicate lines
                            // left behind by hand edits.
                            aliases.entry(raw_key).or_insert(resolved_key);
                        }
                        Some(JournalRecord::Completed { unit_id }) => {
                            completed.insert(unit_id);
                        }
                        None => {
                            warn!(line = idx + 1, content = line, "Skipping malformed journal line");
                        }
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Journal file not found, starting empty");
            }
            Err(e) => return Err(JournalError::Io(e)),
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        debug!(
            path = %path.display(),
            aliases = aliases.len(),
            completed = completed.len(),
            "Journal loaded"
        );

        Ok(Self {
            path,
            file,
            aliases,
            completed,
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up the canonical key for a raw key
    ///
    /// Returns the stored mapping verbatim, whether written by a previous run
    /// or edited by an operator since.
    pub fn resolve_alias(&self, raw_key: &str) -> Option<&str> {
        self.aliases.get(raw_key).map(String::as_str)
    }

    /// Record a new alias mapping
    ///
    /// First writer wins: if `raw_key` already has a mapping, nothing is
    /// written and `false` is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the append fails or a key contains a line break.
    pub async fn record_alias(&mut self, raw_key: &str, resolved_key: &str) -> Result<bool> {
        if self.aliases.contains_key(raw_key) {
            return Ok(false);
        }

        let record = JournalRecord::Alias {
            raw_key: raw_key.to_string(),
            resolved_key: resolved_key.to_string(),
        };
        self.append(&record).await?;
        self.aliases
            .insert(raw_key.to_string(), resolved_key.to_string());
        Ok(true)
    }

    /// Whether a unit has a completion record (exact match on the unit id)
    pub fn is_completed(&self, unit_id: &str) -> bool {
        self.completed.contains(unit_id)
    }

    /// Record a unit as successfully transferred
    ///
    /// Appending an already-recorded unit is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the append fails or the id contains a line break.
    pub async fn record_completed(&mut self, unit_id: &str) -> Result<()> {
        if self.completed.contains(unit_id) {
            return Ok(());
        }

        let record = JournalRecord::Completed {
            unit_id: unit_id.to_string(),
        };
        self.append(&record).await?;
        self.completed.insert(unit_id.to_string());
        Ok(())
    }

    /// Number of alias mappings in the index
    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }

    /// Number of completed units in the index
    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    async fn append(&mut self, record: &JournalRecord) -> Result<()> {
        let line = record.encode();
        if line.contains('\n') {
            return Err(JournalError::InvalidRecord(line));
        }

        self.file.write_all(line.as_bytes()).await?;
        self.file.write_all(b"\n").await?;
        // One record per flush so a killed run loses at most the record in
        // flight, never a confirmed one.
        self.file.flush().await?;
        Ok(())
    }
}
