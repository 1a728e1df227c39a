//! # Sync Session Configuration
//!
//! Immutable configuration for one sync run, built through a fail-fast
//! builder: validation errors surface before any unit is processed, with
//! actionable messages.
//!
//! ## Usage
//!
//! ```ignore
//! use core_sync::config::SyncSessionConfig;
//!
//! let config = SyncSessionConfig::builder()
//!     .source_root("/mnt/staging")
//!     .remote_host("nas")
//!     .exclude_term("draft")
//!     .dry_run(true)
//!     .build()?;
//! ```

use crate::error::{Result, SyncError};
use std::path::{Path, PathBuf};

/// Default remote host alias, expected to resolve through ssh config
pub const DEFAULT_REMOTE_HOST: &str = "nas";

/// Default remote base path under which owner directories are created
pub const DEFAULT_REMOTE_BASE: &str = "/volume1/archive";

/// Default journal filename, relative to the working directory
pub const DEFAULT_JOURNAL_FILE: &str = "upsync.journal";

/// Configuration for one sync run; all fields are fixed for its duration
#[derive(Debug, Clone)]
pub struct SyncSessionConfig {
    /// Local directory whose top-level folders are the units of work
    pub source_root: PathBuf,

    /// Remote host identifier passed to the transport
    pub remote_host: String,

    /// Remote base path; units land under `<base>/<resolved_key>/`
    pub remote_base: String,

    /// Exclusion terms; a unit whose name contains any of them is skipped
    pub exclude_terms: Vec<String>,

    /// Path of the alias/ledger journal file
    pub journal_path: PathBuf,

    /// Simulate remote operations, still recording alias discoveries
    pub dry_run: bool,
}

impl SyncSessionConfig {
    /// Start building a configuration
    pub fn builder() -> SyncSessionConfigBuilder {
        SyncSessionConfigBuilder::default()
    }
}

/// Builder for [`SyncSessionConfig`]
#[derive(Debug, Default)]
pub struct SyncSessionConfigBuilder {
    source_root: Option<PathBuf>,
    remote_host: Option<String>,
    remote_base: Option<String>,
    exclude_terms: Vec<String>,
    journal_path: Option<PathBuf>,
    dry_run: bool,
}

impl SyncSessionConfigBuilder {
    /// Set the source root directory (required)
    pub fn source_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_root = Some(path.into());
        self
    }

    /// Set the remote host identifier
    pub fn remote_host(mut self, host: impl Into<String>) -> Self {
        self.remote_host = Some(host.into());
        self
    }

    /// Set the remote base path
    pub fn remote_base(mut self, base: impl Into<String>) -> Self {
        self.remote_base = Some(base.into());
        self
    }

    /// Add one exclusion term
    pub fn exclude_term(mut self, term: impl Into<String>) -> Self {
        self.exclude_terms.push(term.into());
        self
    }

    /// Add several exclusion terms
    pub fn exclude_terms(mut self, terms: impl IntoIterator<Item = String>) -> Self {
        self.exclude_terms.extend(terms);
        self
    }

    /// Set the journal file path
    pub fn journal_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.journal_path = Some(path.into());
        self
    }

    /// Enable or disable dry-run mode
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Validate and build the configuration
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Config` if the source root is missing, does not
    /// exist, or is not a directory.
    pub fn build(self) -> Result<SyncSessionConfig> {
        let source_root = self.source_root.ok_or_else(|| {
            SyncError::Config("No source directory provided. Pass the directory whose top-level folders should be uploaded.".to_string())
        })?;

        validate_source_root(&source_root)?;

        let remote_base = self
            .remote_base
            .unwrap_or_else(|| DEFAULT_REMOTE_BASE.to_string());
        let remote_base = remote_base.trim_end_matches('/').to_string();
        if remote_base.is_empty() {
            return Err(SyncError::Config(
                "Remote base path must not be empty".to_string(),
            ));
        }

        Ok(SyncSessionConfig {
            source_root,
            remote_host: self
                .remote_host
                .unwrap_or_else(|| DEFAULT_REMOTE_HOST.to_string()),
            remote_base,
            exclude_terms: self
                .exclude_terms
                .into_iter()
                .filter(|t| !t.is_empty())
                .collect(),
            journal_path: self
                .journal_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_JOURNAL_FILE)),
            dry_run: self.dry_run,
        })
    }
}

fn validate_source_root(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(SyncError::Config(format!(
            "Source directory does not exist: {}",
            path.display()
        )));
    }
    if !path.is_dir() {
        return Err(SyncError::Config(format!(
            "Source path is not a directory: {}",
            path.display()
        )));
    }
    Ok(())
}
