//! # Upload-Sync Orchestration Module
//!
//! Walks a local directory of folders, classifies each by an inferred owner
//! key, resolves that key through the persistent alias table, skips folders
//! already transferred, and transfers the rest to an owner-namespaced
//! location on a remote host.
//!
//! ## Components
//!
//! - **Classifier** (`classifier`): ordered extraction rules plus alias
//!   resolution against the journal
//! - **Filter** (`filter`): case-sensitive substring blacklist over unit
//!   names
//! - **Unit State Machine** (`unit`): validated per-unit lifecycle from
//!   `Pending` to `Recorded` with contained failure states
//! - **Session Configuration** (`config`): fail-fast validated, immutable
//!   per run
//! - **Sync Driver** (`driver`): the sequential control loop and run summary

pub mod classifier;
pub mod config;
pub mod driver;
pub mod error;
pub mod filter;
pub mod unit;

pub use classifier::{classify, extract_raw_key, Classification};
pub use config::{
    SyncSessionConfig, SyncSessionConfigBuilder, DEFAULT_JOURNAL_FILE, DEFAULT_REMOTE_BASE,
    DEFAULT_REMOTE_HOST,
};
pub use driver::{RunSummary, SyncDriver, UnitFailure};
pub use error::{Result, SyncError};
pub use filter::{Filter, FilterVerdict};
pub use unit::{UnitRun, UnitStatus};
