//! # Journal & Durable State Module
//!
//! Owns the single append-only log file that makes sync runs resumable.
//!
//! ## Components
//!
//! - **Record Format** (`record`): line encoding for alias (`MAP:`) and
//!   completion (`OK:`) records sharing one file
//! - **Journal** (`journal`): in-memory index rebuilt at startup, append-only
//!   persistence, first-writer-wins alias semantics, exact-match completion
//!   lookups

pub mod error;
pub mod journal;
pub mod record;

pub use error::{JournalError, Result};
pub use journal::Journal;
pub use record::{JournalRecord, ALIAS_PREFIX, COMPLETED_PREFIX};
