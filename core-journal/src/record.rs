//! # Journal Record Format
//!
//! Line-oriented encoding for the two durable record kinds:
//!
//! ```text
//! MAP:<raw_key>|<resolved_key>
//! OK:<unit_id>
//! ```
//!
//! Both kinds share one file, distinguished by prefix. Lines that match
//! neither prefix, or a `MAP:` line without a `|` separator, are malformed;
//! callers skip them rather than abort (operators edit this file by hand).
//!
//! Keys are taken verbatim after the prefix: unit ids are directory names,
//! and a name with surrounding whitespace must match its own record on
//! reload. Only the line terminator is stripped.

/// Prefix for alias records
pub const ALIAS_PREFIX: &str = "MAP:";

/// Prefix for completion records
pub const COMPLETED_PREFIX: &str = "OK:";

/// A single parsed journal line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JournalRecord {
    /// Maps a raw classifier key to the canonical key used for placement
    Alias {
        raw_key: String,
        resolved_key: String,
    },
    /// Marks a unit of work as successfully transferred
    Completed { unit_id: String },
}

impl JournalRecord {
    /// Parse one journal line
    ///
    /// Returns `None` for malformed lines and for blank lines. Keys are kept
    /// verbatim; only the line terminator is stripped, so a record written by
    /// [`encode`](Self::encode) parses back to an identical record.
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return None;
        }

        if let Some(rest) = line.strip_prefix(ALIAS_PREFIX) {
            let (raw, resolved) = rest.split_once('|')?;
            if raw.is_empty() || resolved.is_empty() {
                return None;
            }
            return Some(JournalRecord::Alias {
                raw_key: raw.to_string(),
                resolved_key: resolved.to_string(),
            });
        }

        if let Some(unit) = line.strip_prefix(COMPLETED_PREFIX) {
            if unit.is_empty() {
                return None;
            }
            return Some(JournalRecord::Completed {
                unit_id: unit.to_string(),
            });
        }

        None
    }

    /// Encode this record as one journal line, without the trailing newline
    pub fn encode(&self) -> String {
        match self {
            JournalRecord::Alias {
                raw_key,
                resolved_key,
            } => format!("{ALIAS_PREFIX}{raw_key}|{resolved_key}"),
            JournalRecord::Completed { unit_id } => format!("{COMPLETED_PREFIX}{unit_id}"),
        }
    }
}
