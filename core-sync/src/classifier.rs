//! # Unit Classifier
//!
//! Derives an owner key from a unit's folder name and resolves it through
//! the journal's alias table.
//!
//! ## Overview
//!
//! Source folders follow several naming conventions that accumulated over
//! the years, so extraction is an ordered list of rules evaluated first
//! match wins. New conventions get a new rule; existing rules are never
//! touched:
//!
//! 1. `Name - NO.3`: hyphen separator immediately followed by the `NO.`
//!    numbering marker
//! 2. `Name \ NO.7`: backslash separator before the marker
//! 3. `Name - Artwork Set`: any hyphen-like separator (`-`, `–`, `—`)
//! 4. `Name2024`: longest leading run of non-digit, non-punctuation
//!    characters
//! 5. The whole name, when nothing else applies
//!
//! Classification never fails: every name yields a usable key.
//!
//! ## Alias Resolution
//!
//! The raw key is looked up in the journal. A hit returns the stored
//! mapping verbatim: operators hand-edit the journal between runs to
//! redirect a raw key's future placements, and that edit is authoritative.
//! A miss records the identity mapping so the operator has something to
//! edit before the next run; this happens in dry-run too, since alias
//! discovery is local state rather than a remote side effect.

use core_journal::Journal;
use serde::Serialize;
use tracing::debug;

/// Punctuation excluded from a leading-run key, alongside ASCII digits
const EXCLUDED_PUNCTUATION: &[char] = &[
    '[', ']', '(', ')', '.', ',', ':', ';', '"', '{', '}', '\\', '/',
];

type Extractor = fn(&str) -> Option<&str>;

/// Extraction rules in precedence order, first match wins
const RULES: &[(&str, Extractor)] = &[
    ("hyphen-numbering", extract_hyphen_numbering),
    ("backslash-numbering", extract_backslash_numbering),
    ("dash-separator", extract_dash_separator),
    ("leading-run", extract_leading_run),
];

fn extract_hyphen_numbering(name: &str) -> Option<&str> {
    name.find(" - NO.").map(|idx| &name[..idx])
}

fn extract_backslash_numbering(name: &str) -> Option<&str> {
    name.find(" \\ NO.").map(|idx| &name[..idx])
}

fn extract_dash_separator(name: &str) -> Option<&str> {
    name.find(['-', '–', '—']).map(|idx| &name[..idx])
}

fn extract_leading_run(name: &str) -> Option<&str> {
    let end = name
        .char_indices()
        .find(|(_, c)| c.is_ascii_digit() || EXCLUDED_PUNCTUATION.contains(c))
        .map_or(name.len(), |(idx, _)| idx);
    if end == 0 {
        None
    } else {
        Some(&name[..end])
    }
}

/// Extract the raw owner key from a unit name
///
/// Applies the rule list in precedence order; a rule whose extracted prefix
/// is empty after trimming does not count as a match. Falls back to the
/// whole name, trimmed.
pub fn extract_raw_key(name: &str) -> &str {
    for (rule, extract) in RULES {
        if let Some(prefix) = extract(name) {
            let key = prefix.trim();
            if !key.is_empty() {
                debug!(unit = name, rule, key, "Extracted raw key");
                return key;
            }
        }
    }
    name.trim()
}

/// Outcome of classifying one unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    /// Key extracted from the unit name, before alias resolution
    pub raw_key: String,
    /// Canonical key used for remote placement
    pub resolved_key: String,
    /// Whether this run appended a new alias record for the raw key
    pub newly_discovered: bool,
}

/// Classify a unit name, consulting and possibly extending the alias table
///
/// # Errors
///
/// Returns an error only if appending a newly discovered alias to the
/// journal fails; lookup and extraction are infallible.
pub async fn classify(name: &str, journal: &mut Journal) -> core_journal::Result<Classification> {
    let raw_key = extract_raw_key(name).to_string();

    if let Some(resolved) = journal.resolve_alias(&raw_key) {
        return Ok(Classification {
            resolved_key: resolved.to_string(),
            raw_key,
            newly_discovered: false,
        });
    }

    journal.record_alias(&raw_key, &raw_key).await?;
    Ok(Classification {
        resolved_key: raw_key.clone(),
        raw_key,
        newly_discovered: true,
    })
}
