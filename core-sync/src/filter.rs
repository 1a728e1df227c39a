//! Exclusion Filter for Unit Names
//!
//! Skips units whose name contains a configured exclusion term. Matching is
//! a case-sensitive substring test; any number of terms may be configured
//! and each is checked independently.

use serde::Serialize;

/// Verdict for one unit name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FilterVerdict {
    /// No term matched; the unit proceeds through the pipeline
    Proceed,
    /// A term matched; the unit is skipped without touching any state
    Skip {
        /// The first matching term
        term: String,
    },
}

/// Substring blacklist over unit names
#[derive(Debug, Clone, Default)]
pub struct Filter {
    terms: Vec<String>,
}

impl Filter {
    /// Create a filter from exclusion terms; empty terms are dropped
    pub fn new(terms: impl IntoIterator<Item = String>) -> Self {
        Self {
            terms: terms.into_iter().filter(|t| !t.is_empty()).collect(),
        }
    }

    /// Whether the filter has no terms and lets everything through
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Judge one unit name
    pub fn verdict(&self, name: &str) -> FilterVerdict {
        match self.terms.iter().find(|term| name.contains(term.as_str())) {
            Some(term) => FilterVerdict::Skip { term: term.clone() },
            None => FilterVerdict::Proceed,
        }
    }
}
