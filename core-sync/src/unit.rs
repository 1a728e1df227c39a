//! # Per-Unit State Machine
//!
//! Tracks one unit of work through a run with validated state transitions.
//!
//! ## State Machine
//!
//! ```text
//! Pending → FilteredOut
//!     ↓   → AlreadyDone
//!     └──→ Classified → DirectoryEnsured → Transferred → Recorded
//!                 ↓             ↓
//!          FailedDirectory  FailedTransfer
//! ```
//!
//! `FilteredOut`, `AlreadyDone`, `Recorded` and the two failure states are
//! terminal for the unit; failures are terminal for the unit only, never for
//! the run. In dry-run the driver stops a unit at `Transferred`, since the
//! completion record is the one step a simulation must not take.

use crate::classifier::Classification;
use crate::error::{Result, SyncError};
use serde::Serialize;

/// Status of one unit of work within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnitStatus {
    /// Discovered but not yet judged
    Pending,
    /// Name matched an exclusion term
    FilteredOut,
    /// Completion record already present in the journal
    AlreadyDone,
    /// Owner key extracted and resolved
    Classified,
    /// Remote destination directory confirmed to exist
    DirectoryEnsured,
    /// Remote copy reported success
    Transferred,
    /// Completion record appended to the journal
    Recorded,
    /// Remote directory creation failed
    FailedDirectory,
    /// Remote copy failed
    FailedTransfer,
}

impl UnitStatus {
    /// Whether this status ends processing for the unit
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            UnitStatus::FilteredOut
                | UnitStatus::AlreadyDone
                | UnitStatus::Recorded
                | UnitStatus::FailedDirectory
                | UnitStatus::FailedTransfer
        )
    }

    /// Whether this status is a per-unit failure
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            UnitStatus::FailedDirectory | UnitStatus::FailedTransfer
        )
    }

    /// String form used in logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitStatus::Pending => "pending",
            UnitStatus::FilteredOut => "filtered-out",
            UnitStatus::AlreadyDone => "already-done",
            UnitStatus::Classified => "classified",
            UnitStatus::DirectoryEnsured => "directory-ensured",
            UnitStatus::Transferred => "transferred",
            UnitStatus::Recorded => "recorded",
            UnitStatus::FailedDirectory => "failed-directory",
            UnitStatus::FailedTransfer => "failed-transfer",
        }
    }
}

impl std::fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One unit of work advancing through a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitRun {
    /// Folder name, which doubles as the unit id
    pub name: String,
    /// Current status
    pub status: UnitStatus,
    /// Classification outcome, present from `Classified` onward
    pub classification: Option<Classification>,
    /// The exclusion term that matched, for `FilteredOut` units
    pub skip_term: Option<String>,
    /// Failure detail, for failed units
    pub error: Option<String>,
}

impl UnitRun {
    /// Create a unit in `Pending` state
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: UnitStatus::Pending,
            classification: None,
            skip_term: None,
            error: None,
        }
    }

    /// Mark the unit as excluded by the filter
    pub fn filtered_out(mut self, term: impl Into<String>) -> Result<Self> {
        self.transition(UnitStatus::FilteredOut)?;
        self.skip_term = Some(term.into());
        Ok(self)
    }

    /// Mark the unit as already present in the completion ledger
    pub fn already_done(mut self) -> Result<Self> {
        self.transition(UnitStatus::AlreadyDone)?;
        Ok(self)
    }

    /// Attach a classification and advance
    pub fn classified(mut self, classification: Classification) -> Result<Self> {
        self.transition(UnitStatus::Classified)?;
        self.classification = Some(classification);
        Ok(self)
    }

    /// Remote destination directory exists
    pub fn directory_ensured(mut self) -> Result<Self> {
        self.transition(UnitStatus::DirectoryEnsured)?;
        Ok(self)
    }

    /// Remote copy reported success
    pub fn transferred(mut self) -> Result<Self> {
        self.transition(UnitStatus::Transferred)?;
        Ok(self)
    }

    /// Completion record appended
    pub fn recorded(mut self) -> Result<Self> {
        self.transition(UnitStatus::Recorded)?;
        Ok(self)
    }

    /// Remote directory creation failed; terminal for this unit
    pub fn failed_directory(mut self, error: impl Into<String>) -> Result<Self> {
        self.transition(UnitStatus::FailedDirectory)?;
        self.error = Some(error.into());
        Ok(self)
    }

    /// Remote copy failed; terminal for this unit
    pub fn failed_transfer(mut self, error: impl Into<String>) -> Result<Self> {
        self.transition(UnitStatus::FailedTransfer)?;
        self.error = Some(error.into());
        Ok(self)
    }

    /// The canonical key, if the unit got far enough to have one
    pub fn resolved_key(&self) -> Option<&str> {
        self.classification.as_ref().map(|c| c.resolved_key.as_str())
    }

    fn transition(&mut self, to: UnitStatus) -> Result<()> {
        let valid = matches!(
            (self.status, to),
            (UnitStatus::Pending, UnitStatus::FilteredOut)
                | (UnitStatus::Pending, UnitStatus::AlreadyDone)
                | (UnitStatus::Pending, UnitStatus::Classified)
                | (UnitStatus::Classified, UnitStatus::DirectoryEnsured)
                | (UnitStatus::Classified, UnitStatus::FailedDirectory)
                | (UnitStatus::DirectoryEnsured, UnitStatus::Transferred)
                | (UnitStatus::DirectoryEnsured, UnitStatus::FailedTransfer)
                | (UnitStatus::Transferred, UnitStatus::Recorded)
        );

        if !valid {
            return Err(SyncError::InvalidTransition {
                from: self.status.as_str().to_string(),
                to: to.as_str().to_string(),
                reason: format!("Cannot transition from {} to {}", self.status, to),
            });
        }

        self.status = to;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classification() -> Classification {
        Classification {
            raw_key: "Bob".to_string(),
            resolved_key: "Bob".to_string(),
            newly_discovered: true,
        }
    }

    #[test]
    fn test_full_success_path() {
        let unit = UnitRun::new("Bob - NO.3")
            .classified(classification())
            .unwrap()
            .directory_ensured()
            .unwrap()
            .transferred()
            .unwrap()
            .recorded()
            .unwrap();

        assert_eq!(unit.status, UnitStatus::Recorded);
        assert!(unit.status.is_terminal());
        assert!(!unit.status.is_failure());
        assert_eq!(unit.resolved_key(), Some("Bob"));
    }

    #[test]
    fn test_filtered_out_is_terminal() {
        let unit = UnitRun::new("Bob draft").filtered_out("draft").unwrap();
        assert_eq!(unit.status, UnitStatus::FilteredOut);
        assert_eq!(unit.skip_term.as_deref(), Some("draft"));
        assert!(unit.classified(classification()).is_err());
    }

    #[test]
    fn test_already_done_is_terminal() {
        let unit = UnitRun::new("Bob - NO.3").already_done().unwrap();
        assert!(unit.status.is_terminal());
        assert!(unit.classified(classification()).is_err());
    }

    #[test]
    fn test_directory_failure_path() {
        let unit = UnitRun::new("Bob - NO.3")
            .classified(classification())
            .unwrap()
            .failed_directory("mkdir failed")
            .unwrap();

        assert_eq!(unit.status, UnitStatus::FailedDirectory);
        assert!(unit.status.is_failure());
        assert_eq!(unit.error.as_deref(), Some("mkdir failed"));
        assert!(unit.transferred().is_err());
    }

    #[test]
    fn test_transfer_failure_path() {
        let unit = UnitRun::new("Bob - NO.3")
            .classified(classification())
            .unwrap()
            .directory_ensured()
            .unwrap()
            .failed_transfer("scp exited 1")
            .unwrap();

        assert_eq!(unit.status, UnitStatus::FailedTransfer);
        assert!(unit.recorded().is_err());
    }

    #[test]
    fn test_record_requires_transfer() {
        // The completion record must never be written speculatively.
        let unit = UnitRun::new("Bob - NO.3").classified(classification()).unwrap();
        assert!(unit.clone().recorded().is_err());
        assert!(unit.directory_ensured().unwrap().recorded().is_err());
    }

    #[test]
    fn test_pending_cannot_skip_classification() {
        assert!(UnitRun::new("Bob").directory_ensured().is_err());
        assert!(UnitRun::new("Bob").transferred().is_err());
    }
}
