use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to enumerate source directory {path}: {source}")]
    Enumeration {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid unit state transition from {from} to {to}: {reason}")]
    InvalidTransition {
        from: String,
        to: String,
        reason: String,
    },

    #[error(transparent)]
    Journal(#[from] core_journal::JournalError),
}

pub type Result<T> = std::result::Result<T, SyncError>;
