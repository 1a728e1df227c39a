use thiserror::Error;

#[derive(Error, Debug)]
pub enum JournalError {
    #[error("Journal IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Journal record contains a line break: {0:?}")]
    InvalidRecord(String),
}

pub type Result<T> = std::result::Result<T, JournalError>;
