//! Error types for the OpenSSH transport

use thiserror::Error;

/// OpenSSH transport errors
#[derive(Error, Debug)]
pub enum SshError {
    /// The ssh/scp binary could not be started
    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The command ran but exited unsuccessfully
    #[error("{program} exited with {}: {stderr}", .code.map_or("signal".to_string(), |c| format!("status {c}")))]
    CommandFailed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
}

/// Result type for OpenSSH transport operations
pub type Result<T> = std::result::Result<T, SshError>;

impl From<SshError> for bridge_traits::error::BridgeError {
    fn from(error: SshError) -> Self {
        use bridge_traits::error::BridgeError;
        match &error {
            // Keep the spawn failure typed as IO, with the program name in
            // the message.
            SshError::Spawn { source, .. } => {
                BridgeError::Io(std::io::Error::new(source.kind(), error.to_string()))
            }
            SshError::CommandFailed { .. } => BridgeError::OperationFailed(error.to_string()),
        }
    }
}
