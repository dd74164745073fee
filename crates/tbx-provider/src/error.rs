//! Error types for subprocess invocation

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Failed to start {program}: {reason}")]
    SpawnError { program: String, reason: String },

    #[error("Command failed ({status}): {stderr}")]
    CommandFailed { status: String, stderr: String },

    #[error("Timed out after {}s waiting for command", .0.as_secs())]
    Timeout(Duration),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ProviderError>;
