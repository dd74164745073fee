//! Error types for tbx-core

use crate::Intent;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(#[from] tbx_config::ConfigError),

    #[error("{0}")]
    Provider(#[from] tbx_provider::ProviderError),

    #[error("Please select a container.")]
    NoContainerSelected,

    #[error("Cannot get active editor view.")]
    NoActiveDocument,

    #[error("Cannot {requested} now: {running} on '{container}' is still in progress")]
    Busy {
        requested: Intent,
        running: Intent,
        container: String,
    },

    #[error("Unexpected running state for '{container}': {output:?}")]
    UnexpectedRunningState { container: String, output: String },
}

impl CoreError {
    /// Errors caused by the request itself rather than by an external command
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            CoreError::NoContainerSelected | CoreError::NoActiveDocument | CoreError::Busy { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
