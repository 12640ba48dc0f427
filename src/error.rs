use std::io;
use thiserror::Error;

// Import module-level errors for AppError
use crate::config::ConfigError;
use crate::docker::DockerError;
use crate::exec::ExecError;
use crate::fsops::FsError;
use crate::git::GitError;
use crate::guardrails::GuardrailsError;

/// Top-level application error that wraps all module-specific errors
///
/// This provides a unified error type for application-level code while
/// preserving the specific error context from each module. All module
/// errors automatically convert to AppError via the `From` trait.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Git error: {0}")]
    Git(#[from] GitError),

    #[error("Command error: {0}")]
    Exec(#[from] ExecError),

    #[error("Filesystem error: {0}")]
    Fs(#[from] FsError),

    #[error("{0}")]
    Guardrails(#[from] GuardrailsError),

    #[error("Docker error: {0}")]
    Docker(#[from] DockerError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for application-level operations
pub type AppResult<T> = std::result::Result<T, AppError>;
