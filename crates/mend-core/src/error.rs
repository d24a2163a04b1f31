//! Unified error types for Mend

use thiserror::Error;

/// The git invocation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitStep {
    Clone,
    Add,
    Commit,
    Push,
}

impl GitStep {
    /// Prefix reported to callers when this step fails.
    pub fn error_prefix(&self) -> &'static str {
        match self {
            GitStep::Clone => "Error cloning repo",
            GitStep::Add | GitStep::Commit | GitStep::Push => "Error committing changes",
        }
    }
}

impl std::fmt::Display for GitStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GitStep::Clone => write!(f, "clone"),
            GitStep::Add => write!(f, "add"),
            GitStep::Commit => write!(f, "commit"),
            GitStep::Push => write!(f, "push"),
        }
    }
}

/// Unified error type for all Mend operations
#[derive(Error, Debug)]
pub enum MendError {
    // Lookup errors
    #[error("{0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Git errors
    #[error("{}: {stderr}", .step.error_prefix())]
    Vcs { step: GitStep, stderr: String },

    #[error("Git command failed: {0}")]
    GitCommand(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    // Text-generation API errors
    #[error("API error: {0}")]
    Api(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic
    #[error("{0}")]
    Other(String),
}

/// Result type alias using MendError
pub type Result<T> = std::result::Result<T, MendError>;
