//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// QC run exceeded the configured timeout
    #[error("QC run timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// At least one check failed
    #[error("Session failed QC: {failed} check(s) failed")]
    SessionFailed { failed: usize },
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }
}
