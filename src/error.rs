use thiserror::Error;

use crate::{exit_codes::AzctxExitCode, manager::ManagerError};

/// Error types that can occur during CLI command execution
#[derive(Debug, Error)]
pub enum CliError {
    /// Error when an unsupported or undefined subcommand is encountered
    #[error("Undefined or unsupported subcommand: {0}")]
    UnsupportedSubcommand(String),
    /// Error related to configuration loading or management
    #[error("Configuration error: {0}")]
    ConfigurationError(#[from] crate::configuration::ConfigurationError),
    /// Error related to data formatting
    #[error("Formatting error: {0}")]
    FormattingError(#[from] crate::format::FormattingError),
    /// A precondition that aborts the whole operation
    #[error(transparent)]
    ManagerError(#[from] ManagerError),
}

impl CliError {
    /// Get the appropriate exit code for this error
    pub fn exit_code(&self) -> AzctxExitCode {
        AzctxExitCode::Failure
    }
}
