//! Exit codes for the azctx application
//!
//! Scripts can rely on three codes: success, failure and cancellation.

use crate::outcome::{ErrorKind, Outcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AzctxExitCode {
    /// Success (0) - Command completed, or ended with an informational outcome
    Success = 0,

    /// Failure (1) - The operation failed
    Failure = 1,

    /// Cancelled (130) - The user cancelled a prompt or interrupted the command
    Cancelled = 130,
}

impl AzctxExitCode {
    /// Convert to numeric exit code
    pub fn code(&self) -> i32 {
        *self as i32
    }

    /// Picks the exit code for an outcome. `benign` lists the failure kinds that
    /// still exit with success for this command.
    pub fn for_outcome<T>(outcome: &Outcome<T>, benign: &[ErrorKind]) -> AzctxExitCode {
        match outcome.error {
            _ if outcome.success => AzctxExitCode::Success,
            Some(ErrorKind::Cancelled) => AzctxExitCode::Cancelled,
            Some(kind) if benign.contains(&kind) => AzctxExitCode::Success,
            _ => AzctxExitCode::Failure,
        }
    }
}

impl From<AzctxExitCode> for i32 {
    fn from(code: AzctxExitCode) -> Self {
        code.code()
    }
}
