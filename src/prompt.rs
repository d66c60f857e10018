//! Interactive prompting.
//!
//! The core asks for input only through [`Prompter`]. Every call returns
//! `Ok(None)` when the user cancels, whether with Esc or with Ctrl+C.

use color_print::ceprintln;
use inquire::{
    validator::{ErrorMessage, Validation},
    Confirm, InquireError, Select, Text,
};
use std::sync::Arc;
use thiserror::Error;

/// Inline validation rule for text input. `Err` carries the message shown to
/// the user.
pub type Validator = Arc<dyn Fn(&str) -> Result<(), String> + Send + Sync>;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("terminal prompt failed: {0}")]
    Terminal(String),
}

impl From<InquireError> for PromptError {
    fn from(error: InquireError) -> Self {
        PromptError::Terminal(error.to_string())
    }
}

pub trait Prompter {
    /// Asks the user to pick one of `options`.
    fn select(&self, message: &str, options: Vec<String>) -> Result<Option<String>, PromptError>;

    /// Asks a yes/no question.
    fn confirm(&self, message: &str, default: bool) -> Result<Option<bool>, PromptError>;

    /// Asks for free text, re-asking inline until `validator` accepts it.
    fn text(&self, message: &str, validator: Validator) -> Result<Option<String>, PromptError>;

    /// Shows a message explaining why the previous answer was rejected.
    fn notify(&self, message: &str);
}

/// [`Prompter`] backed by `inquire` on the controlling terminal.
#[derive(Debug, Default)]
pub struct TerminalPrompter {}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {}
    }
}

impl Prompter for TerminalPrompter {
    fn select(&self, message: &str, options: Vec<String>) -> Result<Option<String>, PromptError> {
        let answer = Select::new(message, options)
            .with_help_message("↑↓ to move, enter to select, esc to cancel")
            .prompt();
        cancellable(answer)
    }

    fn confirm(&self, message: &str, default: bool) -> Result<Option<bool>, PromptError> {
        cancellable(Confirm::new(message).with_default(default).prompt())
    }

    fn text(&self, message: &str, validator: Validator) -> Result<Option<String>, PromptError> {
        let answer = Text::new(message)
            .with_validator(move |input: &str| match validator(input) {
                Ok(()) => Ok(Validation::Valid),
                Err(reason) => Ok(Validation::Invalid(ErrorMessage::Custom(reason))),
            })
            .prompt();
        cancellable(answer)
    }

    fn notify(&self, message: &str) {
        ceprintln!("<y>Error:</y> {}", message);
    }
}

fn cancellable<T>(answer: Result<T, InquireError>) -> Result<Option<T>, PromptError> {
    match answer {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled) | Err(InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(PromptError::from(e)),
    }
}
