//! Structured results of context operations.
//!
//! Every operation returns an [`Outcome`] carrying a success flag, a message
//! for the user, an operation-specific payload, and on failure an
//! [`ErrorKind`]. The presentation layer depends only on this shape.

use crate::{context::Context, session::AccountSnapshot};
use serde::Serialize;
use strum::{AsRefStr, Display};

/// Machine-readable outcome kinds shared by all operations.
///
/// | kind | operations |
/// |---|---|
/// | `empty_list` | switch, list (informational), delete |
/// | `single_context` | interactive switch |
/// | `cancelled` | interactive switch, add, delete |
/// | `not_found` | switch, delete |
/// | `empty_id` | direct switch |
/// | `already_active` | direct switch (informational) |
/// | `switch_failed` | switch |
/// | `verification_failed` | switch |
/// | `no_session` | switch, add, status |
/// | `already_exists` | add |
/// | `storage_error` | all |
/// | `unknown` | all |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    EmptyList,
    SingleContext,
    Cancelled,
    NotFound,
    EmptyId,
    AlreadyActive,
    SwitchFailed,
    VerificationFailed,
    NoSession,
    AlreadyExists,
    StorageError,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome<T> {
    pub success: bool,
    pub message: String,
    pub error: Option<ErrorKind>,
    #[serde(flatten)]
    pub payload: T,
}

impl<T> Outcome<T> {
    pub fn succeeded(message: impl Into<String>, payload: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            error: None,
            payload,
        }
    }

    pub fn failed(kind: ErrorKind, message: impl Into<String>, payload: T) -> Self {
        Self {
            success: false,
            message: message.into(),
            error: Some(kind),
            payload,
        }
    }

    /// A successful outcome that still carries a kind, such as an empty list.
    pub fn informational(kind: ErrorKind, message: impl Into<String>, payload: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            error: Some(kind),
            payload,
        }
    }

    pub fn is(&self, kind: ErrorKind) -> bool {
        self.error == Some(kind)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SwitchPayload {
    pub context: Option<Context>,
    /// All saved IDs, sorted, when the requested ID was not found.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub available_ids: Vec<String>,
}

impl SwitchPayload {
    pub fn with_context(context: Context) -> Self {
        Self {
            context: Some(context),
            available_ids: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AddPayload {
    pub context: Option<Context>,
    pub current_account: Option<AccountSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct StatusPayload {
    pub context: Option<Context>,
    pub current_account: Option<AccountSnapshot>,
    pub is_managed: bool,
    pub verbose: bool,
}

/// ID and name of a saved context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextSummary {
    pub context_id: String,
    pub context_name: String,
}

impl From<&Context> for ContextSummary {
    fn from(context: &Context) -> Self {
        Self {
            context_id: context.context_id().to_string(),
            context_name: context.context_name().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ContextListing {
    Full(Vec<Context>),
    Summary(Vec<ContextSummary>),
}

impl ContextListing {
    pub fn len(&self) -> usize {
        match self {
            ContextListing::Full(contexts) => contexts.len(),
            ContextListing::Summary(summaries) => summaries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ListPayload {
    pub contexts: Option<ContextListing>,
    pub verbose: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DeletePayload {
    pub context_id: Option<String>,
    pub context_name: Option<String>,
}
