//! Context manager: the switch, add, status, list and delete flows.
//!
//! Each operation is an independent request/response flow over the store, the
//! session gateway and the prompter. The only fatal condition is a missing
//! Azure CLI, returned as `Err`; every other condition is an [`Outcome`].

use crate::{
    context::{id_from_label, Context, ContextError},
    outcome::{
        AddPayload, ContextListing, ContextSummary, DeletePayload, ErrorKind, ListPayload, Outcome,
        StatusPayload, SwitchPayload,
    },
    prompt::{PromptError, Prompter, Validator},
    session::{AccountSnapshot, GatewayError, SessionGateway},
    store::{ContextStore, StoreError},
};
use chrono::Local;
use std::{collections::HashSet, sync::Arc};
use thiserror::Error;
use tracing::{debug, trace};

const NAME_RULE: &str = "Name must be between 1 and 100 characters";
const ID_RULE: &str = "ID must be 1-20 characters (alphanumeric, hyphens, underscores only)";

#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("Azure CLI is not installed or not in PATH")]
    CliNotFound,
}

/// Why an operation stopped early.
#[derive(Debug)]
enum Abort {
    Fatal(ManagerError),
    Fail(ErrorKind, String),
}

impl From<ManagerError> for Abort {
    fn from(error: ManagerError) -> Self {
        Abort::Fatal(error)
    }
}

impl From<GatewayError> for Abort {
    fn from(error: GatewayError) -> Self {
        match error {
            GatewayError::CliNotFound => Abort::Fatal(ManagerError::CliNotFound),
            GatewayError::NoActiveSession(message) => Abort::Fail(ErrorKind::NoSession, message),
            GatewayError::Io(e) => Abort::Fail(ErrorKind::Unknown, format!("Azure CLI failed: {}", e)),
        }
    }
}

impl From<StoreError> for Abort {
    fn from(error: StoreError) -> Self {
        Abort::Fail(ErrorKind::StorageError, error.to_string())
    }
}

impl From<PromptError> for Abort {
    fn from(error: PromptError) -> Self {
        Abort::Fail(ErrorKind::Unknown, error.to_string())
    }
}

impl From<ContextError> for Abort {
    fn from(error: ContextError) -> Self {
        Abort::Fail(ErrorKind::Unknown, error.to_string())
    }
}

/// Turns an early stop into a failed outcome with an empty payload, keeping
/// the fatal tier as `Err`.
fn finish<T: Default>(result: Result<Outcome<T>, Abort>) -> Result<Outcome<T>, ManagerError> {
    match result {
        Ok(outcome) => Ok(outcome),
        Err(Abort::Fatal(error)) => Err(error),
        Err(Abort::Fail(kind, message)) => {
            debug!("Operation failed with {}: {}", kind, message);
            Ok(Outcome::failed(kind, message, T::default()))
        }
    }
}

pub struct ContextManager<G, P> {
    store: ContextStore,
    gateway: G,
    prompter: P,
}

impl<G, P> ContextManager<G, P>
where
    G: SessionGateway,
    P: Prompter,
{
    pub fn new(store: ContextStore, gateway: G, prompter: P) -> Self {
        Self {
            store,
            gateway,
            prompter,
        }
    }

    pub fn store(&self) -> &ContextStore {
        &self.store
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn prompter(&self) -> &P {
        &self.prompter
    }

    /// Lets the user pick a saved context and switches the Azure CLI to it.
    pub async fn switch_interactive(&self) -> Result<Outcome<SwitchPayload>, ManagerError> {
        trace!("Executing interactive switch");
        finish(self.try_switch_interactive().await)
    }

    async fn try_switch_interactive(&self) -> Result<Outcome<SwitchPayload>, Abort> {
        self.ensure_available().await?;

        let contexts = self.store.load()?;
        if contexts.is_empty() {
            return Ok(Outcome::failed(
                ErrorKind::EmptyList,
                "No saved contexts found. Use 'azctx add' to save your current context first.",
                SwitchPayload::default(),
            ));
        }
        if let [only] = contexts.as_slice() {
            return Ok(Outcome::failed(
                ErrorKind::SingleContext,
                format!(
                    "Only one context saved: {} ({}). Use 'azctx add' to save more contexts before switching.",
                    only.context_name(),
                    only.context_id()
                ),
                SwitchPayload::with_context(only.clone()),
            ));
        }

        let options = contexts.iter().map(Context::label).collect();
        let selected = match self.prompter.select("Select a context to switch to:", options)? {
            Some(selected) => selected,
            None => {
                return Ok(Outcome::failed(
                    ErrorKind::Cancelled,
                    "Context switch cancelled",
                    SwitchPayload::default(),
                ))
            }
        };

        let context_id = id_from_label(&selected).unwrap_or(selected.as_str());
        let context = match self.store.find_by_id(context_id)? {
            Some(context) => context,
            None => {
                return Ok(Outcome::failed(
                    ErrorKind::NotFound,
                    format!("Context '{}' not found", context_id),
                    SwitchPayload::default(),
                ))
            }
        };

        self.apply_switch(context).await
    }

    /// Switches directly to the context with the given ID (case-sensitive).
    pub async fn switch_by_id(&self, context_id: &str) -> Result<Outcome<SwitchPayload>, ManagerError> {
        trace!("Executing direct switch to {:?}", context_id);
        finish(self.try_switch_by_id(context_id).await)
    }

    async fn try_switch_by_id(&self, context_id: &str) -> Result<Outcome<SwitchPayload>, Abort> {
        let context_id = context_id.trim();
        if context_id.is_empty() {
            return Ok(Outcome::failed(
                ErrorKind::EmptyId,
                "Context ID cannot be empty.",
                SwitchPayload::default(),
            ));
        }

        self.ensure_available().await?;

        let contexts = self.store.load()?;
        if contexts.is_empty() {
            return Ok(Outcome::failed(
                ErrorKind::EmptyList,
                "No saved contexts found. Use 'azctx add' to save your current context first.",
                SwitchPayload::default(),
            ));
        }

        let context = match contexts.iter().find(|c| c.context_id() == context_id) {
            Some(context) => context.clone(),
            None => {
                let mut available_ids: Vec<String> =
                    contexts.iter().map(|c| c.context_id().to_string()).collect();
                available_ids.sort();
                return Ok(Outcome::failed(
                    ErrorKind::NotFound,
                    format!(
                        "Context '{}' not found. Context IDs are case-sensitive.",
                        context_id
                    ),
                    SwitchPayload {
                        context: None,
                        available_ids,
                    },
                ));
            }
        };

        match self.gateway.get_current_account().await {
            Ok(current) if current.id == context.subscription_id() => {
                return Ok(Outcome::failed(
                    ErrorKind::AlreadyActive,
                    format!(
                        "Context '{}' ({}) is already active.",
                        context.context_name(),
                        context.context_id()
                    ),
                    SwitchPayload::with_context(context),
                ));
            }
            Ok(_) => {}
            Err(GatewayError::NoActiveSession(message)) => {
                return Ok(Outcome::failed(
                    ErrorKind::NoSession,
                    message,
                    SwitchPayload::with_context(context),
                ));
            }
            Err(e) => return Err(e.into()),
        }

        self.apply_switch(context).await
    }

    /// Requests the switch and reads the active account back to confirm it.
    async fn apply_switch(&self, context: Context) -> Result<Outcome<SwitchPayload>, Abort> {
        debug!(
            "Switching to context {} (subscription {})",
            context.context_id(),
            context.subscription_id()
        );

        if !self.gateway.set_account(context.subscription_id()).await? {
            return Ok(Outcome::failed(
                ErrorKind::SwitchFailed,
                format!(
                    "Azure CLI failed to switch to subscription '{}' for context '{}'.",
                    context.subscription_id(),
                    context.context_id()
                ),
                SwitchPayload::with_context(context),
            ));
        }

        let current = self.gateway.get_current_account().await?;
        if current.id != context.subscription_id() {
            return Ok(Outcome::failed(
                ErrorKind::VerificationFailed,
                format!(
                    "Failed to switch to context '{}'. Azure CLI returned different subscription.",
                    context.context_id()
                ),
                SwitchPayload::with_context(context),
            ));
        }

        Ok(Outcome::succeeded(
            format!("Successfully switched to context: {}", context.context_id()),
            SwitchPayload::with_context(context),
        ))
    }

    /// Saves the active Azure session under a user-chosen name and ID.
    pub async fn add_interactive(&self) -> Result<Outcome<AddPayload>, ManagerError> {
        trace!("Executing interactive add");
        finish(self.try_add_interactive().await)
    }

    async fn try_add_interactive(&self) -> Result<Outcome<AddPayload>, Abort> {
        self.ensure_available().await?;

        let account = self.gateway.get_current_account().await?;
        let contexts = self.store.load()?;

        if let Some(existing) = contexts.iter().find(|c| c.matches_account(&account)) {
            return Ok(Outcome::failed(
                ErrorKind::AlreadyExists,
                format!(
                    "This Azure context is already managed as '{}' ({}).\nSubscription: {}\nTenant: {}\nAccount: {}",
                    existing.context_name(),
                    existing.context_id(),
                    existing.subscription_name(),
                    existing.tenant_id(),
                    existing.username()
                ),
                AddPayload {
                    context: Some(existing.clone()),
                    current_account: Some(account),
                },
            ));
        }

        let context_name = match self.ask_context_name()? {
            Some(name) => name,
            None => return Ok(add_cancelled(account)),
        };

        let taken: HashSet<String> = contexts.iter().map(|c| c.context_id().to_string()).collect();
        let context_id = match self.ask_context_id(taken)? {
            Some(id) => id,
            None => return Ok(add_cancelled(account)),
        };

        let context = Context::builder()
            .context_id(&context_id)
            .context_name(&context_name)
            .account(&account)
            .created_at(Local::now())
            .build()?;

        match self.store.add(context.clone()) {
            Ok(()) => Ok(Outcome::succeeded(
                format!("Successfully added context: {}", context.context_name()),
                AddPayload {
                    context: Some(context),
                    current_account: Some(account),
                },
            )),
            Err(e) => Ok(Outcome::failed(
                ErrorKind::StorageError,
                format!("Failed to save context: {}", e),
                AddPayload {
                    context: None,
                    current_account: Some(account),
                },
            )),
        }
    }

    fn ask_context_name(&self) -> Result<Option<String>, Abort> {
        let validator: Validator = Arc::new(|input: &str| {
            if Context::validate_name(input) {
                Ok(())
            } else {
                Err(NAME_RULE.to_string())
            }
        });

        loop {
            let answer = self.prompter.text(
                "Enter a friendly name for this context (1-100 characters):",
                validator.clone(),
            )?;
            match answer {
                None => return Ok(None),
                Some(name) if Context::validate_name(&name) => return Ok(Some(name.trim().to_string())),
                Some(_) => self.prompter.notify(NAME_RULE),
            }
        }
    }

    /// Asks until the answer is a well-formed ID that is not already saved.
    fn ask_context_id(&self, taken: HashSet<String>) -> Result<Option<String>, Abort> {
        let validator: Validator = Arc::new(move |input: &str| {
            let candidate = input.trim();
            if !Context::validate_id(candidate) {
                Err(ID_RULE.to_string())
            } else if taken.contains(candidate) {
                Err(duplicate_id_message(candidate))
            } else {
                Ok(())
            }
        });

        loop {
            let answer = self.prompter.text(
                "Enter a short ID for this context (1-20 chars, alphanumeric/hyphens/underscores):",
                validator.clone(),
            )?;
            let candidate = match answer {
                None => return Ok(None),
                Some(answer) => answer.trim().to_string(),
            };

            if !Context::validate_id(&candidate) {
                self.prompter.notify(ID_RULE);
            } else if self.store.exists(&candidate)? {
                self.prompter.notify(&duplicate_id_message(&candidate));
            } else {
                return Ok(Some(candidate));
            }
        }
    }

    /// Reports the active Azure session and whether a saved context matches it.
    pub async fn status(&self, verbose: bool) -> Result<Outcome<StatusPayload>, ManagerError> {
        trace!("Executing status");
        let mut outcome = finish(self.try_status(verbose).await)?;
        outcome.payload.verbose = verbose;
        Ok(outcome)
    }

    async fn try_status(&self, verbose: bool) -> Result<Outcome<StatusPayload>, Abort> {
        self.ensure_available().await?;

        let account = self.gateway.get_current_account().await?;
        let contexts = self.store.load()?;

        let managed = contexts
            .into_iter()
            .find(|c| c.subscription_id() == account.id);

        Ok(match managed {
            Some(context) => Outcome::succeeded(
                "Current context is managed by azctx",
                StatusPayload {
                    context: Some(context),
                    current_account: Some(account),
                    is_managed: true,
                    verbose,
                },
            ),
            None => Outcome::succeeded(
                "Current context is not managed. Use 'azctx add' to save it.",
                StatusPayload {
                    context: None,
                    current_account: Some(account),
                    is_managed: false,
                    verbose,
                },
            ),
        })
    }

    /// Lists saved contexts in store order, in full or as (ID, name) pairs.
    pub fn list(&self, verbose: bool) -> Result<Outcome<ListPayload>, ManagerError> {
        trace!("Executing list");
        let mut outcome = finish(self.try_list(verbose))?;
        outcome.payload.verbose = verbose;
        Ok(outcome)
    }

    fn try_list(&self, verbose: bool) -> Result<Outcome<ListPayload>, Abort> {
        let contexts = self.store.load()?;
        if contexts.is_empty() {
            return Ok(Outcome::informational(
                ErrorKind::EmptyList,
                "No saved contexts found. Use 'azctx add' to save your current context.",
                ListPayload {
                    contexts: None,
                    verbose,
                },
            ));
        }

        let message = format!("Found {} saved context(s)", contexts.len());
        let listing = if verbose {
            ContextListing::Full(contexts)
        } else {
            ContextListing::Summary(contexts.iter().map(ContextSummary::from).collect())
        };

        Ok(Outcome::succeeded(
            message,
            ListPayload {
                contexts: Some(listing),
                verbose,
            },
        ))
    }

    /// Lets the user pick a saved context and deletes it after confirmation.
    ///
    /// The active Azure session is not touched.
    pub fn delete_interactive(&self) -> Result<Outcome<DeletePayload>, ManagerError> {
        trace!("Executing interactive delete");
        finish(self.try_delete_interactive())
    }

    fn try_delete_interactive(&self) -> Result<Outcome<DeletePayload>, Abort> {
        let contexts = self.store.load()?;
        if contexts.is_empty() {
            return Ok(Outcome::failed(
                ErrorKind::EmptyList,
                "No saved contexts found. Nothing to delete.",
                DeletePayload::default(),
            ));
        }

        let options = contexts.iter().map(Context::label).collect();
        let selected = match self.prompter.select("Select a context to delete:", options)? {
            Some(selected) => selected,
            None => return Ok(delete_cancelled()),
        };

        let context_id = id_from_label(&selected).unwrap_or(selected.as_str());
        let context = match self.store.find_by_id(context_id)? {
            Some(context) => context,
            None => {
                return Ok(Outcome::failed(
                    ErrorKind::NotFound,
                    format!("Context '{}' not found", context_id),
                    DeletePayload::default(),
                ))
            }
        };

        let question = format!(
            "Are you sure you want to delete context '{}' ({})?",
            context.context_name(),
            context.context_id()
        );
        if self.prompter.confirm(&question, false)? != Some(true) {
            return Ok(delete_cancelled());
        }

        self.store.delete(context.context_id())?;

        Ok(Outcome::succeeded(
            format!(
                "Successfully deleted context: {} ({})",
                context.context_name(),
                context.context_id()
            ),
            DeletePayload {
                context_id: Some(context.context_id().to_string()),
                context_name: Some(context.context_name().to_string()),
            },
        ))
    }

    async fn ensure_available(&self) -> Result<(), ManagerError> {
        if self.gateway.is_available().await {
            Ok(())
        } else {
            Err(ManagerError::CliNotFound)
        }
    }
}

fn duplicate_id_message(context_id: &str) -> String {
    format!(
        "Context ID '{}' already exists. Please choose a different ID.",
        context_id
    )
}

fn add_cancelled(account: AccountSnapshot) -> Outcome<AddPayload> {
    Outcome::failed(
        ErrorKind::Cancelled,
        "Context addition cancelled",
        AddPayload {
            context: None,
            current_account: Some(account),
        },
    )
}

fn delete_cancelled() -> Outcome<DeletePayload> {
    Outcome::failed(ErrorKind::Cancelled, "Deletion cancelled", DeletePayload::default())
}
