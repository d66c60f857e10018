use async_trait::async_trait;
use azctx::{
    context::Context,
    manager::{ContextManager, ManagerError},
    outcome::{ContextListing, ErrorKind},
    prompt::{PromptError, Prompter, Validator},
    session::{AccountSnapshot, AccountUser, GatewayError, SessionGateway},
    store::ContextStore,
};
use std::{collections::VecDeque, sync::Mutex};
use tempfile::TempDir;

const NO_SESSION: &str = "No active Azure session. Run 'az login' first.";

fn account(subscription_id: &str) -> AccountSnapshot {
    AccountSnapshot {
        id: subscription_id.to_string(),
        name: format!("Subscription {}", subscription_id),
        tenant_id: "tenant-1".to_string(),
        user: AccountUser {
            name: "dev@example.com".to_string(),
        },
    }
}

fn context(context_id: &str, subscription_id: &str) -> Context {
    Context::builder()
        .context_id(context_id)
        .context_name(&format!("{} environment", context_id))
        .account(&account(subscription_id))
        .build()
        .unwrap()
}

/// Gateway that answers `get_current_account` from a script and records
/// every `set_account` call.
struct FakeGateway {
    available: bool,
    accounts: Mutex<VecDeque<Result<AccountSnapshot, GatewayError>>>,
    set_result: bool,
    set_calls: Mutex<Vec<String>>,
}

impl FakeGateway {
    fn new(accounts: Vec<Result<AccountSnapshot, GatewayError>>) -> Self {
        Self {
            available: true,
            accounts: Mutex::new(accounts.into()),
            set_result: true,
            set_calls: Mutex::new(Vec::new()),
        }
    }

    fn active(subscriptions: &[&str]) -> Self {
        Self::new(subscriptions.iter().map(|id| Ok(account(id))).collect())
    }

    fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new(Vec::new())
        }
    }

    fn set_calls(&self) -> Vec<String> {
        self.set_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionGateway for FakeGateway {
    async fn is_available(&self) -> bool {
        self.available
    }

    async fn get_current_account(&self) -> Result<AccountSnapshot, GatewayError> {
        self.accounts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::NoActiveSession(NO_SESSION.to_string())))
    }

    async fn set_account(&self, subscription_id: &str) -> Result<bool, GatewayError> {
        self.set_calls
            .lock()
            .unwrap()
            .push(subscription_id.to_string());
        Ok(self.set_result)
    }
}

#[derive(Debug)]
enum Answer {
    Select(Option<String>),
    Confirm(Option<bool>),
    Text(Option<String>),
}

/// Prompter that replays queued answers. Text answers bypass the inline
/// validator so the manager's own re-checks are exercised.
#[derive(Default)]
struct FakePrompter {
    answers: Mutex<VecDeque<Answer>>,
    notifications: Mutex<Vec<String>>,
    options_seen: Mutex<Vec<Vec<String>>>,
}

impl FakePrompter {
    fn answering(answers: Vec<Answer>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            ..Self::default()
        }
    }

    fn next(&self) -> Answer {
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted answer left")
    }

    fn notifications(&self) -> Vec<String> {
        self.notifications.lock().unwrap().clone()
    }
}

impl Prompter for FakePrompter {
    fn select(&self, _message: &str, options: Vec<String>) -> Result<Option<String>, PromptError> {
        self.options_seen.lock().unwrap().push(options);
        match self.next() {
            Answer::Select(answer) => Ok(answer),
            other => panic!("expected a select answer, got {:?}", other),
        }
    }

    fn confirm(&self, _message: &str, _default: bool) -> Result<Option<bool>, PromptError> {
        match self.next() {
            Answer::Confirm(answer) => Ok(answer),
            other => panic!("expected a confirm answer, got {:?}", other),
        }
    }

    fn text(&self, _message: &str, _validator: Validator) -> Result<Option<String>, PromptError> {
        match self.next() {
            Answer::Text(answer) => Ok(answer),
            other => panic!("expected a text answer, got {:?}", other),
        }
    }

    fn notify(&self, message: &str) {
        self.notifications.lock().unwrap().push(message.to_string());
    }
}

fn store_with(dir: &TempDir, contexts: &[Context]) -> ContextStore {
    let store = ContextStore::new(dir.path().join("contexts.yaml"));
    if !contexts.is_empty() {
        store.save(contexts).unwrap();
    }
    store
}

fn manager(
    store: ContextStore,
    gateway: FakeGateway,
    prompter: FakePrompter,
) -> ContextManager<FakeGateway, FakePrompter> {
    ContextManager::new(store, gateway, prompter)
}

fn select(label: &str) -> Answer {
    Answer::Select(Some(label.to_string()))
}

fn text(value: &str) -> Answer {
    Answer::Text(Some(value.to_string()))
}

#[tokio::test]
async fn test_direct_switch_succeeds_and_verifies() {
    let dir = TempDir::new().unwrap();
    let store = store_with(&dir, &[context("DEV", "sub-1")]);
    let manager = manager(
        store,
        FakeGateway::active(&["sub-2", "sub-1"]),
        FakePrompter::default(),
    );

    let outcome = manager.switch_by_id("DEV").await.unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.error, None);
    assert_eq!(manager.gateway().set_calls(), vec!["sub-1".to_string()]);
    assert_eq!(
        outcome.payload.context.unwrap().context_id(),
        "DEV"
    );
}

#[tokio::test]
async fn test_direct_switch_already_active_skips_set_account() {
    let dir = TempDir::new().unwrap();
    let store = store_with(&dir, &[context("DEV", "sub-1")]);
    let manager = manager(store, FakeGateway::active(&["sub-1"]), FakePrompter::default());

    let outcome = manager.switch_by_id("DEV").await.unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.error, Some(ErrorKind::AlreadyActive));
    assert!(manager.gateway().set_calls().is_empty());
}

#[tokio::test]
async fn test_direct_switch_is_case_sensitive() {
    let dir = TempDir::new().unwrap();
    let store = store_with(&dir, &[context("DEV", "sub-1")]);
    let manager = manager(store, FakeGateway::active(&["sub-2"]), FakePrompter::default());

    let outcome = manager.switch_by_id("dev").await.unwrap();

    assert_eq!(outcome.error, Some(ErrorKind::NotFound));
    assert!(manager.gateway().set_calls().is_empty());
}

#[tokio::test]
async fn test_direct_switch_not_found_lists_sorted_ids() {
    let dir = TempDir::new().unwrap();
    let store = store_with(
        &dir,
        &[
            context("PROD", "sub-3"),
            context("DEV", "sub-1"),
            context("QA", "sub-2"),
        ],
    );
    let manager = manager(store, FakeGateway::active(&[]), FakePrompter::default());

    let outcome = manager.switch_by_id("UNKNOWN").await.unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.error, Some(ErrorKind::NotFound));
    assert_eq!(outcome.payload.available_ids, vec!["DEV", "PROD", "QA"]);
}

#[tokio::test]
async fn test_direct_switch_empty_id() {
    let dir = TempDir::new().unwrap();
    let store = store_with(&dir, &[context("DEV", "sub-1")]);
    let manager = manager(store, FakeGateway::unavailable(), FakePrompter::default());

    let outcome = manager.switch_by_id("   ").await.unwrap();

    assert_eq!(outcome.error, Some(ErrorKind::EmptyId));
}

#[tokio::test]
async fn test_direct_switch_trims_id() {
    let dir = TempDir::new().unwrap();
    let store = store_with(&dir, &[context("DEV", "sub-1")]);
    let manager = manager(
        store,
        FakeGateway::active(&["sub-2", "sub-1"]),
        FakePrompter::default(),
    );

    let outcome = manager.switch_by_id(" DEV ").await.unwrap();

    assert!(outcome.success);
}

#[tokio::test]
async fn test_direct_switch_empty_store() {
    let dir = TempDir::new().unwrap();
    let manager = manager(store_with(&dir, &[]), FakeGateway::active(&[]), FakePrompter::default());

    let outcome = manager.switch_by_id("DEV").await.unwrap();

    assert_eq!(outcome.error, Some(ErrorKind::EmptyList));
}

#[tokio::test]
async fn test_direct_switch_verification_failed() {
    let dir = TempDir::new().unwrap();
    let store = store_with(&dir, &[context("DEV", "sub-1")]);
    let manager = manager(
        store,
        FakeGateway::active(&["sub-2", "sub-2"]),
        FakePrompter::default(),
    );

    let outcome = manager.switch_by_id("DEV").await.unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.error, Some(ErrorKind::VerificationFailed));
    assert_eq!(manager.gateway().set_calls(), vec!["sub-1".to_string()]);
}

#[tokio::test]
async fn test_direct_switch_failed_command() {
    let dir = TempDir::new().unwrap();
    let store = store_with(&dir, &[context("DEV", "sub-1")]);
    let gateway = FakeGateway {
        set_result: false,
        ..FakeGateway::active(&["sub-2"])
    };
    let manager = manager(store, gateway, FakePrompter::default());

    let outcome = manager.switch_by_id("DEV").await.unwrap();

    assert_eq!(outcome.error, Some(ErrorKind::SwitchFailed));
}

#[tokio::test]
async fn test_direct_switch_without_session() {
    let dir = TempDir::new().unwrap();
    let store = store_with(&dir, &[context("DEV", "sub-1")]);
    let manager = manager(store, FakeGateway::active(&[]), FakePrompter::default());

    let outcome = manager.switch_by_id("DEV").await.unwrap();

    assert_eq!(outcome.error, Some(ErrorKind::NoSession));
    assert_eq!(outcome.message, NO_SESSION);
    assert!(manager.gateway().set_calls().is_empty());
}

#[tokio::test]
async fn test_missing_cli_is_fatal() {
    let dir = TempDir::new().unwrap();
    let store = store_with(&dir, &[context("DEV", "sub-1"), context("PROD", "sub-2")]);
    let manager = manager(store, FakeGateway::unavailable(), FakePrompter::default());

    assert!(matches!(
        manager.switch_by_id("DEV").await,
        Err(ManagerError::CliNotFound)
    ));
    assert!(matches!(
        manager.switch_interactive().await,
        Err(ManagerError::CliNotFound)
    ));
    assert!(matches!(
        manager.add_interactive().await,
        Err(ManagerError::CliNotFound)
    ));
    assert!(matches!(
        manager.status(false).await,
        Err(ManagerError::CliNotFound)
    ));
}

#[tokio::test]
async fn test_interactive_switch_empty_store() {
    let dir = TempDir::new().unwrap();
    let manager = manager(store_with(&dir, &[]), FakeGateway::active(&[]), FakePrompter::default());

    let outcome = manager.switch_interactive().await.unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.error, Some(ErrorKind::EmptyList));
}

#[tokio::test]
async fn test_interactive_switch_single_context() {
    let dir = TempDir::new().unwrap();
    let store = store_with(&dir, &[context("DEV", "sub-1")]);
    let manager = manager(store, FakeGateway::active(&[]), FakePrompter::default());

    let outcome = manager.switch_interactive().await.unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.error, Some(ErrorKind::SingleContext));
    assert_eq!(outcome.payload.context.unwrap().context_id(), "DEV");
}

#[tokio::test]
async fn test_interactive_switch_selects_by_label() {
    let dir = TempDir::new().unwrap();
    let store = store_with(&dir, &[context("DEV", "sub-1"), context("PROD", "sub-2")]);
    let manager = manager(
        store,
        FakeGateway::active(&["sub-2"]),
        FakePrompter::answering(vec![select("PROD environment (PROD)")]),
    );

    let outcome = manager.switch_interactive().await.unwrap();

    assert!(outcome.success);
    assert_eq!(manager.gateway().set_calls(), vec!["sub-2".to_string()]);
}

#[tokio::test]
async fn test_interactive_switch_cancelled() {
    let dir = TempDir::new().unwrap();
    let store = store_with(&dir, &[context("DEV", "sub-1"), context("PROD", "sub-2")]);
    let manager = manager(
        store,
        FakeGateway::active(&[]),
        FakePrompter::answering(vec![Answer::Select(None)]),
    );

    let outcome = manager.switch_interactive().await.unwrap();

    assert_eq!(outcome.error, Some(ErrorKind::Cancelled));
    assert!(manager.gateway().set_calls().is_empty());
}

#[tokio::test]
async fn test_interactive_switch_verification_failed() {
    let dir = TempDir::new().unwrap();
    let store = store_with(&dir, &[context("DEV", "sub-1"), context("PROD", "sub-2")]);
    let manager = manager(
        store,
        FakeGateway::active(&["sub-9"]),
        FakePrompter::answering(vec![select("PROD environment (PROD)")]),
    );

    let outcome = manager.switch_interactive().await.unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.error, Some(ErrorKind::VerificationFailed));
    assert_eq!(manager.gateway().set_calls(), vec!["sub-2".to_string()]);
    assert_eq!(outcome.payload.context.unwrap().context_id(), "PROD");
}

#[tokio::test]
async fn test_interactive_switch_failed_command() {
    let dir = TempDir::new().unwrap();
    let store = store_with(&dir, &[context("DEV", "sub-1"), context("PROD", "sub-2")]);
    let gateway = FakeGateway {
        set_result: false,
        ..FakeGateway::active(&["sub-1"])
    };
    let manager = manager(
        store,
        gateway,
        FakePrompter::answering(vec![select("PROD environment (PROD)")]),
    );

    let outcome = manager.switch_interactive().await.unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.error, Some(ErrorKind::SwitchFailed));
    assert_eq!(manager.gateway().set_calls(), vec!["sub-2".to_string()]);
}

#[tokio::test]
async fn test_interactive_switch_unknown_selection() {
    let dir = TempDir::new().unwrap();
    let store = store_with(&dir, &[context("DEV", "sub-1"), context("PROD", "sub-2")]);
    let manager = manager(
        store,
        FakeGateway::active(&["sub-1"]),
        FakePrompter::answering(vec![select("Ghost (GHOST)")]),
    );

    let outcome = manager.switch_interactive().await.unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.error, Some(ErrorKind::NotFound));
    assert_eq!(outcome.message, "Context 'GHOST' not found");
    assert!(manager.gateway().set_calls().is_empty());
}

#[tokio::test]
async fn test_add_saves_current_session() {
    let dir = TempDir::new().unwrap();
    let store = store_with(&dir, &[]);
    let manager = manager(
        store,
        FakeGateway::active(&["sub-1"]),
        FakePrompter::answering(vec![text("  Development  "), text("DEV")]),
    );

    let outcome = manager.add_interactive().await.unwrap();

    assert!(outcome.success);
    let saved = manager.store().find_by_id("DEV").unwrap().unwrap();
    assert_eq!(saved.context_name(), "Development");
    assert_eq!(saved.subscription_id(), "sub-1");
    assert_eq!(saved.tenant_name(), saved.tenant_id());
}

#[tokio::test]
async fn test_add_rejects_managed_session() {
    let dir = TempDir::new().unwrap();
    let store = store_with(&dir, &[context("DEV", "sub-1")]);
    let manager = manager(store, FakeGateway::active(&["sub-1"]), FakePrompter::default());

    let outcome = manager.add_interactive().await.unwrap();

    assert_eq!(outcome.error, Some(ErrorKind::AlreadyExists));
    assert_eq!(outcome.payload.context.unwrap().context_id(), "DEV");
    assert_eq!(manager.store().load().unwrap().len(), 1);
}

#[tokio::test]
async fn test_add_reprompts_on_duplicate_id() {
    let dir = TempDir::new().unwrap();
    let store = store_with(&dir, &[context("DEV", "sub-1")]);
    let manager = manager(
        store,
        FakeGateway::active(&["sub-2"]),
        FakePrompter::answering(vec![text("Staging"), text("DEV"), text("bad id!"), text("STAGE")]),
    );

    let outcome = manager.add_interactive().await.unwrap();

    assert!(outcome.success);
    let ids: Vec<String> = manager
        .store()
        .load()
        .unwrap()
        .iter()
        .map(|c| c.context_id().to_string())
        .collect();
    assert_eq!(ids, vec!["DEV", "STAGE"]);

    let notifications = manager_notifications(&manager);
    assert_eq!(notifications.len(), 2);
    assert!(notifications[0].contains("'DEV' already exists"));
}

#[tokio::test]
async fn test_add_cancelled_at_name() {
    let dir = TempDir::new().unwrap();
    let manager = manager(
        store_with(&dir, &[]),
        FakeGateway::active(&["sub-1"]),
        FakePrompter::answering(vec![Answer::Text(None)]),
    );

    let outcome = manager.add_interactive().await.unwrap();

    assert_eq!(outcome.error, Some(ErrorKind::Cancelled));
    assert!(manager.store().load().unwrap().is_empty());
}

#[tokio::test]
async fn test_add_cancelled_at_id() {
    let dir = TempDir::new().unwrap();
    let manager = manager(
        store_with(&dir, &[]),
        FakeGateway::active(&["sub-1"]),
        FakePrompter::answering(vec![text("Staging"), Answer::Text(None)]),
    );

    let outcome = manager.add_interactive().await.unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.error, Some(ErrorKind::Cancelled));
    assert!(manager.store().load().unwrap().is_empty());
}

/// The store directory is a dangling symlink: reading finds no file, but the
/// directory can never be created, so the write fails.
#[cfg(unix)]
#[tokio::test]
async fn test_add_reports_failed_save() {
    let dir = TempDir::new().unwrap();
    let link = dir.path().join("link");
    std::os::unix::fs::symlink(dir.path().join("missing/dir"), &link).unwrap();
    let manager = manager(
        ContextStore::new(link.join("contexts.yaml")),
        FakeGateway::active(&["sub-1"]),
        FakePrompter::answering(vec![text("Development"), text("DEV")]),
    );

    let outcome = manager.add_interactive().await.unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.error, Some(ErrorKind::StorageError));
    assert!(outcome.message.starts_with("Failed to save context:"));
    assert!(outcome.payload.context.is_none());
    assert_eq!(outcome.payload.current_account.unwrap().id, "sub-1");
}

#[tokio::test]
async fn test_add_without_session() {
    let dir = TempDir::new().unwrap();
    let manager = manager(store_with(&dir, &[]), FakeGateway::active(&[]), FakePrompter::default());

    let outcome = manager.add_interactive().await.unwrap();

    assert_eq!(outcome.error, Some(ErrorKind::NoSession));
}

#[tokio::test]
async fn test_status_managed_and_unmanaged() {
    let dir = TempDir::new().unwrap();
    let store = store_with(&dir, &[context("DEV", "sub-1")]);
    let manager = manager(
        store,
        FakeGateway::active(&["sub-1", "sub-9"]),
        FakePrompter::default(),
    );

    let managed = manager.status(true).await.unwrap();
    assert!(managed.success);
    assert!(managed.payload.is_managed);
    assert!(managed.payload.verbose);
    assert_eq!(managed.payload.context.unwrap().context_id(), "DEV");

    let unmanaged = manager.status(false).await.unwrap();
    assert!(unmanaged.success);
    assert!(!unmanaged.payload.is_managed);
    assert!(unmanaged.payload.context.is_none());
    assert_eq!(unmanaged.payload.current_account.unwrap().id, "sub-9");
}

#[tokio::test]
async fn test_status_without_session() {
    let dir = TempDir::new().unwrap();
    let manager = manager(store_with(&dir, &[]), FakeGateway::active(&[]), FakePrompter::default());

    let outcome = manager.status(true).await.unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.error, Some(ErrorKind::NoSession));
    assert!(outcome.payload.verbose);
}

#[test]
fn test_list_empty_store() {
    let dir = TempDir::new().unwrap();
    let manager = manager(store_with(&dir, &[]), FakeGateway::unavailable(), FakePrompter::default());

    let outcome = manager.list(false).unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.error, Some(ErrorKind::EmptyList));
    assert!(outcome.payload.contexts.is_none());
}

#[test]
fn test_list_keeps_store_order() {
    let dir = TempDir::new().unwrap();
    let store = store_with(&dir, &[context("PROD", "sub-2"), context("DEV", "sub-1")]);
    let manager = manager(store, FakeGateway::unavailable(), FakePrompter::default());

    let outcome = manager.list(false).unwrap();
    assert_eq!(outcome.message, "Found 2 saved context(s)");
    match outcome.payload.contexts {
        Some(ContextListing::Summary(summaries)) => {
            assert_eq!(summaries[0].context_id, "PROD");
            assert_eq!(summaries[1].context_id, "DEV");
        }
        other => panic!("expected a summary listing, got {:?}", other),
    }

    let verbose = manager.list(true).unwrap();
    assert!(matches!(
        verbose.payload.contexts,
        Some(ContextListing::Full(ref contexts)) if contexts.len() == 2
    ));
}

#[test]
fn test_delete_after_confirmation() {
    let dir = TempDir::new().unwrap();
    let store = store_with(&dir, &[context("DEV", "sub-1"), context("PROD", "sub-2")]);
    let manager = manager(
        store,
        FakeGateway::unavailable(),
        FakePrompter::answering(vec![select("DEV environment (DEV)"), Answer::Confirm(Some(true))]),
    );

    let outcome = manager.delete_interactive().unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.payload.context_id.as_deref(), Some("DEV"));
    assert!(!manager.store().exists("DEV").unwrap());
    assert!(manager.store().exists("PROD").unwrap());
}

#[test]
fn test_delete_declined() {
    let dir = TempDir::new().unwrap();
    let store = store_with(&dir, &[context("DEV", "sub-1")]);
    let manager = manager(
        store,
        FakeGateway::unavailable(),
        FakePrompter::answering(vec![select("DEV environment (DEV)"), Answer::Confirm(Some(false))]),
    );

    let outcome = manager.delete_interactive().unwrap();

    assert_eq!(outcome.error, Some(ErrorKind::Cancelled));
    assert!(manager.store().exists("DEV").unwrap());
}

#[test]
fn test_delete_cancelled_at_selection() {
    let dir = TempDir::new().unwrap();
    let store = store_with(&dir, &[context("DEV", "sub-1"), context("PROD", "sub-2")]);
    let manager = manager(
        store,
        FakeGateway::unavailable(),
        FakePrompter::answering(vec![Answer::Select(None)]),
    );

    let outcome = manager.delete_interactive().unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.error, Some(ErrorKind::Cancelled));
    assert!(manager.store().exists("DEV").unwrap());
    assert!(manager.store().exists("PROD").unwrap());
}

#[test]
fn test_delete_empty_store() {
    let dir = TempDir::new().unwrap();
    let manager = manager(store_with(&dir, &[]), FakeGateway::unavailable(), FakePrompter::default());

    let outcome = manager.delete_interactive().unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.error, Some(ErrorKind::EmptyList));
}

#[test]
fn test_malformed_store_is_storage_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("contexts.yaml");
    std::fs::write(&path, "contexts: [unterminated").unwrap();
    let manager = manager(
        ContextStore::new(path),
        FakeGateway::unavailable(),
        FakePrompter::default(),
    );

    let outcome = manager.list(false).unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.error, Some(ErrorKind::StorageError));
}

fn manager_notifications(manager: &ContextManager<FakeGateway, FakePrompter>) -> Vec<String> {
    manager.prompter().notifications()
}
