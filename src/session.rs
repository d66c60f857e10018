//! Session gateway contract.
//!
//! The gateway is the only path to the externally active Azure session. The
//! core reads the active account through it and asks it to switch
//! subscriptions; it never talks to Azure directly.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Azure CLI is not installed or not in PATH")]
    CliNotFound,
    #[error("{0}")]
    NoActiveSession(String),
    #[error("failed to run Azure CLI: {0}")]
    Io(#[from] std::io::Error),
}

/// The user principal reported for the active account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountUser {
    pub name: String,
}

/// The externally active account, as reported by `az account show`.
///
/// Not persisted; only compared against saved contexts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    /// Subscription ID.
    pub id: String,
    /// Subscription display name.
    pub name: String,
    #[serde(rename = "tenantId")]
    pub tenant_id: String,
    pub user: AccountUser,
}

/// Read and switch access to the single globally active session.
#[async_trait]
pub trait SessionGateway: Send + Sync {
    /// Checks that the external tool is installed and runnable.
    async fn is_available(&self) -> bool;

    /// Fetches the active account.
    ///
    /// Fails with [`GatewayError::CliNotFound`] if the tool is missing and with
    /// [`GatewayError::NoActiveSession`] if no authenticated session exists.
    async fn get_current_account(&self) -> Result<AccountSnapshot, GatewayError>;

    /// Requests a switch of the active subscription and reports whether the
    /// command succeeded. Does not verify that the switch took effect.
    async fn set_account(&self, subscription_id: &str) -> Result<bool, GatewayError>;
}
