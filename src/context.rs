//! The saved context entity.
//!
//! A [`Context`] binds a short, user-assigned ID and a friendly name to an Azure
//! subscription, tenant and user. Contexts are immutable once built; the only
//! way to construct one is through [`ContextBuilder`], which enforces the ID and
//! name rules.

use crate::session::AccountSnapshot;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum length of a context ID, in characters.
pub const MAX_CONTEXT_ID_LENGTH: usize = 20;
/// Maximum length of a context name, in characters.
pub const MAX_CONTEXT_NAME_LENGTH: usize = 100;

#[derive(Debug, Error, PartialEq)]
pub enum ContextError {
    #[error("invalid context ID {0:?}: must be 1-20 characters (alphanumeric, hyphens, underscores only)")]
    InvalidId(String),
    #[error("invalid context name: must be between 1 and 100 characters")]
    InvalidName,
    #[error("missing property value {name:?}")]
    MissingPropertyValue { name: String },
}

/// A saved Azure CLI account binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
    context_id: String,
    context_name: String,
    subscription_id: String,
    subscription_name: String,
    tenant_id: String,
    tenant_name: String,
    username: String,
    #[serde(with = "created_at_format")]
    created_at: DateTime<Local>,
}

impl Context {
    /// Returns true iff `candidate` is 1-20 characters of `[A-Za-z0-9_-]`.
    pub fn validate_id(candidate: &str) -> bool {
        !candidate.is_empty()
            && candidate.chars().count() <= MAX_CONTEXT_ID_LENGTH
            && candidate
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }

    /// Returns true iff the trimmed `candidate` is 1-100 characters long.
    pub fn validate_name(candidate: &str) -> bool {
        let length = candidate.trim().chars().count();
        (1..=MAX_CONTEXT_NAME_LENGTH).contains(&length)
    }

    pub fn builder() -> ContextBuilder {
        ContextBuilder::new()
    }

    pub fn context_id(&self) -> &str {
        &self.context_id
    }

    pub fn context_name(&self) -> &str {
        &self.context_name
    }

    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    pub fn subscription_name(&self) -> &str {
        &self.subscription_name
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub fn tenant_name(&self) -> &str {
        &self.tenant_name
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn created_at(&self) -> &DateTime<Local> {
        &self.created_at
    }

    /// The label shown in selection lists: `Name (ID)`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.context_name, self.context_id)
    }

    /// True if this context was saved from the same subscription, tenant and user
    /// as the given account.
    pub fn matches_account(&self, account: &AccountSnapshot) -> bool {
        self.subscription_id == account.id
            && self.tenant_id == account.tenant_id
            && self.username == account.user.name
    }
}

/// Extracts the context ID from a `Name (ID)` selection label.
///
/// The ID is taken from the last pair of parentheses, so names that contain
/// parentheses themselves resolve correctly.
pub fn id_from_label(label: &str) -> Option<&str> {
    let (_, tail) = label.rsplit_once('(')?;
    tail.strip_suffix(')')
}

pub struct ContextBuilder {
    context_id: Option<String>,
    context_name: Option<String>,
    subscription_id: Option<String>,
    subscription_name: Option<String>,
    tenant_id: Option<String>,
    tenant_name: Option<String>,
    username: Option<String>,
    created_at: Option<DateTime<Local>>,
}

impl ContextBuilder {
    fn new() -> ContextBuilder {
        ContextBuilder {
            context_id: None,
            context_name: None,
            subscription_id: None,
            subscription_name: None,
            tenant_id: None,
            tenant_name: None,
            username: None,
            created_at: None,
        }
    }

    pub fn context_id(&mut self, context_id: &str) -> &mut ContextBuilder {
        self.context_id = Some(context_id.to_string());
        self
    }

    pub fn context_name(&mut self, context_name: &str) -> &mut ContextBuilder {
        self.context_name = Some(context_name.to_string());
        self
    }

    pub fn subscription_id(&mut self, subscription_id: &str) -> &mut ContextBuilder {
        self.subscription_id = Some(subscription_id.to_string());
        self
    }

    pub fn subscription_name(&mut self, subscription_name: &str) -> &mut ContextBuilder {
        self.subscription_name = Some(subscription_name.to_string());
        self
    }

    pub fn tenant_id(&mut self, tenant_id: &str) -> &mut ContextBuilder {
        self.tenant_id = Some(tenant_id.to_string());
        self
    }

    pub fn tenant_name(&mut self, tenant_name: &str) -> &mut ContextBuilder {
        self.tenant_name = Some(tenant_name.to_string());
        self
    }

    pub fn username(&mut self, username: &str) -> &mut ContextBuilder {
        self.username = Some(username.to_string());
        self
    }

    pub fn created_at(&mut self, created_at: DateTime<Local>) -> &mut ContextBuilder {
        self.created_at = Some(created_at);
        self
    }

    /// Copies subscription, tenant and user from an account snapshot.
    ///
    /// The tenant name mirrors the tenant ID; no display name is resolved.
    pub fn account(&mut self, account: &AccountSnapshot) -> &mut ContextBuilder {
        self.subscription_id(&account.id)
            .subscription_name(&account.name)
            .tenant_id(&account.tenant_id)
            .tenant_name(&account.tenant_id)
            .username(&account.user.name)
    }

    pub fn build(&self) -> Result<Context, ContextError> {
        let context_id = required(&self.context_id, "context_id")?;
        if !Context::validate_id(&context_id) {
            return Err(ContextError::InvalidId(context_id));
        }

        let context_name = required(&self.context_name, "context_name")?;
        if !Context::validate_name(&context_name) {
            return Err(ContextError::InvalidName);
        }

        let tenant_id = required(&self.tenant_id, "tenant_id")?;
        let tenant_name = self.tenant_name.clone().unwrap_or_else(|| tenant_id.clone());

        Ok(Context {
            context_id,
            context_name: context_name.trim().to_string(),
            subscription_id: required(&self.subscription_id, "subscription_id")?,
            subscription_name: required(&self.subscription_name, "subscription_name")?,
            tenant_id,
            tenant_name,
            username: required(&self.username, "username")?,
            created_at: self.created_at.unwrap_or_else(Local::now),
        })
    }
}

fn required(value: &Option<String>, name: &str) -> Result<String, ContextError> {
    value.clone().ok_or_else(|| ContextError::MissingPropertyValue {
        name: name.to_string(),
    })
}

/// `created_at` is written as RFC 3339. Naive ISO 8601 timestamps (no offset)
/// are also accepted and interpreted in local time.
mod created_at_format {
    use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Local>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Local>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(parsed.with_timezone(&Local));
        }
        let naive = NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map_err(|e| D::Error::custom(format!("invalid created_at {:?}: {}", raw, e)))?;
        Local
            .from_local_datetime(&naive)
            .earliest()
            .ok_or_else(|| D::Error::custom(format!("created_at {:?} does not exist in local time", raw)))
    }
}
