//! Azure CLI context switcher library.
//!
//! Saves named bindings ("contexts") of an Azure subscription, tenant and user,
//! and switches the Azure CLI between them.
//!
//! # Modules
//!
//! - `context`: The saved context entity and its validation rules
//! - `store`: Durable YAML storage of contexts
//! - `session`: Contract for reading and switching the active Azure session
//! - `azure_cli`: Session gateway backed by the `az` executable
//! - `prompt`: Interactive prompts
//! - `outcome`: Structured operation results
//! - `manager`: The switch, add, status, list and delete flows
//! - `configuration`: Application directory and settings
//! - `format`: JSON and CSV output
//! - `presenter`: Terminal rendering and exit codes
//! - `commands`: CLI command parsing

pub mod azure_cli;
pub mod commands;
pub mod configuration;
pub mod context;
pub mod error;
pub mod exit_codes;
pub mod format;
pub mod manager;
pub mod outcome;
pub mod presenter;
pub mod prompt;
pub mod session;
pub mod store;
