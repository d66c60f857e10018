//! Context command definitions.
//!
//! Switch, status, add, list and delete are top-level subcommands.

use crate::commands::params::{
    context_id_parameter, format_headers_parameter, format_parameter, format_pretty_parameter,
    verbose_parameter, COMMAND_ADD, COMMAND_DELETE, COMMAND_LIST, COMMAND_STATUS, COMMAND_SWITCH,
};
use clap::Command;

/// Create the switch command.
pub fn switch_command() -> Command {
    Command::new(COMMAND_SWITCH)
        .about("Switch the Azure CLI to a saved context")
        .visible_alias("use")
        .arg(context_id_parameter())
}

/// Create the status command.
pub fn status_command() -> Command {
    Command::new(COMMAND_STATUS)
        .about("Show the active Azure context")
        .arg(verbose_parameter())
        .arg(format_parameter())
        .arg(format_pretty_parameter())
        .arg(format_headers_parameter())
}

/// Create the add command.
pub fn add_command() -> Command {
    Command::new(COMMAND_ADD).about("Save the active Azure session as a named context")
}

/// Create the list command.
pub fn list_command() -> Command {
    Command::new(COMMAND_LIST)
        .about("List saved contexts")
        .visible_alias("ls")
        .arg(verbose_parameter())
        .arg(format_parameter())
        .arg(format_pretty_parameter())
        .arg(format_headers_parameter())
}

/// Create the delete command.
pub fn delete_command() -> Command {
    Command::new(COMMAND_DELETE)
        .about("Delete a saved context")
        .visible_alias("rm")
}
