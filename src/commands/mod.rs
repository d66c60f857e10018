//! CLI command definitions and argument parsing.
//!
//! This module defines all the CLI commands and their arguments using the clap
//! builder API, one file per command group.

use clap::{ArgMatches, Command};

pub mod config;
pub mod context;
pub mod params;

pub use params::{
    COMMAND_ADD, COMMAND_CONFIG, COMMAND_DELETE, COMMAND_LIST, COMMAND_PATH, COMMAND_STATUS,
    COMMAND_SWITCH, PARAMETER_FORMAT, PARAMETER_HEADERS, PARAMETER_ID, PARAMETER_PRETTY,
    PARAMETER_VERBOSE,
};

/// Build the complete command-line interface.
pub fn cli_command() -> Command {
    Command::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .propagate_version(true)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(context::switch_command())
        .subcommand(context::status_command())
        .subcommand(context::add_command())
        .subcommand(context::list_command())
        .subcommand(context::delete_command())
        .subcommand(config::config_command())
}

/// Parse the process arguments.
pub fn create_cli_commands() -> ArgMatches {
    cli_command().get_matches()
}
