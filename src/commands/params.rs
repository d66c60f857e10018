//! Shared command parameters for all CLI commands.
//!
//! This module defines the command and parameter names and the argument
//! configurations reused across command modules.

use crate::format::OutputFormat;
use clap::{Arg, ArgAction};

// Context commands
pub const COMMAND_SWITCH: &str = "switch";
pub const COMMAND_STATUS: &str = "status";
pub const COMMAND_ADD: &str = "add";
pub const COMMAND_LIST: &str = "list";
pub const COMMAND_DELETE: &str = "delete";

// Config commands
pub const COMMAND_CONFIG: &str = "config";
pub const COMMAND_PATH: &str = "path";

// Parameter names
pub const PARAMETER_ID: &str = "id";
pub const PARAMETER_VERBOSE: &str = "verbose";
pub const PARAMETER_FORMAT: &str = "format";
pub const PARAMETER_PRETTY: &str = "pretty";
pub const PARAMETER_HEADERS: &str = "headers";

/// Context ID for a direct, non-interactive switch.
pub fn context_id_parameter() -> Arg {
    Arg::new(PARAMETER_ID)
        .short('i')
        .long(PARAMETER_ID)
        .num_args(1)
        .required(false)
        .help("Switch directly to the context with this ID (case-sensitive)")
}

pub fn verbose_parameter() -> Arg {
    Arg::new(PARAMETER_VERBOSE)
        .short('v')
        .long(PARAMETER_VERBOSE)
        .action(ArgAction::SetTrue)
        .help("Show full context details")
}

pub fn format_parameter() -> Arg {
    Arg::new(PARAMETER_FORMAT)
        .short('f')
        .long(PARAMETER_FORMAT)
        .num_args(1)
        .required(false)
        .env("AZCTX_FORMAT")
        .default_value("text")
        .help("Output data format")
        .value_parser(OutputFormat::names())
}

/// Pretty-prints JSON output.
pub fn format_pretty_parameter() -> Arg {
    Arg::new(PARAMETER_PRETTY)
        .long(PARAMETER_PRETTY)
        .action(ArgAction::SetTrue)
        .required(false)
        .help("Pretty-print JSON output")
}

/// Adds a header row to CSV output.
pub fn format_headers_parameter() -> Arg {
    Arg::new(PARAMETER_HEADERS)
        .long(PARAMETER_HEADERS)
        .action(ArgAction::SetTrue)
        .required(false)
        .help("Include a header row in CSV output")
}
