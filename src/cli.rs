use azctx::{
    azure_cli::AzureCli,
    commands::{
        create_cli_commands, COMMAND_ADD, COMMAND_CONFIG, COMMAND_DELETE, COMMAND_LIST,
        COMMAND_PATH, COMMAND_STATUS, COMMAND_SWITCH, PARAMETER_FORMAT, PARAMETER_HEADERS,
        PARAMETER_ID, PARAMETER_PRETTY, PARAMETER_VERBOSE,
    },
    configuration::Configuration,
    error::CliError,
    exit_codes::AzctxExitCode,
    format::{OutputFormat, OutputFormatOptions, TEXT},
    manager::ContextManager,
    presenter,
    prompt::TerminalPrompter,
    session::SessionGateway,
    store::ContextStore,
};
use clap::ArgMatches;
use tracing::{debug, trace};

fn extract_subcommand_name(sub_matches: &ArgMatches) -> String {
    let message = match sub_matches.subcommand() {
        Some(m) => m.0,
        None => "unknown",
    };

    message.to_string()
}

fn output_format(sub_matches: &ArgMatches) -> Result<OutputFormat, CliError> {
    let format = sub_matches
        .get_one::<String>(PARAMETER_FORMAT)
        .map(String::as_str)
        .unwrap_or(TEXT);
    let options = OutputFormatOptions {
        with_headers: sub_matches.get_flag(PARAMETER_HEADERS),
        pretty: sub_matches.get_flag(PARAMETER_PRETTY),
    };

    Ok(OutputFormat::from_string_with_options(format, options)?)
}

pub async fn execute_command(configuration: Configuration) -> Result<AzctxExitCode, CliError> {
    let commands = create_cli_commands();

    let store = ContextStore::new(configuration.store_path());
    let gateway = AzureCli::locate(configuration.az_executable(), configuration.command_timeout());
    debug!(
        "Using context store {} and Azure CLI {}",
        store.path().display(),
        gateway.executable().display()
    );
    let manager = ContextManager::new(store, gateway, TerminalPrompter::new());

    match commands.subcommand() {
        Some((COMMAND_SWITCH, sub_matches)) => {
            let outcome = match sub_matches.get_one::<String>(PARAMETER_ID) {
                Some(context_id) => manager.switch_by_id(context_id).await?,
                None => manager.switch_interactive().await?,
            };
            Ok(presenter::switch(&outcome))
        }
        Some((COMMAND_STATUS, sub_matches)) => {
            let format = output_format(sub_matches)?;
            let outcome = manager.status(sub_matches.get_flag(PARAMETER_VERBOSE)).await?;
            Ok(presenter::status(&outcome, &format)?)
        }
        Some((COMMAND_ADD, _)) => {
            // best effort; the add flow reports its own failures
            match manager.gateway().get_current_account().await {
                Ok(account) => presenter::current_account(&account),
                Err(e) => trace!("Current account unavailable before add: {}", e),
            }
            let outcome = manager.add_interactive().await?;
            Ok(presenter::add(&outcome))
        }
        Some((COMMAND_LIST, sub_matches)) => {
            let format = output_format(sub_matches)?;
            let outcome = manager.list(sub_matches.get_flag(PARAMETER_VERBOSE))?;
            Ok(presenter::list(&outcome, &format)?)
        }
        Some((COMMAND_DELETE, _)) => {
            let outcome = manager.delete_interactive()?;
            Ok(presenter::delete(&outcome))
        }
        Some((COMMAND_CONFIG, sub_matches)) => match sub_matches.subcommand() {
            Some((COMMAND_PATH, _)) => {
                presenter::config_paths(&configuration);
                Ok(AzctxExitCode::Success)
            }
            _ => Err(CliError::UnsupportedSubcommand(extract_subcommand_name(
                sub_matches,
            ))),
        },
        _ => Err(CliError::UnsupportedSubcommand(extract_subcommand_name(
            &commands,
        ))),
    }
}
