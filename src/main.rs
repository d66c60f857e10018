use azctx::{
    configuration::Configuration, error::CliError, exit_codes::AzctxExitCode,
    manager::ManagerError, presenter,
};
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

mod cli;
use cli::execute_command;

async fn run() -> Result<AzctxExitCode, CliError> {
    let configuration = Configuration::load_default()?;
    execute_command(configuration).await
}

/// Main entry point for the program
#[tokio::main]
async fn main() {
    // Intialize the logging subsystem; stdout is reserved for command output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    // Dropping `run()` on Ctrl+C also kills a running `az` (kill_on_drop).
    let code = tokio::select! {
        biased;
        Ok(()) = tokio::signal::ctrl_c() => {
            presenter::interrupted();
            AzctxExitCode::Cancelled
        }
        result = run() => match result {
            Ok(code) => code,
            Err(e) => {
                match &e {
                    CliError::ManagerError(ManagerError::CliNotFound) => presenter::cli_not_found(&e),
                    _ => presenter::error(&e),
                }
                e.exit_code()
            }
        },
    };

    ::std::process::exit(code.code());
}
