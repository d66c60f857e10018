use dirs::home_dir;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::debug;

pub const DEFAULT_APPLICATION_DIRECTORY: &str = ".azctx";
pub const DEFAULT_STORE_FILE_NAME: &str = "contexts.yaml";
pub const DEFAULT_SETTINGS_FILE_NAME: &str = "config.yaml";
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 30;

pub const ENV_HOME: &str = "AZCTX_HOME";
pub const ENV_AZ_PATH: &str = "AZCTX_AZ_PATH";
pub const ENV_TIMEOUT: &str = "AZCTX_TIMEOUT";

#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("failed to resolve the azctx home directory")]
    FailedToFindHomeDirectory,
    #[error("failed to load configuration data, because of: {cause:?}")]
    FailedToLoadData { cause: Box<dyn std::error::Error> },
    #[error("invalid value {value:?} for {name}")]
    InvalidValue { name: String, value: String },
}

/// User-editable settings, read from `config.yaml` in the azctx home directory.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub az_executable: Option<PathBuf>,
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,
}

fn default_command_timeout_secs() -> u64 {
    DEFAULT_COMMAND_TIMEOUT_SECS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            az_executable: None,
            command_timeout_secs: DEFAULT_COMMAND_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    pub fn load_from_file(path: &Path) -> Result<Settings, ConfigurationError> {
        match fs::read_to_string(path) {
            Ok(settings) => {
                if settings.trim().is_empty() {
                    return Ok(Settings::default());
                }
                serde_yaml::from_str(&settings)
                    .map_err(|cause| ConfigurationError::FailedToLoadData { cause: Box::new(cause) })
            }
            Err(cause) if cause.kind() == std::io::ErrorKind::NotFound => {
                debug!("No settings file at {}, using defaults", path.display());
                Ok(Settings::default())
            }
            Err(cause) => Err(ConfigurationError::FailedToLoadData {
                cause: Box::new(cause),
            }),
        }
    }
}

/// Resolved runtime configuration for one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    home: PathBuf,
    settings: Settings,
}

impl Configuration {
    pub fn new(home: PathBuf, settings: Settings) -> Self {
        Self { home, settings }
    }

    /// The azctx home directory: `$AZCTX_HOME`, or `~/.azctx`.
    pub fn get_default_home_directory() -> Result<PathBuf, ConfigurationError> {
        if let Ok(home) = std::env::var(ENV_HOME) {
            return Ok(PathBuf::from(home));
        }

        match home_dir() {
            Some(mut home) => {
                home.push(DEFAULT_APPLICATION_DIRECTORY);
                Ok(home)
            }
            None => Err(ConfigurationError::FailedToFindHomeDirectory),
        }
    }

    /// Loads settings from the default home directory and applies environment
    /// overrides.
    pub fn load_default() -> Result<Configuration, ConfigurationError> {
        let home = Self::get_default_home_directory()?;
        debug!("Loading configuration from {}...", home.display());

        let mut settings = Settings::load_from_file(&home.join(DEFAULT_SETTINGS_FILE_NAME))?;

        if let Ok(path) = std::env::var(ENV_AZ_PATH) {
            settings.az_executable = Some(PathBuf::from(path));
        }
        if let Ok(timeout) = std::env::var(ENV_TIMEOUT) {
            settings.command_timeout_secs =
                parse_timeout(&timeout).ok_or(ConfigurationError::InvalidValue {
                    name: ENV_TIMEOUT.to_string(),
                    value: timeout,
                })?;
        }

        Ok(Configuration::new(home, settings))
    }

    pub fn store_path(&self) -> PathBuf {
        self.home.join(DEFAULT_STORE_FILE_NAME)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.home.join(DEFAULT_SETTINGS_FILE_NAME)
    }

    pub fn az_executable(&self) -> Option<&Path> {
        self.settings.az_executable.as_deref()
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.settings.command_timeout_secs)
    }
}

fn parse_timeout(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok().filter(|secs| *secs > 0)
}
