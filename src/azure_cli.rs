//! Azure CLI backed session gateway.
//!
//! Every call spawns `az` as a subprocess with captured output and a bounded
//! wait. Nothing is retried: a timeout is reported as a failed call.

use crate::session::{AccountSnapshot, GatewayError, SessionGateway};
use async_trait::async_trait;
use std::{
    path::{Path, PathBuf},
    process::{Output, Stdio},
    time::Duration,
};
use tokio::process::Command;
use tracing::{debug, trace};

pub const AZ_EXECUTABLE: &str = "az";
pub const NO_SESSION_MESSAGE: &str = "No active Azure session. Run 'az login' first.";

#[cfg(windows)]
const WINDOWS_INSTALL_LOCATIONS: [&str; 2] = [
    r"C:\Program Files\Microsoft SDKs\Azure\CLI2\wbin\az.cmd",
    r"C:\Program Files (x86)\Microsoft SDKs\Azure\CLI2\wbin\az.cmd",
];

#[derive(Debug)]
enum RunError {
    NotFound,
    TimedOut,
    Io(std::io::Error),
}

/// Runs the Azure CLI to read and switch the active subscription.
#[derive(Debug, Clone)]
pub struct AzureCli {
    executable: PathBuf,
    timeout: Duration,
}

impl AzureCli {
    pub fn new(executable: PathBuf, timeout: Duration) -> Self {
        Self { executable, timeout }
    }

    /// Uses the configured executable if any, otherwise `az` from `PATH` or a
    /// standard install location.
    pub fn locate(configured: Option<&Path>, timeout: Duration) -> Self {
        let executable = configured
            .map(Path::to_path_buf)
            .unwrap_or_else(default_executable);
        debug!("Using Azure CLI executable {}", executable.display());
        Self::new(executable, timeout)
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    async fn run(&self, args: &[&str]) -> Result<Output, RunError> {
        trace!("Running {} {}", self.executable.display(), args.join(" "));

        let mut command = Command::new(&self.executable);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => Err(RunError::NotFound),
            Ok(Err(e)) => Err(RunError::Io(e)),
            Err(_) => {
                debug!("{} {} timed out after {:?}", AZ_EXECUTABLE, args.join(" "), self.timeout);
                Err(RunError::TimedOut)
            }
        }
    }
}

#[async_trait]
impl SessionGateway for AzureCli {
    async fn is_available(&self) -> bool {
        match self.run(&["--version"]).await {
            Ok(output) => output.status.success(),
            Err(_) => false,
        }
    }

    async fn get_current_account(&self) -> Result<AccountSnapshot, GatewayError> {
        let output = match self.run(&["account", "show", "--output", "json"]).await {
            Ok(output) => output,
            Err(RunError::NotFound) => return Err(GatewayError::CliNotFound),
            Err(RunError::TimedOut) => {
                return Err(GatewayError::NoActiveSession(
                    "Azure CLI command timed out".to_string(),
                ))
            }
            Err(RunError::Io(e)) => return Err(GatewayError::Io(e)),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_show_failure(&stderr));
        }

        serde_json::from_slice(&output.stdout).map_err(|e| {
            GatewayError::NoActiveSession(format!("Failed to parse Azure CLI output: {}", e))
        })
    }

    async fn set_account(&self, subscription_id: &str) -> Result<bool, GatewayError> {
        match self
            .run(&["account", "set", "--subscription", subscription_id])
            .await
        {
            Ok(output) => {
                if !output.status.success() {
                    debug!(
                        "az account set failed: {}",
                        String::from_utf8_lossy(&output.stderr).trim()
                    );
                }
                Ok(output.status.success())
            }
            Err(RunError::NotFound) => Err(GatewayError::CliNotFound),
            Err(RunError::TimedOut) => Ok(false),
            Err(RunError::Io(e)) => Err(GatewayError::Io(e)),
        }
    }
}

/// Maps a failed `az account show` to a session error.
fn classify_show_failure(stderr: &str) -> GatewayError {
    if stderr.to_lowercase().contains("az login") {
        GatewayError::NoActiveSession(NO_SESSION_MESSAGE.to_string())
    } else {
        GatewayError::NoActiveSession(format!("Failed to get Azure account: {}", stderr.trim()))
    }
}

#[cfg(windows)]
fn default_executable() -> PathBuf {
    let on_path = std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join("az.cmd").is_file()))
        .unwrap_or(false);
    if on_path {
        return PathBuf::from("az.cmd");
    }
    WINDOWS_INSTALL_LOCATIONS
        .into_iter()
        .map(PathBuf::from)
        .find(|path| path.is_file())
        .unwrap_or_else(|| PathBuf::from(AZ_EXECUTABLE))
}

#[cfg(not(windows))]
fn default_executable() -> PathBuf {
    PathBuf::from(AZ_EXECUTABLE)
}
