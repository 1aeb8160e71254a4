//! fly subprocess runner

use crate::fly::ControlToolError;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Captured stdout of a successful fly invocation; stderr is only logged
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
}

/// Runs fly as a subprocess, one command at a time
#[derive(Debug, Clone)]
pub struct FlySubprocess {
    /// Path to fly executable
    fly_path: PathBuf,

    /// Timeout for each invocation in seconds
    timeout_secs: u64,
}

impl FlySubprocess {
    pub fn new(fly_path: PathBuf, timeout_secs: u64) -> Self {
        Self {
            fly_path,
            timeout_secs,
        }
    }

    pub fn fly_path(&self) -> &Path {
        &self.fly_path
    }

    /// Run fly with `args` and wait for it to exit
    ///
    /// `label` names the command in errors (e.g. `fly login`).
    ///
    /// # Errors
    /// Returns `ControlToolError` if:
    /// - fly cannot be spawned
    /// - fly does not exit within the timeout (the process is killed)
    /// - fly exits with a non-zero status
    /// - the output is not valid UTF-8
    pub async fn run(
        &self,
        label: &str,
        args: &[String],
    ) -> Result<CommandOutput, ControlToolError> {
        debug!("Running: {} {}", self.fly_path.display(), args.join(" "));

        let result = timeout(
            Duration::from_secs(self.timeout_secs),
            Command::new(&self.fly_path)
                .args(args)
                .stdin(std::process::Stdio::null())
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| ControlToolError::Timeout {
            command: label.to_string(),
            secs: self.timeout_secs,
        })?;

        let output = result.map_err(|source| ControlToolError::Spawn {
            command: label.to_string(),
            source,
        })?;

        let invalid = || ControlToolError::InvalidOutput {
            command: label.to_string(),
        };
        let stdout = String::from_utf8(output.stdout).map_err(|_| invalid())?;
        let stderr = String::from_utf8(output.stderr).map_err(|_| invalid())?;

        debug!("{} stdout:\n{}", label, stdout.trim_end());
        if !stderr.trim().is_empty() {
            debug!("{} stderr:\n{}", label, stderr.trim_end());
        }

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            warn!("{} exited with code {}", label, code);
            return Err(ControlToolError::CommandFailed {
                command: label.to_string(),
                code,
                stdout,
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(CommandOutput { stdout })
    }
}
