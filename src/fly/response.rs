//! fly command results and errors

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Error types for fly invocations
#[derive(Debug, Error)]
pub enum ControlToolError {
    #[error("{command} exited with code {code}: {stderr}")]
    CommandFailed {
        command: String,
        code: i32,
        stdout: String,
        stderr: String,
    },

    #[error("{command} timed out after {secs} seconds")]
    Timeout { command: String, secs: u64 },

    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} produced output that is not valid UTF-8")]
    InvalidOutput { command: String },
}

impl ControlToolError {
    /// Failures fly is known to produce. Anything else means the tool
    /// itself could not be driven and the run should stop.
    pub fn is_anticipated(&self) -> bool {
        matches!(
            self,
            ControlToolError::CommandFailed { .. } | ControlToolError::Timeout { .. }
        )
    }

    /// Combined captured output, empty for failures that produced none
    pub fn output(&self) -> String {
        match self {
            ControlToolError::CommandFailed { stdout, stderr, .. } => {
                format!("{}\n{}", stderr, stdout)
            }
            _ => String::new(),
        }
    }
}

/// What `set-pipeline` did to the pipeline configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigChange {
    Created,
    Updated,
    Unchanged,
    Unknown,
}

/// Parsed stdout of a successful `set-pipeline`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetPipelineOutput {
    pub change: ConfigChange,

    /// Pipeline URL, when fly printed one. fly omits it when nothing
    /// changed, so it is only logged, never reported.
    pub url: Option<String>,
}

fn pipeline_url_regex() -> &'static Regex {
    static PIPELINE_URL: OnceLock<Regex> = OnceLock::new();
    PIPELINE_URL.get_or_init(|| {
        Regex::new(r"(?m)you can view your pipeline here:\s*(\S+)").expect("static regex is valid")
    })
}

impl SetPipelineOutput {
    pub fn parse(stdout: &str) -> Self {
        let lower = stdout.to_lowercase();
        let change = if lower.contains("pipeline created") {
            ConfigChange::Created
        } else if lower.contains("configuration updated") {
            ConfigChange::Updated
        } else if lower.contains("no changes to apply") {
            ConfigChange::Unchanged
        } else {
            ConfigChange::Unknown
        };

        let url = pipeline_url_regex()
            .captures(stdout)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string());

        Self { change, url }
    }
}
