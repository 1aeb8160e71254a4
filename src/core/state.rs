//! Run state and per-pipeline outcomes

use crate::fly::ConfigChange;

/// Where a single invocation is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Nothing has touched the CI server yet
    Start,
    /// Login succeeded
    LoggedIn,
    /// Iterating the pipeline list
    ApplyingPipelines,
    /// Every pipeline was attempted
    Done,
    /// Aborted: login failed or the control tool misbehaved
    Failed,
}

impl RunState {
    /// Check if the run can make no further progress
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Done | RunState::Failed)
    }
}

/// Result of applying one pipeline; never mutated once recorded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied {
        pipeline_name: String,
        /// Identifier reported back in the response metadata
        version: String,
        change: ConfigChange,
        /// Unpause failures do not fail the run
        unpause_error: Option<String>,
    },
    Failed {
        pipeline_name: String,
        error: String,
    },
}

impl ApplyOutcome {
    pub fn pipeline_name(&self) -> &str {
        match self {
            ApplyOutcome::Applied { pipeline_name, .. }
            | ApplyOutcome::Failed { pipeline_name, .. } => pipeline_name,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ApplyOutcome::Applied { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ApplyOutcome::Failed { error, .. } => Some(error.as_str()),
            ApplyOutcome::Applied { .. } => None,
        }
    }
}
