//! Terminal errors of an out run

use crate::core::{PipelinesFileError, ValidationError};
use crate::fly::ControlToolError;
use std::fmt;
use thiserror::Error;

/// One pipeline that could not be set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyFailure {
    pub pipeline_name: String,
    pub error: String,
}

/// Every pipeline that failed in a run, in input order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyFailures(pub Vec<ApplyFailure>);

impl ApplyFailures {
    pub fn pipeline_names(&self) -> Vec<&str> {
        self.0.iter().map(|f| f.pipeline_name.as_str()).collect()
    }
}

impl fmt::Display for ApplyFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} pipeline(s) failed to apply", self.0.len())?;
        for failure in &self.0 {
            write!(f, "\n  {}: {}", failure.pipeline_name, failure.error)?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum OutError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ValidationError),

    #[error(transparent)]
    Resolution(#[from] PipelinesFileError),

    #[error("failed to log in to {url} after {attempts} attempt(s): {source}")]
    Authentication {
        url: String,
        attempts: u32,
        #[source]
        source: ControlToolError,
    },

    #[error("{0}")]
    Apply(ApplyFailures),

    #[error("unexpected error while applying '{pipeline_name}': {source}")]
    Unexpected {
        pipeline_name: String,
        #[source]
        source: ControlToolError,
    },
}
