//! Pipelines file loaded from the sources directory

use crate::core::request::{resolve_path, PipelineSpec};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure to turn a pipelines file into pipeline specs
#[derive(Debug, Error)]
pub enum PipelinesFileError {
    #[error("failed to read pipelines file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid pipelines file {path}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Top-level pipelines file document
///
/// ```yaml
/// pipelines:
///   - name: deploy
///     config_file: repo/ci/deploy.yml
///     vars_files: [repo/ci/prod.yml]
///     vars: { env: prod }
///     team: ops
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct PipelinesConfig {
    pub pipelines: Vec<PipelineSpec>,
}

impl PipelinesConfig {
    /// Parse a pipelines file from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }
}

/// Read the pipelines listed in `path`, resolved against `sources_dir`.
///
/// Business rules (names, duplicates) are left to the validator.
pub fn pipelines_from_file(
    path: &str,
    sources_dir: &Path,
) -> Result<Vec<PipelineSpec>, PipelinesFileError> {
    let full_path = resolve_path(path, sources_dir);

    let content = std::fs::read_to_string(&full_path).map_err(|source| PipelinesFileError::Read {
        path: full_path.clone(),
        source,
    })?;

    let config = PipelinesConfig::from_yaml(&content).map_err(|source| PipelinesFileError::Format {
        path: full_path,
        source,
    })?;

    Ok(config.pipelines)
}
