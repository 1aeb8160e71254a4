//! Request validation, run before and after the pipelines file is expanded

use crate::core::request::OutRequest;
use std::collections::HashSet;
use thiserror::Error;

/// A malformed or contradictory request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("source.target must be set, or ATC_EXTERNAL_URL must be provided")]
    MissingTarget,

    #[error("params.pipelines and params.pipelines_file are mutually exclusive; set only one")]
    ConflictingPipelineSources,

    #[error("one of params.pipelines or params.pipelines_file must be set")]
    NoPipelineSource,

    #[error("pipeline at index {index} has no name")]
    MissingName { index: usize },

    #[error("duplicate pipeline name: {name}")]
    DuplicateName { name: String },

    #[error("pipeline '{name}' has no config_file")]
    MissingConfigFile { name: String },
}

/// Check the structural rules of an out request.
///
/// The target URL is not checked here: it may still come from the
/// environment, see [`crate::core::ResolvedTarget::resolve`].
pub fn validate_out(request: &OutRequest) -> Result<(), ValidationError> {
    let params = &request.params;
    let has_file = params
        .pipelines_file
        .as_deref()
        .is_some_and(|f| !f.is_empty());

    match (params.pipelines.is_empty(), has_file) {
        (false, true) => return Err(ValidationError::ConflictingPipelineSources),
        (true, false) => return Err(ValidationError::NoPipelineSource),
        _ => {}
    }

    let mut seen = HashSet::new();
    for (index, pipeline) in params.pipelines.iter().enumerate() {
        if pipeline.name.is_empty() {
            return Err(ValidationError::MissingName { index });
        }
        if !seen.insert(pipeline.name.as_str()) {
            return Err(ValidationError::DuplicateName {
                name: pipeline.name.clone(),
            });
        }
        if pipeline.config_file.is_empty() {
            return Err(ValidationError::MissingConfigFile {
                name: pipeline.name.clone(),
            });
        }
    }

    Ok(())
}
