//! Out action execution

pub mod orchestrator;
pub mod result;

pub use orchestrator::ApplyOrchestrator;
pub use result::{assemble_response, MetadataField, OutResponse, ResourceVersion};

use crate::{
    core::{
        pipelines_from_file, validate_out, OutRequest, Params, PipelineSource, PipelineSpec,
        ResolvedTarget, ValidationError,
    },
    error::OutError,
    fly::ControlTool,
};
use std::path::Path;
use tracing::{debug, info};

/// Validate the request, expand a pipelines file, and validate again.
///
/// The returned specs have their file references rooted at `sources_dir`.
pub fn prepare_pipelines(
    request: &OutRequest,
    sources_dir: &Path,
) -> Result<Vec<PipelineSpec>, OutError> {
    validate_out(request)?;

    let pipelines = match request.params.source() {
        Some(PipelineSource::Inline(pipelines)) => pipelines,
        Some(PipelineSource::FileRef(path)) => {
            info!("Reading pipelines from {}", path);
            pipelines_from_file(&path, sources_dir)?
        }
        None => return Err(ValidationError::NoPipelineSource.into()),
    };

    let resolved = OutRequest {
        source: request.source.clone(),
        params: Params {
            pipelines,
            pipelines_file: None,
        },
    };
    validate_out(&resolved)?;

    Ok(resolved
        .params
        .pipelines
        .iter()
        .map(|p| p.rooted_at(sources_dir))
        .collect())
}

/// Run the whole out action: prepare, resolve the target, apply.
pub async fn run_out<C: ControlTool>(
    request: &OutRequest,
    sources_dir: &Path,
    external_url: Option<&str>,
    orchestrator: &mut ApplyOrchestrator<C>,
) -> Result<OutResponse, OutError> {
    let pipelines = prepare_pipelines(request, sources_dir)?;
    debug!("Resolved {} pipeline(s)", pipelines.len());

    let target = ResolvedTarget::resolve(&request.source, external_url)?;
    orchestrator.run(&target, &pipelines).await
}
