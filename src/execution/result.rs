//! Out response assembly

use crate::core::ApplyOutcome;
use serde::Serialize;

/// Version object written back to the CI server
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceVersion {
    pub plugin_version: String,
}

/// A `name`/`value` metadata pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataField {
    pub name: String,
    pub value: String,
}

/// The out response printed to stdout
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutResponse {
    pub version: ResourceVersion,
    pub metadata: Vec<MetadataField>,
}

/// Build the response from successful outcomes, keeping their order
pub fn assemble_response(plugin_version: &str, outcomes: &[ApplyOutcome]) -> OutResponse {
    let metadata = outcomes
        .iter()
        .filter_map(|outcome| match outcome {
            ApplyOutcome::Applied {
                pipeline_name,
                version,
                ..
            } => Some(MetadataField {
                name: pipeline_name.clone(),
                value: version.clone(),
            }),
            ApplyOutcome::Failed { .. } => None,
        })
        .collect();

    OutResponse {
        version: ResourceVersion {
            plugin_version: plugin_version.to_string(),
        },
        metadata,
    }
}
