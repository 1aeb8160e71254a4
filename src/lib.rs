//! pipeline-resource - Concourse resource that sets pipelines through fly

pub mod cli;
pub mod core;
pub mod error;
pub mod execution;
pub mod fly;
pub mod logging;

// Re-export commonly used types
pub use crate::core::{OutRequest, PipelineSpec, ResolvedTarget, RunState, ApplyOutcome};
pub use error::{OutError, ApplyFailures};
pub use execution::{ApplyOrchestrator, OutResponse, run_out, prepare_pipelines};
pub use fly::{ControlTool, ControlToolError, FlyClient, FlyClientConfig, RetryPolicy};
