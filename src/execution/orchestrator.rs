//! Apply orchestrator - logs in once, then sets and unpauses each pipeline

use crate::{
    core::{ApplyOutcome, PipelineSpec, ResolvedTarget, RunState},
    error::{ApplyFailure, ApplyFailures, OutError},
    execution::result::{assemble_response, OutResponse},
    fly::{login_with_retry, ControlTool, LoginError, RetryPolicy},
};
use tracing::{debug, error, info, warn};

/// Drives one out run against a control tool
pub struct ApplyOrchestrator<C> {
    tool: C,
    plugin_version: String,
    retry_policy: RetryPolicy,
    state: RunState,
}

impl<C: ControlTool> ApplyOrchestrator<C> {
    pub fn new(tool: C, plugin_version: impl Into<String>) -> Self {
        Self {
            tool,
            plugin_version: plugin_version.into(),
            retry_policy: RetryPolicy::default(),
            state: RunState::Start,
        }
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn tool(&self) -> &C {
        &self.tool
    }

    fn transition(&mut self, next: RunState) {
        debug!("Run state: {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Apply every pipeline and build the response.
    ///
    /// Fails if login fails, if the tool misbehaves, or if any single
    /// pipeline could not be set. In the last case every pipeline has
    /// still been attempted.
    pub async fn run(
        &mut self,
        target: &ResolvedTarget,
        pipelines: &[PipelineSpec],
    ) -> Result<OutResponse, OutError> {
        let outcomes = self.apply_all(target, pipelines).await?;

        let failures: Vec<ApplyFailure> = outcomes
            .iter()
            .filter_map(|outcome| {
                outcome.error().map(|error| ApplyFailure {
                    pipeline_name: outcome.pipeline_name().to_string(),
                    error: error.to_string(),
                })
            })
            .collect();

        if !failures.is_empty() {
            error!("{} of {} pipeline(s) failed", failures.len(), outcomes.len());
            return Err(OutError::Apply(ApplyFailures(failures)));
        }

        info!("Applied {} pipeline(s)", outcomes.len());
        Ok(assemble_response(&self.plugin_version, &outcomes))
    }

    /// Log in, then attempt every pipeline in order.
    ///
    /// Per-pipeline failures are recorded in the returned outcomes rather
    /// than stopping the loop.
    pub async fn apply_all(
        &mut self,
        target: &ResolvedTarget,
        pipelines: &[PipelineSpec],
    ) -> Result<Vec<ApplyOutcome>, OutError> {
        info!("Logging in to {} as team {}", target.url, target.team);
        match login_with_retry(&self.tool, target, self.retry_policy).await {
            Ok(attempts) => debug!("Login succeeded on attempt {}", attempts),
            Err(LoginError { attempts, source }) => {
                error!("Login failed after {} attempt(s): {}", attempts, source);
                self.transition(RunState::Failed);
                return Err(OutError::Authentication {
                    url: target.url.clone(),
                    attempts,
                    source,
                });
            }
        }
        self.transition(RunState::LoggedIn);

        self.transition(RunState::ApplyingPipelines);
        let mut outcomes = Vec::with_capacity(pipelines.len());
        for pipeline in pipelines {
            match self.apply_one(target, pipeline).await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    error!("Aborting run: {}", e);
                    self.transition(RunState::Failed);
                    return Err(e);
                }
            }
        }

        self.transition(RunState::Done);
        Ok(outcomes)
    }

    async fn apply_one(
        &self,
        target: &ResolvedTarget,
        pipeline: &PipelineSpec,
    ) -> Result<ApplyOutcome, OutError> {
        info!("Setting pipeline: {}", pipeline.name);

        let output = match self.tool.set_pipeline(&target.alias, pipeline).await {
            Ok(output) => output,
            Err(e) if e.is_anticipated() => {
                error!("Failed to set pipeline {}: {}", pipeline.name, e);
                return Ok(ApplyOutcome::Failed {
                    pipeline_name: pipeline.name.clone(),
                    error: e.to_string(),
                });
            }
            Err(source) => {
                return Err(OutError::Unexpected {
                    pipeline_name: pipeline.name.clone(),
                    source,
                })
            }
        };
        debug!("Pipeline {} set: {:?}", pipeline.name, output.change);
        if let Some(url) = &output.url {
            debug!("fly reported pipeline URL: {}", url);
        }

        let team = pipeline.team.as_deref().filter(|t| !t.is_empty());
        let unpause_error = match self
            .tool
            .unpause_pipeline(&target.alias, &pipeline.name, team)
            .await
        {
            Ok(()) => {
                info!("Unpaused pipeline: {}", pipeline.name);
                None
            }
            Err(e) if e.is_anticipated() => {
                warn!("Failed to unpause pipeline {}: {}", pipeline.name, e);
                Some(e.to_string())
            }
            Err(source) => {
                return Err(OutError::Unexpected {
                    pipeline_name: pipeline.name.clone(),
                    source,
                })
            }
        };

        Ok(ApplyOutcome::Applied {
            pipeline_name: pipeline.name.clone(),
            version: target.pipeline_url(team.unwrap_or(&target.team), &pipeline.name),
            change: output.change,
            unpause_error,
        })
    }
}
