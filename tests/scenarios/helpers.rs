//! Test utilities: a scripted control tool and run helpers

#![allow(dead_code)]

use async_trait::async_trait;
use pipeline_resource::core::{OutRequest, Params, PipelineSpec, ResolvedTarget, Source};
use pipeline_resource::fly::{
    ConfigChange, ControlTool, ControlToolError, SetPipelineOutput,
};
use pipeline_resource::{ApplyOrchestrator, RetryPolicy};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

/// A call the orchestrator made, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Login { team: String },
    SetPipeline { name: String, config_file: String },
    Unpause { name: String, team: Option<String> },
}

/// How a scripted call should fail
#[derive(Debug, Clone)]
pub enum MockFailure {
    /// fly ran and exited non-zero with this stderr
    Command(String),
    Timeout,
    /// fly could not be started at all
    Spawn,
}

impl MockFailure {
    fn to_error(&self, command: &str) -> ControlToolError {
        match self {
            MockFailure::Command(stderr) => ControlToolError::CommandFailed {
                command: command.to_string(),
                code: 1,
                stdout: String::new(),
                stderr: stderr.clone(),
            },
            MockFailure::Timeout => ControlToolError::Timeout {
                command: command.to_string(),
                secs: 300,
            },
            MockFailure::Spawn => ControlToolError::Spawn {
                command: command.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "fly not found"),
            },
        }
    }
}

/// Control tool that records calls and fails where told to
///
/// set-pipeline remembers what it has seen so a repeated identical set
/// reports `Unchanged` without a URL, the way fly does.
#[derive(Default)]
pub struct MockControlTool {
    calls: Arc<Mutex<Vec<Call>>>,
    login_script: Mutex<VecDeque<MockFailure>>,
    set_failures: HashMap<String, MockFailure>,
    unpause_failures: HashMap<String, MockFailure>,
    applied: Mutex<HashMap<String, String>>,
}

impl MockControlTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next login attempt (queue several for repeated failures)
    pub fn fail_login(self, failure: MockFailure) -> Self {
        self.login_script.lock().unwrap().push_back(failure);
        self
    }

    pub fn fail_set(mut self, pipeline: &str, failure: MockFailure) -> Self {
        self.set_failures.insert(pipeline.to_string(), failure);
        self
    }

    pub fn fail_unpause(mut self, pipeline: &str, failure: MockFailure) -> Self {
        self.unpause_failures.insert(pipeline.to_string(), failure);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn login_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Login { .. }))
            .count()
    }

    /// Names passed to set-pipeline, in call order
    pub fn set_order(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::SetPipeline { name, .. } => Some(name),
                _ => None,
            })
            .collect()
    }

    pub fn unpaused(&self) -> HashSet<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Unpause { name, .. } => Some(name),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ControlTool for MockControlTool {
    async fn login(&self, target: &ResolvedTarget) -> Result<(), ControlToolError> {
        self.record(Call::Login {
            team: target.team.clone(),
        });

        match self.login_script.lock().unwrap().pop_front() {
            Some(failure) => Err(failure.to_error("fly login")),
            None => Ok(()),
        }
    }

    async fn set_pipeline(
        &self,
        _target_alias: &str,
        pipeline: &PipelineSpec,
    ) -> Result<SetPipelineOutput, ControlToolError> {
        self.record(Call::SetPipeline {
            name: pipeline.name.clone(),
            config_file: pipeline.config_file.clone(),
        });

        if let Some(failure) = self.set_failures.get(&pipeline.name) {
            return Err(failure.to_error("fly set-pipeline"));
        }

        let previous = self
            .applied
            .lock()
            .unwrap()
            .insert(pipeline.name.clone(), pipeline.config_file.clone());
        let change = match previous {
            None => ConfigChange::Created,
            Some(ref config) if *config == pipeline.config_file => ConfigChange::Unchanged,
            Some(_) => ConfigChange::Updated,
        };

        // fly only prints the URL when it wrote something
        let team = pipeline.team.clone().unwrap_or_else(|| "main".to_string());
        let url = (change != ConfigChange::Unchanged).then(|| {
            format!(
                "https://ci.example.com/teams/{}/pipelines/{}",
                team, pipeline.name
            )
        });
        Ok(SetPipelineOutput { change, url })
    }

    async fn unpause_pipeline(
        &self,
        _target_alias: &str,
        pipeline_name: &str,
        team: Option<&str>,
    ) -> Result<(), ControlToolError> {
        self.record(Call::Unpause {
            name: pipeline_name.to_string(),
            team: team.map(str::to_string),
        });

        match self.unpause_failures.get(pipeline_name) {
            Some(failure) => Err(failure.to_error("fly unpause-pipeline")),
            None => Ok(()),
        }
    }
}

pub const PLUGIN_VERSION: &str = "9.9.9-test";

pub fn orchestrator(tool: MockControlTool) -> ApplyOrchestrator<MockControlTool> {
    ApplyOrchestrator::new(tool, PLUGIN_VERSION).with_retry_policy(RetryPolicy::immediate(3))
}

pub fn target() -> ResolvedTarget {
    ResolvedTarget::resolve(&source(), None).unwrap()
}

pub fn source() -> Source {
    Source {
        target: Some("https://ci.example.com".to_string()),
        username: "admin".to_string(),
        password: "hunter2".to_string(),
        ..Default::default()
    }
}

/// Specs named `names`, each with config `ci/<name>.yml`
pub fn specs(names: &[&str]) -> Vec<PipelineSpec> {
    names
        .iter()
        .map(|name| PipelineSpec::new(*name, format!("ci/{}.yml", name)))
        .collect()
}

pub fn inline_request(pipelines: Vec<PipelineSpec>) -> OutRequest {
    OutRequest {
        source: source(),
        params: Params {
            pipelines,
            pipelines_file: None,
        },
    }
}

pub fn file_request(path: &str) -> OutRequest {
    OutRequest {
        source: source(),
        params: Params {
            pipelines: vec![],
            pipelines_file: Some(path.to_string()),
        },
    }
}

/// Metadata names of a response, in order
pub fn metadata_names(response: &pipeline_resource::OutResponse) -> Vec<String> {
    response.metadata.iter().map(|m| m.name.clone()).collect()
}
