//! fly control-tool connector

pub mod client;
pub mod response;
pub mod retry;
pub mod subprocess;

use crate::core::{PipelineSpec, ResolvedTarget};
use async_trait::async_trait;
pub use client::FlyClientConfig;
pub use response::{ConfigChange, ControlToolError, SetPipelineOutput};
pub use retry::{classify_login_failure, login_with_retry, LoginError, LoginFailure, RetryPolicy};
pub use subprocess::{CommandOutput, FlySubprocess};

/// Operations the orchestrator needs from the control tool
///
/// Process handles never cross this boundary; each call spawns, waits and
/// tears down its own subprocess.
#[async_trait]
pub trait ControlTool: Send + Sync {
    /// Log in and save the session under `target.alias`
    async fn login(&self, target: &ResolvedTarget) -> Result<(), ControlToolError>;

    /// Non-interactively set a pipeline whose paths are already rooted
    async fn set_pipeline(
        &self,
        target_alias: &str,
        pipeline: &PipelineSpec,
    ) -> Result<SetPipelineOutput, ControlToolError>;

    async fn unpause_pipeline(
        &self,
        target_alias: &str,
        pipeline_name: &str,
        team: Option<&str>,
    ) -> Result<(), ControlToolError>;
}

/// fly client that drives the real binary
#[derive(Debug, Clone)]
pub struct FlyClient {
    subprocess: FlySubprocess,
}

impl FlyClient {
    pub fn new(config: FlyClientConfig) -> Self {
        Self {
            subprocess: FlySubprocess::new(config.fly_path, config.timeout_secs),
        }
    }

    pub fn fly_path(&self) -> &std::path::Path {
        self.subprocess.fly_path()
    }
}

/// `fly login` arguments; credentials only go through fly's own flags
pub fn login_args(target: &ResolvedTarget) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "-t".into(),
        target.alias.clone(),
        "login".into(),
        "-c".into(),
        target.url.clone(),
        "-n".into(),
        target.team.clone(),
        "-u".into(),
        target.username.clone(),
        "-p".into(),
        target.password.clone(),
    ];
    if target.insecure {
        args.push("-k".into());
    }
    args
}

/// `fly set-pipeline` arguments, with `-n` so fly never prompts
pub fn set_pipeline_args(target_alias: &str, pipeline: &PipelineSpec) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "-t".into(),
        target_alias.into(),
        "set-pipeline".into(),
        "-n".into(),
        "-p".into(),
        pipeline.name.clone(),
        "-c".into(),
        pipeline.config_file.clone(),
    ];

    for vars_file in &pipeline.vars_files {
        args.push("-l".into());
        args.push(vars_file.clone());
    }

    for (key, value) in &pipeline.vars {
        match value {
            serde_json::Value::String(s) => {
                args.push("-v".into());
                args.push(format!("{}={}", key, s));
            }
            other => {
                args.push("-y".into());
                args.push(format!("{}={}", key, other));
            }
        }
    }

    push_team(&mut args, pipeline.team.as_deref());
    args
}

pub fn unpause_pipeline_args(
    target_alias: &str,
    pipeline_name: &str,
    team: Option<&str>,
) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "-t".into(),
        target_alias.into(),
        "unpause-pipeline".into(),
        "-p".into(),
        pipeline_name.into(),
    ];
    push_team(&mut args, team);
    args
}

fn push_team(args: &mut Vec<String>, team: Option<&str>) {
    if let Some(team) = team.filter(|t| !t.is_empty()) {
        args.push("--team".into());
        args.push(team.into());
    }
}

#[async_trait]
impl ControlTool for FlyClient {
    async fn login(&self, target: &ResolvedTarget) -> Result<(), ControlToolError> {
        self.subprocess.run("fly login", &login_args(target)).await?;
        Ok(())
    }

    async fn set_pipeline(
        &self,
        target_alias: &str,
        pipeline: &PipelineSpec,
    ) -> Result<SetPipelineOutput, ControlToolError> {
        let output = self
            .subprocess
            .run("fly set-pipeline", &set_pipeline_args(target_alias, pipeline))
            .await?;
        Ok(SetPipelineOutput::parse(&output.stdout))
    }

    async fn unpause_pipeline(
        &self,
        target_alias: &str,
        pipeline_name: &str,
        team: Option<&str>,
    ) -> Result<(), ControlToolError> {
        self.subprocess
            .run(
                "fly unpause-pipeline",
                &unpause_pipeline_args(target_alias, pipeline_name, team),
            )
            .await?;
        Ok(())
    }
}
