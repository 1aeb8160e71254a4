//! Out request model as decoded from stdin

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Team used for login when the source does not name one
pub const DEFAULT_TEAM: &str = "main";

/// The full `out` request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutRequest {
    pub source: Source,

    #[serde(default)]
    pub params: Params,
}

/// Resource source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    /// CI server URL; falls back to the external URL from the environment when empty
    #[serde(default)]
    pub target: Option<String>,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    /// Team to log in as
    #[serde(default = "default_team")]
    pub team: String,

    /// Skip TLS verification on login
    #[serde(default)]
    pub insecure: bool,
}

fn default_team() -> String {
    DEFAULT_TEAM.to_string()
}

impl Default for Source {
    fn default() -> Self {
        Self {
            target: None,
            username: String::new(),
            password: String::new(),
            team: default_team(),
            insecure: false,
        }
    }
}

impl Source {
    /// Secret values paired with the text that replaces them in logs
    pub fn secrets(&self) -> Vec<(String, String)> {
        vec![
            (self.password.clone(), "***REDACTED-PASSWORD***".to_string()),
            (self.username.clone(), "***REDACTED-USERNAME***".to_string()),
        ]
    }
}

/// Put step params
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Params {
    #[serde(default)]
    pub pipelines: Vec<PipelineSpec>,

    #[serde(default)]
    pub pipelines_file: Option<String>,
}

/// Where the pipelines for a run come from
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineSource {
    Inline(Vec<PipelineSpec>),
    FileRef(String),
}

impl Params {
    /// Collapse the two optional fields into a single source.
    ///
    /// Returns `None` when both or neither are set; the validator reports
    /// that case before this is ever consulted.
    pub fn source(&self) -> Option<PipelineSource> {
        let file = self.pipelines_file.as_deref().filter(|f| !f.is_empty());
        match (self.pipelines.is_empty(), file) {
            (false, None) => Some(PipelineSource::Inline(self.pipelines.clone())),
            (true, Some(path)) => Some(PipelineSource::FileRef(path.to_string())),
            _ => None,
        }
    }
}

/// One pipeline to set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineSpec {
    #[serde(default)]
    pub name: String,

    /// Pipeline definition, relative to the sources directory
    #[serde(default)]
    pub config_file: String,

    #[serde(default)]
    pub vars_files: Vec<String>,

    /// Inline variables; strings are passed as-is, anything else as YAML
    #[serde(default)]
    pub vars: BTreeMap<String, serde_json::Value>,

    #[serde(default, alias = "team_name")]
    pub team: Option<String>,
}

impl PipelineSpec {
    pub fn new(name: impl Into<String>, config_file: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config_file: config_file.into(),
            ..Default::default()
        }
    }

    pub fn with_vars_file(mut self, path: impl Into<String>) -> Self {
        self.vars_files.push(path.into());
        self
    }

    pub fn with_var(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.vars.insert(key.into(), value);
        self
    }

    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.team = Some(team.into());
        self
    }

    /// Rebase relative file references onto the sources directory
    pub fn rooted_at(&self, sources_dir: &Path) -> Self {
        let root = |p: &str| resolve_path(p, sources_dir).to_string_lossy().into_owned();
        Self {
            name: self.name.clone(),
            config_file: root(&self.config_file),
            vars_files: self.vars_files.iter().map(|p| root(p)).collect(),
            vars: self.vars.clone(),
            team: self.team.clone(),
        }
    }
}

/// Join `path` onto `base` unless it is already absolute
pub fn resolve_path(path: &str, base: &Path) -> PathBuf {
    base.join(path)
}
