//! Login target derived from the request source

use crate::core::request::Source;
use crate::core::validation::ValidationError;

/// fly target alias used for every command in a run
pub const TARGET_ALIAS: &str = "concourse-pipeline-resource-target";

/// Everything needed to log in; lives for one invocation only
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub alias: String,
    pub url: String,
    pub username: String,
    pub password: String,
    pub team: String,
    pub insecure: bool,
}

impl ResolvedTarget {
    /// Build the target from the source, falling back to `external_url`
    /// when the source leaves the URL empty.
    pub fn resolve(source: &Source, external_url: Option<&str>) -> Result<Self, ValidationError> {
        let url = source
            .target
            .as_deref()
            .filter(|t| !t.is_empty())
            .or(external_url.filter(|u| !u.is_empty()))
            .ok_or(ValidationError::MissingTarget)?;

        Ok(Self {
            alias: TARGET_ALIAS.to_string(),
            url: url.trim_end_matches('/').to_string(),
            username: source.username.clone(),
            password: source.password.clone(),
            team: source.team.clone(),
            insecure: source.insecure,
        })
    }

    /// Web URL of a pipeline on this target
    ///
    /// Built from the request alone so repeated runs report the same value
    /// whatever fly printed.
    pub fn pipeline_url(&self, team: &str, pipeline_name: &str) -> String {
        format!("{}/teams/{}/pipelines/{}", self.url, team, pipeline_name)
    }
}
