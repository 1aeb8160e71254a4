//! Command-line interface

pub mod output;

use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

/// Env var conventionally holding the CI server's external URL
pub const EXTERNAL_URL_ENV: &str = "ATC_EXTERNAL_URL";

/// Concourse pipeline resource: out
#[derive(Debug, Parser, Clone)]
#[command(name = "out")]
#[command(about = "Set and unpause Concourse pipelines through fly", long_about = None)]
pub struct Cli {
    /// Directory the put step's inputs are mounted in
    pub sources_dir: PathBuf,

    /// Path to the fly binary (defaults to fly next to this executable)
    #[arg(long, env = "PIPELINE_RESOURCE_FLY")]
    pub fly: Option<PathBuf>,

    /// Timeout for each fly invocation, in seconds
    #[arg(long, env = "PIPELINE_RESOURCE_TIMEOUT_SECS", default_value_t = 300)]
    pub timeout_secs: u64,

    /// Fallback target URL when source.target is empty
    #[arg(long, env = EXTERNAL_URL_ENV, hide = true)]
    pub external_url: Option<String>,
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}
