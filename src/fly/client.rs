//! fly client configuration

use std::path::{Path, PathBuf};

/// Name of the fly binary shipped next to the resource executables
pub const FLY_BINARY_NAME: &str = "fly";

/// Configuration for the fly client
#[derive(Debug, Clone)]
pub struct FlyClientConfig {
    /// Path to the fly executable
    pub fly_path: PathBuf,

    /// Timeout for each fly invocation in seconds
    pub timeout_secs: u64,
}

impl Default for FlyClientConfig {
    fn default() -> Self {
        Self {
            fly_path: PathBuf::from(FLY_BINARY_NAME),
            timeout_secs: 300,
        }
    }
}

impl FlyClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the fly binary that sits in `dir`
    pub fn alongside(dir: &Path) -> Self {
        Self::default().with_fly_path(dir.join(FLY_BINARY_NAME))
    }

    pub fn with_fly_path(mut self, fly_path: impl Into<PathBuf>) -> Self {
        self.fly_path = fly_path.into();
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}
