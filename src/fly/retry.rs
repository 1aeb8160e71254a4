//! Login retry on transient authentication failures

use crate::core::ResolvedTarget;
use crate::fly::{ControlTool, ControlToolError};
use std::time::Duration;
use tracing::{info, warn};

/// Substrings of fly output that mean a login is worth retrying
pub const TRANSIENT_LOGIN_MARKERS: &[&str] = &[
    "too many requests",
    "rate limit",
    "token refresh",
    "token is expired",
    "connection reset by peer",
];

/// How a failed login should be treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFailure {
    Transient,
    Terminal,
}

/// Classify a login error by the text fly printed
pub fn classify_login_failure(error: &ControlToolError) -> LoginFailure {
    let ControlToolError::CommandFailed { .. } = error else {
        return LoginFailure::Terminal;
    };

    let output = error.output().to_lowercase();
    if TRANSIENT_LOGIN_MARKERS.iter().any(|m| output.contains(m)) {
        LoginFailure::Transient
    } else {
        LoginFailure::Terminal
    }
}

/// Bounds for the login retry loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Policy without sleeps between attempts
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_backoff: Duration::ZERO,
        }
    }
}

/// Final failure of [`login_with_retry`]
#[derive(Debug)]
pub struct LoginError {
    pub attempts: u32,
    pub source: ControlToolError,
}

/// Log in, retrying transient failures up to `policy.max_attempts` times
///
/// Returns the number of attempts it took on success.
pub async fn login_with_retry<C: ControlTool + ?Sized>(
    tool: &C,
    target: &ResolvedTarget,
    policy: RetryPolicy,
) -> Result<u32, LoginError> {
    let mut attempt = 0;
    let mut delay = policy.initial_backoff;

    loop {
        attempt += 1;

        match tool.login(target).await {
            Ok(()) => {
                if attempt > 1 {
                    info!("Logged in to {} after {} attempt(s)", target.url, attempt);
                }
                return Ok(attempt);
            }
            Err(e) => {
                let kind = classify_login_failure(&e);
                if kind == LoginFailure::Terminal || attempt >= policy.max_attempts {
                    return Err(LoginError { attempts: attempt, source: e });
                }

                warn!(
                    "Transient login failure (attempt {}/{}): {}",
                    attempt, policy.max_attempts, e
                );
                warn!("Retrying in {} ms...", delay.as_millis());

                tokio::time::sleep(delay).await;
                delay *= 2;
            }
        }
    }
}
