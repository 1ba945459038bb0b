//! Poll configuration
//!
//! Immutable settings bound to a [`Poller`](crate::Poller) at construction.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default maximum number of poll rounds
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;
/// Default maximum accumulated sleep time
pub const DEFAULT_MAX_WAIT_TIME: Duration = Duration::from_secs(60);
/// Default nominal wait before the first backoff growth
pub const DEFAULT_INITIAL_WAIT_TIME: Duration = Duration::from_secs(1);
/// Default backoff multiplier
pub const DEFAULT_BACKOFF_FACTOR: f64 = 2.0;
/// Default symmetric jitter bound
pub const DEFAULT_JITTER: Duration = Duration::from_millis(500);
/// Default upper bound for a single status fetch
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration errors
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("max_attempts must be at least 1")]
    ZeroAttempts,

    #[error("max_wait_time must be greater than zero")]
    ZeroWaitTime,

    #[error("request_timeout must be greater than zero")]
    ZeroRequestTimeout,

    #[error("backoff_factor must be a finite number >= 1.0, got {0}")]
    InvalidBackoffFactor(f64),
}

/// Configuration for a status poll
///
/// Durations are (de)serialized as whole milliseconds, so sub-millisecond
/// precision does not survive a round trip.
///
/// # Example
///
/// ```
/// use jobpoll::PollConfig;
/// use std::time::Duration;
///
/// let config = PollConfig::default()
///     .with_max_attempts(5)
///     .with_initial_wait_time(Duration::from_millis(250))
///     .with_jitter(Duration::ZERO);
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PollConfig {
    /// Maximum number of rounds (fetch + sleep)
    pub max_attempts: u32,

    /// Stop once accumulated sleep time reaches this value
    #[serde(with = "duration_millis")]
    pub max_wait_time: Duration,

    /// Nominal wait after the first round
    #[serde(with = "duration_millis")]
    pub initial_wait_time: Duration,

    /// Multiplier applied to the nominal wait after every round
    pub backoff_factor: f64,

    /// Symmetric jitter bound: each sleep is nominal ± up to this value
    #[serde(with = "duration_millis")]
    pub jitter: Duration,

    /// Upper bound for a single status fetch
    #[serde(with = "duration_millis", default = "default_request_timeout")]
    pub request_timeout: Duration,
}

fn default_request_timeout() -> Duration {
    DEFAULT_REQUEST_TIMEOUT
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            max_wait_time: DEFAULT_MAX_WAIT_TIME,
            initial_wait_time: DEFAULT_INITIAL_WAIT_TIME,
            backoff_factor: DEFAULT_BACKOFF_FACTOR,
            jitter: DEFAULT_JITTER,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl PollConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Create configuration from environment variables
    ///
    /// Environment variables (unset or unparsable values keep the default):
    /// - `JOBPOLL_MAX_ATTEMPTS`: Maximum rounds (default: 10)
    /// - `JOBPOLL_MAX_WAIT_SECS`: Maximum accumulated sleep in seconds (default: 60)
    /// - `JOBPOLL_INITIAL_WAIT_SECS`: Initial nominal wait in seconds (default: 1.0)
    /// - `JOBPOLL_BACKOFF_FACTOR`: Backoff multiplier (default: 2.0)
    /// - `JOBPOLL_JITTER_SECS`: Symmetric jitter bound in seconds (default: 0.5)
    /// - `JOBPOLL_REQUEST_TIMEOUT_SECS`: Per-fetch bound in seconds (default: 10)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            max_attempts: env::var("JOBPOLL_MAX_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_attempts),
            max_wait_time: env_secs("JOBPOLL_MAX_WAIT_SECS").unwrap_or(defaults.max_wait_time),
            initial_wait_time: env_secs("JOBPOLL_INITIAL_WAIT_SECS")
                .unwrap_or(defaults.initial_wait_time),
            backoff_factor: env::var("JOBPOLL_BACKOFF_FACTOR")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.backoff_factor),
            jitter: env_secs("JOBPOLL_JITTER_SECS").unwrap_or(defaults.jitter),
            request_timeout: env_secs("JOBPOLL_REQUEST_TIMEOUT_SECS")
                .unwrap_or(defaults.request_timeout),
        }
    }

    /// Set the maximum number of rounds
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the maximum accumulated sleep time
    pub fn with_max_wait_time(mut self, max_wait_time: Duration) -> Self {
        self.max_wait_time = max_wait_time;
        self
    }

    /// Set the initial nominal wait
    pub fn with_initial_wait_time(mut self, initial_wait_time: Duration) -> Self {
        self.initial_wait_time = initial_wait_time;
        self
    }

    /// Set the backoff multiplier
    ///
    /// Stored as given; [`PollConfig::validate`] rejects values below 1.0.
    pub fn with_backoff_factor(mut self, factor: f64) -> Self {
        self.backoff_factor = factor;
        self
    }

    /// Set the symmetric jitter bound
    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    /// Set the per-fetch timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Check the configuration for values the poll loop cannot honor
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        if self.max_wait_time.is_zero() {
            return Err(ConfigError::ZeroWaitTime);
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ZeroRequestTimeout);
        }
        if !self.backoff_factor.is_finite() || self.backoff_factor < 1.0 {
            return Err(ConfigError::InvalidBackoffFactor(self.backoff_factor));
        }
        Ok(())
    }
}

/// Parse a non-negative number of seconds from an environment variable
fn env_secs(key: &str) -> Option<Duration> {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse::<f64>().ok())
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
}

/// Serde support for Duration as milliseconds
mod duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
