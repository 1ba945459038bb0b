//! Simulated job with delayed, latched completion

use std::env;
use std::time::Duration;

use jobpoll::JobStatus;
use parking_lot::Mutex;
use rand::Rng;
use thiserror::Error;
use tokio::time::Instant;
use tracing::info;

/// Status source errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("min_delay ({min:?}) must not exceed max_delay ({max:?})")]
    InvalidDelayRange { min: Duration, max: Duration },
}

/// Range from which a source draws its completion delay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    /// Shortest possible delay before the job resolves
    pub min_delay: Duration,
    /// Longest possible delay before the job resolves
    pub max_delay: Duration,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(15),
        }
    }
}

impl SourceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create configuration from environment variables
    ///
    /// Environment variables:
    /// - `JOBPOLL_SOURCE_MIN_DELAY_SECS`: Shortest delay in seconds (default: 5)
    /// - `JOBPOLL_SOURCE_MAX_DELAY_SECS`: Longest delay in seconds (default: 15)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let secs = |key: &str| {
            env::var(key)
                .ok()
                .and_then(|s| s.trim().parse::<f64>().ok())
                .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        };

        Self {
            min_delay: secs("JOBPOLL_SOURCE_MIN_DELAY_SECS").unwrap_or(defaults.min_delay),
            max_delay: secs("JOBPOLL_SOURCE_MAX_DELAY_SECS").unwrap_or(defaults.max_delay),
        }
    }

    /// Set both ends of the delay range
    pub fn with_delay_range(mut self, min: Duration, max: Duration) -> Self {
        self.min_delay = min;
        self.max_delay = max;
        self
    }

    pub fn validate(&self) -> Result<(), SourceError> {
        if self.min_delay > self.max_delay {
            return Err(SourceError::InvalidDelayRange {
                min: self.min_delay,
                max: self.max_delay,
            });
        }
        Ok(())
    }

    /// Draw a delay uniformly from the range, at millisecond granularity
    fn draw_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let min = self.min_delay.as_millis() as u64;
        let max = self.max_delay.as_millis() as u64;
        Duration::from_millis(rng.gen_range(min..=max))
    }
}

/// How a source picks its terminal status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// `completed` or `error` with equal probability
    Random,
    /// Always `completed`
    Completed,
    /// Always `error`
    Error,
}

impl Resolution {
    fn resolve<R: Rng + ?Sized>(self, rng: &mut R) -> JobStatus {
        match self {
            Self::Random if rng.gen_bool(0.5) => JobStatus::Completed,
            Self::Random => JobStatus::Error,
            Self::Completed => JobStatus::Completed,
            Self::Error => JobStatus::Error,
        }
    }
}

/// A simulated asynchronous job
///
/// Reports `pending` until `delay` has elapsed since creation. The first query
/// after that resolves the job to a terminal status, which never changes
/// afterwards. Each source owns its own state, so any number of them can run
/// side by side.
///
/// # Example
///
/// ```
/// use jobpoll::JobStatus;
/// use jobpoll_source::{Resolution, StatusSource};
/// use std::time::Duration;
///
/// let source = StatusSource::with_delay(Duration::ZERO).with_resolution(Resolution::Completed);
/// assert_eq!(source.query(), JobStatus::Completed);
/// ```
#[derive(Debug)]
pub struct StatusSource {
    created_at: Instant,
    delay: Duration,
    resolution: Resolution,
    status: Mutex<JobStatus>,
}

impl StatusSource {
    /// Create a source whose delay is drawn from `config`
    pub fn new(config: &SourceConfig) -> Result<Self, SourceError> {
        config.validate()?;
        let delay = config.draw_delay(&mut rand::thread_rng());
        info!(delay_ms = delay.as_millis() as u64, "Created status source");
        Ok(Self::with_delay(delay))
    }

    /// Create a source with a fixed delay
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            created_at: Instant::now(),
            delay,
            resolution: Resolution::Random,
            status: Mutex::new(JobStatus::Pending),
        }
    }

    /// Fix how the terminal status is chosen
    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    /// Delay before the job resolves
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Whether the job has latched a terminal status
    pub fn is_resolved(&self) -> bool {
        self.status.lock().is_terminal()
    }

    /// Current status of the job
    pub fn query(&self) -> JobStatus {
        let mut status = self.status.lock();
        if *status == JobStatus::Pending && self.created_at.elapsed() >= self.delay {
            let resolved = self.resolution.resolve(&mut rand::thread_rng());
            info!(status = %resolved, "Job resolved");
            *status = resolved;
        }
        status.clone()
    }
}
