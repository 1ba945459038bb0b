//! Job status poller
//!
//! Drives the fetch → notify → decide → sleep loop until the remote job
//! reaches a terminal status or the poll budget runs out.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::backoff::Backoff;
use crate::config::{ConfigError, PollConfig};
use crate::error::TransportError;
use crate::observer::StatusObserver;
use crate::status::{JobStatus, StatusResult};
use crate::transport::StatusTransport;

/// Outcome of one fetch
#[derive(Debug, Clone, PartialEq)]
pub enum RoundOutcome {
    /// Endpoint answered with a status
    Status(JobStatus),
    /// Request failed or its response could not be interpreted
    TransportFailure(TransportError),
}

/// Mutable state of a single poll
///
/// Created at the start of a run and dropped when it returns.
#[derive(Debug, Clone, PartialEq)]
pub struct PollState {
    attempt: u32,
    backoff: Backoff,
    total_elapsed: Duration,
}

impl PollState {
    pub fn new(config: &PollConfig) -> Self {
        Self {
            attempt: 0,
            backoff: Backoff::from_config(config),
            total_elapsed: Duration::ZERO,
        }
    }

    /// Completed non-terminal rounds
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Nominal wait for the next sleep, before jitter
    pub fn current_wait(&self) -> Duration {
        self.backoff.current()
    }

    /// Sum of all sleeps so far
    pub fn total_elapsed(&self) -> Duration {
        self.total_elapsed
    }

    /// Whether another round is allowed
    pub fn has_budget(&self, config: &PollConfig) -> bool {
        self.attempt < config.max_attempts && self.total_elapsed < config.max_wait_time
    }

    /// Draw the jittered sleep for this round and grow the nominal wait
    pub fn next_sleep(&mut self) -> Duration {
        self.backoff.next_sleep()
    }

    /// Account for a finished round that slept for `slept`
    pub fn finish_round(&mut self, slept: Duration) {
        self.total_elapsed = self.total_elapsed.saturating_add(slept);
        self.attempt += 1;
    }
}

/// Polls a remote job until it reaches a terminal status
///
/// The configuration and transport are bound at construction. All per-poll
/// state lives inside [`Poller::run`], so one poller can serve any number of
/// sequential or concurrent polls.
///
/// # Example
///
/// ```ignore
/// use jobpoll::{HttpTransport, PollConfig, Poller, StatusResult};
///
/// let poller = Poller::new(PollConfig::default(), HttpTransport::new("http://127.0.0.1:5000"))?;
///
/// match poller.run(Some(&|status: &str| println!("Status Updated: {status}"))).await {
///     StatusResult::Completed => println!("done"),
///     other => println!("stopped: {other}"),
/// }
/// ```
pub struct Poller {
    config: PollConfig,
    transport: Arc<dyn StatusTransport>,
}

impl Poller {
    /// Create a poller, rejecting configurations the loop cannot honor
    pub fn new(
        config: PollConfig,
        transport: impl StatusTransport + 'static,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            transport: Arc::new(transport),
        })
    }

    /// Get the poll configuration
    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Poll until a terminal status or budget exhaustion
    pub async fn run(&self, on_update: Option<&dyn StatusObserver>) -> StatusResult {
        self.run_until_cancelled(on_update, &CancellationToken::new())
            .await
    }

    /// Poll until a terminal status, budget exhaustion, or cancellation
    ///
    /// Cancellation is checked before every fetch and interrupts both an
    /// in-flight fetch and a backoff sleep.
    #[instrument(skip_all, fields(poll_id = %Uuid::now_v7()))]
    pub async fn run_until_cancelled(
        &self,
        on_update: Option<&dyn StatusObserver>,
        cancel: &CancellationToken,
    ) -> StatusResult {
        let mut state = PollState::new(&self.config);

        while state.has_budget(&self.config) {
            let attempt = state.attempt() + 1;

            if cancel.is_cancelled() {
                return cancelled(&state);
            }

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return cancelled(&state),
                outcome = self.fetch_round() => outcome,
            };

            match outcome {
                RoundOutcome::Status(status) => {
                    info!(attempt, status = %status, "Status fetched");

                    if let Some(observer) = on_update {
                        observer.notify(status.as_str());
                    }

                    if let Some(result) = status.terminal_result() {
                        return result;
                    }

                    if let JobStatus::Unknown(raw) = &status {
                        warn!(attempt, status = %raw, "Unrecognized status, treating as pending");
                    }
                }
                RoundOutcome::TransportFailure(err) => {
                    if !err.is_retryable() {
                        error!(attempt, kind = err.kind(), error = %err, "Status request failed permanently");
                        return StatusResult::Aborted {
                            reason: err.to_string(),
                        };
                    }
                    warn!(attempt, kind = err.kind(), error = %err, "Status request failed, will retry");
                }
            }

            let sleep = state.next_sleep();
            debug!(
                attempt,
                sleep_ms = sleep.as_millis() as u64,
                elapsed_ms = state.total_elapsed().as_millis() as u64,
                "Backing off"
            );

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return cancelled(&state),
                _ = tokio::time::sleep(sleep) => {}
            }

            state.finish_round(sleep);
        }

        warn!(
            attempts = state.attempt(),
            elapsed_ms = state.total_elapsed().as_millis() as u64,
            "Poll budget exhausted without a terminal status"
        );
        StatusResult::Timeout
    }

    /// Fetch once, bounded by the request timeout
    async fn fetch_round(&self) -> RoundOutcome {
        let limit = self.config.request_timeout;
        match tokio::time::timeout(limit, self.transport.fetch_status()).await {
            Ok(Ok(raw)) => RoundOutcome::Status(JobStatus::parse(&raw)),
            Ok(Err(err)) => RoundOutcome::TransportFailure(err),
            Err(_) => RoundOutcome::TransportFailure(TransportError::Timeout(format!(
                "no response within {:?}",
                limit
            ))),
        }
    }
}

fn cancelled(state: &PollState) -> StatusResult {
    info!(
        attempts = state.attempt(),
        elapsed_ms = state.total_elapsed().as_millis() as u64,
        "Poll cancelled"
    );
    StatusResult::Cancelled
}
