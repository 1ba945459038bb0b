//! # Job Status Poller
//!
//! A long-poll client that queries a remote job for its status until the job
//! reaches a terminal state, a retry budget is exhausted, or a maximum total
//! wait time elapses.
//!
//! ## Features
//!
//! - **Exponential backoff**: the nominal wait grows by a fixed factor every round
//! - **Symmetric jitter**: each sleep is perturbed in both directions to desynchronize clients
//! - **Failure absorption**: transient transport errors are logged and retried, never raised
//! - **Error classification**: permanent transport errors abort instead of burning the budget
//! - **Cancellation**: a [`CancellationToken`](tokio_util::sync::CancellationToken) stops a poll promptly
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Poller                              │
//! │  (run loop: fetch → notify → decide → sleep, PollState)     │
//! └─────────────────────────────────────────────────────────────┘
//!          │                      │                      │
//!          ▼                      ▼                      ▼
//! ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐
//! │ StatusTransport │   │ StatusObserver  │   │     Backoff     │
//! │ (HttpTransport) │   │  (StatusTrace)  │   │ (wait × factor) │
//! └─────────────────┘   └─────────────────┘   └─────────────────┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use jobpoll::prelude::*;
//!
//! let config = PollConfig::default().with_max_attempts(5);
//! let poller = Poller::new(config, HttpTransport::new("http://127.0.0.1:5000"))?;
//!
//! let trace = StatusTrace::new();
//! let result = poller.run(Some(&trace)).await;
//! println!("Final Status: {result}");
//! ```

pub mod backoff;
pub mod config;
pub mod error;
pub mod observer;
pub mod poller;
pub mod status;
pub mod transport;
pub mod wire;

/// Prelude for common imports
pub mod prelude {
    pub use crate::backoff::Backoff;
    pub use crate::config::{ConfigError, PollConfig};
    pub use crate::error::TransportError;
    pub use crate::observer::{StatusObserver, StatusTrace};
    pub use crate::poller::Poller;
    pub use crate::status::{JobStatus, StatusResult};
    pub use crate::transport::{HttpTransport, StatusTransport};
    pub use crate::wire::StatusResponse;
}

// Re-export key types at crate root
pub use backoff::Backoff;
pub use config::{ConfigError, PollConfig};
pub use error::TransportError;
pub use observer::{StatusObserver, StatusTrace};
pub use poller::{PollState, Poller, RoundOutcome};
pub use status::{JobStatus, StatusResult};
pub use transport::{HttpTransport, StatusTransport};
pub use wire::{StatusResponse, STATUS_PATH};
