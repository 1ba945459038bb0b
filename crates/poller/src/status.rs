//! Job status and poll result types

use std::fmt;

use serde::{Deserialize, Serialize};

/// Status reported by the remote job
///
/// Parsed from the raw `result` string of a status response. Strings outside
/// the known set are kept verbatim in [`JobStatus::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    /// Job is still running
    Pending,
    /// Job finished successfully
    Completed,
    /// Job finished with a business-level error
    Error,
    /// Unrecognized status string
    Unknown(String),
}

impl JobStatus {
    /// Parse a raw status string
    pub fn parse(raw: &str) -> Self {
        match raw {
            "pending" => Self::Pending,
            "completed" => Self::Completed,
            "error" => Self::Error,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Wire representation
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Error => "error",
            Self::Unknown(raw) => raw,
        }
    }

    /// Whether polling stops on this status
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }

    /// Terminal poll result for this status, if any
    pub fn terminal_result(&self) -> Option<StatusResult> {
        match self {
            Self::Completed => Some(StatusResult::Completed),
            Self::Error => Some(StatusResult::Error),
            Self::Pending | Self::Unknown(_) => None,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final outcome of a poll
///
/// Every way a poll can end is a value of this type; `run` never fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "result")]
pub enum StatusResult {
    /// Remote job reported `completed`
    Completed,

    /// Remote job reported `error`; relayed, not interpreted
    Error,

    /// Attempt or wait budget exhausted without a terminal status
    Timeout,

    /// Cancellation was requested before a terminal status
    Cancelled,

    /// A transport error that cannot succeed on retry stopped the poll
    Aborted { reason: String },
}

impl StatusResult {
    /// Short lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Error => "error",
            Self::Timeout => "timeout",
            Self::Cancelled => "cancelled",
            Self::Aborted { .. } => "aborted",
        }
    }

    /// Whether the remote job itself reached a terminal status
    pub fn is_remote_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }
}

impl fmt::Display for StatusResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aborted { reason } => write!(f, "aborted ({})", reason),
            other => f.write_str(other.as_str()),
        }
    }
}
