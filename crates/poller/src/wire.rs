//! Wire contract for the status endpoint
//!
//! `GET /status` → `200 {"result": "<status>"}`

use serde::{Deserialize, Serialize};

use crate::status::JobStatus;

/// Path of the status endpoint, relative to the base URL
pub const STATUS_PATH: &str = "/status";

/// Body of a successful status response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub result: String,
}

impl StatusResponse {
    pub fn new(status: &JobStatus) -> Self {
        Self {
            result: status.as_str().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_shape() {
        let body = StatusResponse::new(&JobStatus::Pending);
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({ "result": "pending" })
        );
    }

    #[test]
    fn test_missing_result_is_rejected() {
        let parsed = serde_json::from_str::<StatusResponse>(r#"{"status": "pending"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_non_string_result_is_rejected() {
        let parsed = serde_json::from_str::<StatusResponse>(r#"{"result": 42}"#);
        assert!(parsed.is_err());
    }
}
