//! Status transports
//!
//! The poller only needs one capability from the network: fetch the current
//! raw status string, or fail. [`HttpTransport`] implements the
//! `GET /status` wire contract; any `Fn() -> impl Future` closure works too.

use std::future::Future;

use async_trait::async_trait;
use tracing::trace;

use crate::error::TransportError;
use crate::wire::{StatusResponse, STATUS_PATH};

/// Fetches the current status of a remote job
#[async_trait]
pub trait StatusTransport: Send + Sync {
    /// Fetch the raw status string
    async fn fetch_status(&self) -> Result<String, TransportError>;
}

#[async_trait]
impl<F, Fut> StatusTransport for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<String, TransportError>> + Send,
{
    async fn fetch_status(&self) -> Result<String, TransportError> {
        self().await
    }
}

/// HTTP transport for the `GET /status` endpoint
pub struct HttpTransport {
    base_url: String,
    http: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport for the service at `base_url`
    pub fn new(base_url: &str) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Create a transport using a preconfigured client
    pub fn with_client(base_url: &str, http: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of the status endpoint
    pub fn status_url(&self) -> String {
        format!("{}{}", self.base_url, STATUS_PATH)
    }
}

#[async_trait]
impl StatusTransport for HttpTransport {
    async fn fetch_status(&self) -> Result<String, TransportError> {
        let url = self.status_url();
        let response = self.http.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let body: StatusResponse = serde_json::from_slice(&bytes)?;
        trace!(url = %url, result = %body.result, "Fetched status");

        Ok(body.result)
    }
}
