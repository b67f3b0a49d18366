//! HTTP transport to the push endpoint.
//!
//! Requests use the blocking reqwest client and always run on tokio's blocking
//! pool, so callers on the async runtime are never stalled.

use std::time::Duration;

use pingie_core::config::ApiConfig;
use pingie_core::{NotificationPayload, PingieError, Secret};
use reqwest::Url;

use crate::error::TransportError;

/// Status and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushResponse {
    pub status: u16,
    pub body: String,
}

/// Posts JSON payloads to `{base_url}/{device_id}?token={token}`.
#[derive(Debug, Clone)]
pub struct PushClient {
    base_url: Url,
    timeout: Duration,
}

impl PushClient {
    /// Create a client from the `[api]` config section.
    pub fn new(config: &ApiConfig) -> Result<Self, PingieError> {
        let base_url = Url::parse(config.base_url.trim())
            .map_err(|e| PingieError::Config(format!("invalid api.base_url: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(PingieError::Config(format!(
                "api.base_url cannot carry a path: {}",
                base_url
            )));
        }
        Ok(Self {
            base_url,
            timeout: config.timeout(),
        })
    }

    /// Override the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Target URL for a device or group, without the token.
    pub fn endpoint(&self, device_id: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(device_id);
        }
        url
    }

    /// Issue one POST on the blocking pool and wait for the outcome.
    ///
    /// Any HTTP status counts as a response; only transport failures are
    /// errors.
    pub async fn post(
        &self,
        device_id: &str,
        token: &Secret,
        payload: &NotificationPayload,
    ) -> Result<PushResponse, TransportError> {
        let url = self.endpoint(device_id);
        let token = token.clone();
        let payload = payload.clone();
        let timeout = self.timeout;

        tokio::task::spawn_blocking(move || post_blocking(url, &token, &payload, timeout)).await?
    }
}

fn post_blocking(
    url: Url,
    token: &Secret,
    payload: &NotificationPayload,
    timeout: Duration,
) -> Result<PushResponse, TransportError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()?;

    let response = client
        .post(url)
        .query(&[("token", token.expose())])
        .json(payload)
        .send()?;

    let status = response.status().as_u16();
    let body = match response.text() {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(status, error = %e, "Could not read response body");
            String::new()
        }
    };
    Ok(PushResponse { status, body })
}
