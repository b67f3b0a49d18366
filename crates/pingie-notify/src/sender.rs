//! Notification sender.
//!
//! Builds the JSON payload for one message and posts it once. Failures end
//! here: they are logged and the caller always sees a completed call.

use std::sync::Arc;

use async_trait::async_trait;
use pingie_core::{non_blank, CredentialRecord, NotificationPayload};

use crate::client::PushClient;
use crate::error::TransportError;

/// Per-call presentation options. Blank values count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendOptions {
    pub title: Option<String>,
    pub icon_url: Option<String>,
    pub group_type: Option<String>,
}

/// Capability the host needs to expose a notification action.
#[async_trait]
pub trait NotifyService: Send + Sync {
    /// Deliver `message`. Never fails from the caller's point of view.
    async fn send_message(&self, message: &str, options: &SendOptions);
}

/// How a single delivery attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Delivered,
    Rejected { status: u16, body: String },
    TimedOut,
    ConnectFailed,
    Failed(String),
}

/// Sends notifications for one credential record.
pub struct NotificationSender {
    client: PushClient,
    record: Arc<CredentialRecord>,
}

impl NotificationSender {
    pub fn new(client: PushClient, record: Arc<CredentialRecord>) -> Self {
        tracing::info!(device_id = %record.device_id(), "Notification sender initialized");
        Self { client, record }
    }

    pub fn record(&self) -> &CredentialRecord {
        &self.record
    }

    /// Send `message` with optional per-call overrides.
    pub async fn send(
        &self,
        message: &str,
        title: Option<&str>,
        icon_url: Option<&str>,
        group_type: Option<&str>,
    ) {
        tracing::debug!(
            device_id = %self.record.device_id(),
            text = message,
            title = ?title,
            icon_url = ?icon_url,
            group_type = ?group_type,
            "Sending notification"
        );
        let payload = self.payload(message, title, icon_url, group_type);
        let _ = self.deliver(&payload).await;
    }

    /// Build the payload, falling back to the record's defaults for any
    /// option the call leaves blank.
    pub fn payload(
        &self,
        message: &str,
        title: Option<&str>,
        icon_url: Option<&str>,
        group_type: Option<&str>,
    ) -> NotificationPayload {
        let defaults = self.record.defaults();
        NotificationPayload::new(message)
            .with_title(pick(title, defaults.title.as_deref()))
            .with_icon_url(pick(icon_url, defaults.icon_url.as_deref()))
            .with_group_type(pick(group_type, defaults.group_type.as_deref()))
    }

    /// Post one payload and log the outcome. No retries.
    pub async fn deliver(&self, payload: &NotificationPayload) -> SendOutcome {
        let device_id = self.record.device_id();
        let result = self
            .client
            .post(device_id, self.record.token(), payload)
            .await;

        match result {
            Ok(response) if response.status == 200 => {
                tracing::info!(device_id, "Notification sent successfully");
                SendOutcome::Delivered
            }
            Ok(response) => {
                tracing::error!(
                    device_id,
                    status = response.status,
                    body = %response.body,
                    "Failed to send notification"
                );
                SendOutcome::Rejected {
                    status: response.status,
                    body: response.body,
                }
            }
            Err(TransportError::Timeout) => {
                tracing::error!(device_id, "Timeout sending notification");
                SendOutcome::TimedOut
            }
            Err(TransportError::Connect(e)) => {
                tracing::error!(device_id, error = %e, "Connection error sending notification");
                SendOutcome::ConnectFailed
            }
            Err(TransportError::Request(e)) => {
                tracing::error!(device_id, error = %e, "Error sending notification");
                SendOutcome::Failed(e)
            }
            Err(TransportError::Worker(e)) => {
                tracing::error!(device_id, error = %e, "Unexpected error sending notification");
                SendOutcome::Failed(e)
            }
        }
    }
}

#[async_trait]
impl NotifyService for NotificationSender {
    async fn send_message(&self, message: &str, options: &SendOptions) {
        self.send(
            message,
            options.title.as_deref(),
            options.icon_url.as_deref(),
            options.group_type.as_deref(),
        )
        .await;
    }
}

fn pick<'a>(call: Option<&'a str>, default: Option<&'a str>) -> Option<&'a str> {
    if non_blank(call).is_some() {
        call
    } else {
        default
    }
}
