//! Operator notification channels.

use crate::error::{SkillError, SkillResult};
use serde::Serialize;
use std::time::Duration;

/// One message handed to a channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest {
    pub subject: String,
    pub message: String,
    pub channel_target: String,
}

#[async_trait::async_trait]
pub trait NotificationChannel: Send + Sync {
    fn name(&self) -> &str;

    /// Deliver one message. Returns a channel-specific receipt for logging.
    async fn publish(&self, request: &PublishRequest) -> SkillResult<String>;
}

/// POSTs the request as JSON to a fixed URL (e.g. a topic's HTTP bridge).
#[derive(Debug, Clone)]
pub struct WebhookChannel {
    url: String,
    client: reqwest::Client,
}

impl WebhookChannel {
    pub fn new(url: impl Into<String>) -> SkillResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

#[async_trait::async_trait]
impl NotificationChannel for WebhookChannel {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn publish(&self, request: &PublishRequest) -> SkillResult<String> {
        let resp = self.client.post(&self.url).json(request).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SkillError::Notification(format!(
                "{} returned {}: {}",
                self.url, status, body
            )));
        }
        Ok(format!("HTTP {}", status.as_u16()))
    }
}

/// Writes the report to the log at `error` level. Used when no webhook is configured.
#[derive(Debug, Clone, Default)]
pub struct LogChannel;

#[async_trait::async_trait]
impl NotificationChannel for LogChannel {
    fn name(&self) -> &str {
        "log"
    }

    async fn publish(&self, request: &PublishRequest) -> SkillResult<String> {
        tracing::error!(
            target: "turnkit::report",
            channel_target = %request.channel_target,
            "[REPORT] {}\n{}",
            request.subject,
            request.message
        );
        Ok("logged".to_string())
    }
}
