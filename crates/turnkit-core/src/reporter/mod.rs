//! Error diagnostics: redacted failure reports with log console deep links.
//!
//! A report is assembled synchronously from the event, the invocation metadata and a
//! failure summary, then handed to a [`NotificationChannel`] on a spawned task. The
//! caller never waits for delivery; a channel failure is logged and dropped.
//!
//! Report bodies mark field labels as `%Label:%` and wrap values in backticks so chat
//! renderers can style them. [`strip_markers`] turns that into plain text for channels
//! that cannot.

pub mod channel;
pub mod deep_link;
pub mod redact;

use crate::config::NotificationConfig;
use crate::envelope::{InvocationContext, RequestEvent};
use crate::error::{SkillError, SkillResult};
use chrono::{DateTime, SecondsFormat, Utc};
use channel::{LogChannel, NotificationChannel, PublishRequest, WebhookChannel};
use deep_link::QueryWindow;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tokio::task::JoinHandle;

static LABEL_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^%([^%\n]+):%").expect("label marker pattern is valid"));

/// Remove `%Label:%` markers and backticks. URL escapes (`%2F`, `%252F`) are kept.
/// Idempotent.
pub fn strip_markers(body: &str) -> String {
    LABEL_MARKER.replace_all(body, "$1:").replace('`', "")
}

/// What went wrong, as labelled fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureSummary {
    fields: Vec<(String, String)>,
}

impl FailureSummary {
    pub fn from_error(error: &SkillError) -> Self {
        let mut summary = Self {
            fields: vec![("Error".to_string(), format!("{}: {}", error.kind(), error))],
        };
        if let Some(location) = error.source_location() {
            summary = summary.field("Error location", location.to_string());
        }
        summary
    }

    /// A platform-side error delivered on a session-ended event.
    pub fn platform_error(error_type: &str, message: &str) -> Self {
        Self {
            fields: vec![
                ("Error type".to_string(), error_type.to_string()),
                ("Error message".to_string(), message.to_string()),
            ],
        }
    }

    pub fn field(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((label.into(), value.into()));
        self
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }
}

/// A report ready for delivery. The body embeds only redacted event data.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticReport {
    pub subject: String,
    /// Marked-up body (`%Label:%`, backticks).
    pub redacted_body: String,
    pub channel_target: String,
}

impl DiagnosticReport {
    pub fn plaintext(&self) -> String {
        strip_markers(&self.redacted_body)
    }

    pub fn to_publish_request(&self) -> PublishRequest {
        PublishRequest {
            subject: self.subject.clone(),
            message: self.plaintext(),
            channel_target: self.channel_target.clone(),
        }
    }
}

pub struct ErrorReporter {
    config: NotificationConfig,
    channel: Arc<dyn NotificationChannel>,
}

impl ErrorReporter {
    pub fn new(config: NotificationConfig, channel: Arc<dyn NotificationChannel>) -> Self {
        Self { config, channel }
    }

    /// Webhook channel when a URL is configured, log channel otherwise.
    pub fn from_config(config: NotificationConfig) -> SkillResult<Self> {
        let channel: Arc<dyn NotificationChannel> = match &config.webhook_url {
            Some(url) => Arc::new(WebhookChannel::new(url.clone())?),
            None => {
                tracing::info!("[SYSTEM] No NOTIFICATION_WEBHOOK_URL set; reports go to the log.");
                Arc::new(LogChannel)
            }
        };
        Ok(Self::new(config, channel))
    }

    /// Assemble the report for a failure observed at `now`.
    pub fn build_report(
        &self,
        event: &RequestEvent,
        invocation: &InvocationContext,
        summary: &FailureSummary,
        now: DateTime<Utc>,
    ) -> DiagnosticReport {
        let region = &self.config.log_group_region;
        let group = &self.config.log_group_name;
        let mut lines: Vec<String> = summary
            .fields()
            .iter()
            .map(|(label, value)| format!("%{}:% `{}`", label, value))
            .collect();
        lines.push(String::new());
        lines.push(format!("%Log stream:% `{}`", invocation.log_stream_name));
        lines.push(format!(
            "%Log stream URL:% {}",
            deep_link::stream_link(region, group, &invocation.log_stream_name)
        ));
        if let Some(session_id) = event.session_id() {
            lines.push(format!("%Session ID:% `{}`", session_id));
            lines.push(format!(
                "%Session query URL:% {}",
                deep_link::session_query_link(
                    region,
                    group,
                    session_id,
                    QueryWindow::hour_ending(now)
                )
            ));
        }
        lines.push(format!("%AWS Request ID:% `{}`", invocation.aws_request_id));
        lines.push(format!(
            "%Error timestamp:% `{}`",
            now.to_rfc3339_opts(SecondsFormat::Millis, true)
        ));
        lines.push(String::new());
        lines.push(format!(
            "%Handler input:% ```{}```",
            redact::redact(event.raw()).to_pretty_json()
        ));

        DiagnosticReport {
            subject: self.config.subject.clone(),
            redacted_body: lines.join("\n"),
            channel_target: self.config.channel_target.clone(),
        }
    }

    /// Build a report now and publish it in the background.
    pub fn report(
        &self,
        event: &RequestEvent,
        invocation: &InvocationContext,
        summary: &FailureSummary,
    ) -> JoinHandle<()> {
        let report = self.build_report(event, invocation, summary, Utc::now());
        let channel = Arc::clone(&self.channel);
        tokio::spawn(async move {
            let request = report.to_publish_request();
            match channel.publish(&request).await {
                Ok(receipt) => tracing::info!(
                    "[REPORT] Diagnostic report published via {} ({})",
                    channel.name(),
                    receipt
                ),
                Err(e) => tracing::error!(
                    "[REPORT] Failed to publish diagnostic report via {}: {}",
                    channel.name(),
                    e
                ),
            }
        })
    }
}

impl std::fmt::Debug for ErrorReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorReporter")
            .field("config", &self.config)
            .field("channel", &self.channel.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Failure;
    use chrono::TimeZone;
    use serde_json::json;

    fn config() -> NotificationConfig {
        NotificationConfig {
            channel_target: "arn:aws:sns:us-east-1:123456789012:skill-errors".to_string(),
            subject: "Skill error".to_string(),
            webhook_url: None,
            log_group_region: "us-east-1".to_string(),
            log_group_name: "/aws/lambda/error-skill".to_string(),
        }
    }

    fn event() -> RequestEvent {
        RequestEvent::from_value(json!({
            "session": {
                "new": true,
                "sessionId": "amzn1.echo-api.session.1234",
                "user": { "userId": "amzn1.ask.account.SECRETUSER" }
            },
            "context": { "System": { "apiAccessToken": "secret-token" } },
            "request": { "type": "IntentRequest", "locale": "en-US" }
        }))
        .unwrap()
    }

    fn invocation() -> InvocationContext {
        InvocationContext::new("req-42", "error-skill", "2020/10/16/[$LATEST]0123abcd")
    }

    #[test]
    fn strip_markers_keeps_url_escapes() {
        let body = "%Log stream URL:% https://x/#a/%2Fg/b/2020%252F10\n%Session ID:% `abc`";
        let plain = strip_markers(body);
        assert_eq!(plain, "Log stream URL: https://x/#a/%2Fg/b/2020%252F10\nSession ID: abc");
        assert_eq!(strip_markers(&plain), plain);
    }

    #[test]
    fn report_carries_links_and_redacted_input() {
        let reporter = ErrorReporter::new(config(), Arc::new(LogChannel));
        let now = Utc.with_ymd_and_hms(2020, 10, 16, 12, 34, 56).unwrap();
        let summary = FailureSummary::from_error(&Failure::new("fragile object").into());
        let report = reporter.build_report(&event(), &invocation(), &summary, now);

        assert_eq!(report.subject, "Skill error");
        assert_eq!(report.channel_target, config().channel_target);
        let body = &report.redacted_body;
        assert!(body.starts_with("%Error:% `HandlerFailure: Handler failure: fragile object"));
        assert!(body.contains("%Error location:% `mod.rs:"));
        assert!(body.contains("%Session ID:% `amzn1.echo-api.session.1234`"));
        assert!(body.contains("%AWS Request ID:% `req-42`"));
        assert!(body.contains("%Error timestamp:% `2020-10-16T12:34:56.000Z`"));
        assert!(body.contains(&deep_link::stream_link(
            "us-east-1",
            "/aws/lambda/error-skill",
            "2020/10/16/[$LATEST]0123abcd"
        )));
        assert!(body.contains("#logsV2:logs-insights%3FqueryDetail%3D"));
        assert!(!body.contains("SECRETUSER"));
        assert!(!body.contains("secret-token"));

        let plain = report.plaintext();
        assert!(!plain.contains('`'));
        assert!(plain.contains("Log stream URL: https://"));
        assert!(plain.contains("%252F10%252F16%252F%255B%2524LATEST%255D"));
    }

    #[test]
    fn report_without_session_omits_query_link() {
        let reporter = ErrorReporter::new(config(), Arc::new(LogChannel));
        let event = RequestEvent::from_value(json!({ "request": { "type": "LaunchRequest" } }))
            .unwrap();
        let summary = FailureSummary::platform_error("INVALID_RESPONSE", "bad ssml");
        let report = reporter.build_report(&event, &invocation(), &summary, Utc::now());
        assert!(report.redacted_body.starts_with("%Error type:% `INVALID_RESPONSE`"));
        assert!(!report.redacted_body.contains("Session query URL"));
    }
}
