//! Progressive responses: one-shot interim speech sent ahead of the real response.
//!
//! Used to tell the caller "an intentional delay follows" before a handler suspends.
//! The directive is delivered on a spawned task; the handler never awaits it, and a
//! failed delivery is logged and otherwise ignored.

use crate::envelope::RequestEvent;
use crate::error::{SkillError, SkillResult};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

pub const SPEAK_DIRECTIVE_TYPE: &str = "VoicePlayer.Speak";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectiveHeader {
    pub request_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeakDirective {
    #[serde(rename = "type")]
    pub directive_type: &'static str,
    pub speech: String,
}

/// Body of the interim-response call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectiveRequest {
    pub header: DirectiveHeader,
    pub directive: SpeakDirective,
}

impl DirectiveRequest {
    pub fn speak(request_id: impl Into<String>, phrase: &str) -> Self {
        Self {
            header: DirectiveHeader {
                request_id: request_id.into(),
            },
            directive: SpeakDirective {
                directive_type: SPEAK_DIRECTIVE_TYPE,
                speech: format!("<speak>{}</speak>", phrase),
            },
        }
    }
}

/// Where and how an interim directive is delivered.
#[async_trait::async_trait]
pub trait DirectiveClient: Send + Sync {
    async fn enqueue(
        &self,
        api_endpoint: &str,
        api_access_token: &str,
        directive: &DirectiveRequest,
    ) -> SkillResult<()>;
}

/// Posts directives to `{apiEndpoint}/v1/directives` with the event's bearer token.
#[derive(Debug, Clone)]
pub struct HttpDirectiveClient {
    client: reqwest::Client,
}

impl HttpDirectiveClient {
    pub fn new() -> SkillResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl DirectiveClient for HttpDirectiveClient {
    async fn enqueue(
        &self,
        api_endpoint: &str,
        api_access_token: &str,
        directive: &DirectiveRequest,
    ) -> SkillResult<()> {
        let url = format!("{}/v1/directives", api_endpoint.trim_end_matches('/'));
        let resp = self
            .client
            .post(&url)
            .bearer_auth(api_access_token)
            .json(directive)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(SkillError::Directive(format!(
                "{} returned {}",
                url,
                resp.status()
            )));
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct ProgressiveSignal {
    client: Arc<dyn DirectiveClient>,
}

impl ProgressiveSignal {
    pub fn new(client: Arc<dyn DirectiveClient>) -> Self {
        Self { client }
    }

    /// Build the target and body for `phrase` from the event's system context.
    pub fn directive_for(
        event: &RequestEvent,
        phrase: &str,
    ) -> SkillResult<(String, String, DirectiveRequest)> {
        let endpoint = event
            .api_endpoint()
            .ok_or_else(|| SkillError::Directive("event carries no apiEndpoint".to_string()))?;
        let token = event
            .api_access_token()
            .ok_or_else(|| SkillError::Directive("event carries no apiAccessToken".to_string()))?;
        let request_id = event.request_id().unwrap_or_default();
        Ok((
            endpoint.to_string(),
            token.to_string(),
            DirectiveRequest::speak(request_id, phrase),
        ))
    }

    /// Spawn delivery and return immediately. Must be called inside a Tokio runtime.
    pub fn send(&self, event: &RequestEvent, phrase: &str) -> JoinHandle<()> {
        let target = Self::directive_for(event, phrase);
        let client = Arc::clone(&self.client);
        tokio::spawn(async move {
            let (endpoint, token, directive) = match target {
                Ok(t) => t,
                Err(e) => {
                    tracing::warn!("[PROGRESSIVE] Not sent: {}", e);
                    return;
                }
            };
            match client.enqueue(&endpoint, &token, &directive).await {
                Ok(()) => tracing::debug!(
                    "[PROGRESSIVE] Interim speech delivered for {}",
                    directive.header.request_id
                ),
                Err(e) => tracing::warn!("[PROGRESSIVE] Delivery failed: {}", e),
            }
        })
    }
}

impl std::fmt::Debug for ProgressiveSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressiveSignal").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn directive_body_matches_platform_shape() {
        let body = DirectiveRequest::speak("amzn1.echo-api.request.1", "Certainly!");
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "header": { "requestId": "amzn1.echo-api.request.1" },
                "directive": { "type": "VoicePlayer.Speak", "speech": "<speak>Certainly!</speak>" }
            })
        );
    }

    #[test]
    fn directive_requires_endpoint_and_token() {
        let event = RequestEvent::from_value(json!({
            "request": { "type": "IntentRequest", "requestId": "r-1", "locale": "en-US" },
            "context": { "System": { "apiEndpoint": "https://api.example.com" } }
        }))
        .unwrap();
        let err = ProgressiveSignal::directive_for(&event, "Hi").unwrap_err();
        assert!(matches!(err, SkillError::Directive(_)));
    }
}
