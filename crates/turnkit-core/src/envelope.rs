//! Request and response envelopes exchanged with the voice platform.
//!
//! A [`RequestEvent`] keeps the typed view the runtime routes on *and* the raw JSON it
//! was parsed from. The raw form is what gets logged and (after redaction) reported, so
//! fields the typed view does not model are never silently dropped from diagnostics.

use crate::error::{SkillError, SkillResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const LAUNCH_REQUEST: &str = "LaunchRequest";
pub const INTENT_REQUEST: &str = "IntentRequest";
pub const SESSION_ENDED_REQUEST: &str = "SessionEndedRequest";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Intent {
    pub name: String,
}

/// Platform-side error reported on a `SessionEndedRequest` with reason `ERROR`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlatformError {
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    #[serde(rename = "type")]
    pub request_type: String,
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub intent: Option<Intent>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub error: Option<PlatformError>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemContext {
    #[serde(default)]
    pub api_endpoint: Option<String>,
    #[serde(default)]
    pub api_access_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventContext {
    #[serde(rename = "System", default)]
    pub system: Option<SystemContext>,
    #[serde(default)]
    pub function_name: Option<String>,
    #[serde(default)]
    pub aws_request_id: Option<String>,
    #[serde(default)]
    pub log_stream_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct Envelope {
    #[serde(default)]
    session: Option<Session>,
    request: Request,
    #[serde(default)]
    context: Option<EventContext>,
}

/// One inbound turn. Immutable once parsed.
#[derive(Debug, Clone)]
pub struct RequestEvent {
    envelope: Envelope,
    raw: Value,
}

impl RequestEvent {
    pub fn from_value(raw: Value) -> SkillResult<Self> {
        let envelope: Envelope = serde_json::from_value(raw.clone())
            .map_err(|e| SkillError::InvalidEvent(e.to_string()))?;
        Ok(Self { envelope, raw })
    }

    pub fn from_json(body: &str) -> SkillResult<Self> {
        let raw: Value =
            serde_json::from_str(body).map_err(|e| SkillError::InvalidEvent(e.to_string()))?;
        Self::from_value(raw)
    }

    /// The envelope exactly as received.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn request(&self) -> &Request {
        &self.envelope.request
    }

    pub fn session(&self) -> Option<&Session> {
        self.envelope.session.as_ref()
    }

    pub fn request_type(&self) -> &str {
        &self.envelope.request.request_type
    }

    pub fn intent_name(&self) -> Option<&str> {
        self.envelope.request.intent.as_ref().map(|i| i.name.as_str())
    }

    pub fn locale(&self) -> Option<&str> {
        self.envelope.request.locale.as_deref()
    }

    pub fn request_id(&self) -> Option<&str> {
        self.envelope.request.request_id.as_deref()
    }

    pub fn end_reason(&self) -> Option<&str> {
        self.envelope.request.reason.as_deref()
    }

    pub fn platform_error(&self) -> Option<&PlatformError> {
        self.envelope.request.error.as_ref()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session().and_then(|s| s.session_id.as_deref())
    }

    pub fn is_new_session(&self) -> bool {
        self.session().map(|s| s.new).unwrap_or(false)
    }

    pub fn user_id(&self) -> Option<&str> {
        self.session()
            .and_then(|s| s.user.as_ref())
            .and_then(|u| u.user_id.as_deref())
    }

    pub fn context(&self) -> Option<&EventContext> {
        self.envelope.context.as_ref()
    }

    fn system(&self) -> Option<&SystemContext> {
        self.context().and_then(|c| c.system.as_ref())
    }

    pub fn api_endpoint(&self) -> Option<&str> {
        self.system().and_then(|s| s.api_endpoint.as_deref())
    }

    pub fn api_access_token(&self) -> Option<&str> {
        self.system().and_then(|s| s.api_access_token.as_deref())
    }
}

/// Per-invocation metadata supplied by the execution environment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationContext {
    pub aws_request_id: String,
    pub function_name: String,
    pub log_stream_name: String,
    pub started_at: DateTime<Utc>,
}

impl InvocationContext {
    pub fn new(
        aws_request_id: impl Into<String>,
        function_name: impl Into<String>,
        log_stream_name: impl Into<String>,
    ) -> Self {
        Self {
            aws_request_id: aws_request_id.into(),
            function_name: function_name.into(),
            log_stream_name: log_stream_name.into(),
            started_at: Utc::now(),
        }
    }

    /// Prefer values carried on the event's `context` object; fall back to `defaults`.
    pub fn from_event(event: &RequestEvent, defaults: &InvocationContext) -> Self {
        let ctx = event.context();
        Self {
            aws_request_id: pick(
                ctx.and_then(|c| c.aws_request_id.as_ref()),
                &defaults.aws_request_id,
            ),
            function_name: pick(
                ctx.and_then(|c| c.function_name.as_ref()),
                &defaults.function_name,
            ),
            log_stream_name: pick(
                ctx.and_then(|c| c.log_stream_name.as_ref()),
                &defaults.log_stream_name,
            ),
            started_at: defaults.started_at,
        }
    }
}

fn pick(value: Option<&String>, default: &str) -> String {
    value
        .map(String::as_str)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default)
        .to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum OutputSpeech {
    #[serde(rename = "SSML")]
    Ssml { ssml: String },
    #[serde(rename = "PlainText")]
    PlainText { text: String },
}

impl OutputSpeech {
    pub fn content(&self) -> &str {
        match self {
            OutputSpeech::Ssml { ssml } => ssml,
            OutputSpeech::PlainText { text } => text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reprompt {
    pub output_speech: OutputSpeech,
}

/// Response body handed back to the platform.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_speech: Option<OutputSpeech>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reprompt: Option<Reprompt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub should_end_session: Option<bool>,
}

impl Response {
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder::default()
    }

    /// Spoken (SSML) or text content, whichever is present.
    pub fn spoken_content(&self) -> Option<&str> {
        self.output_speech.as_ref().map(OutputSpeech::content)
    }
}

/// Wire envelope: `{ "version": "1.0", "response": { ... } }`.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseEnvelope {
    pub version: &'static str,
    pub response: Response,
}

impl From<Response> for ResponseEnvelope {
    fn from(response: Response) -> Self {
        Self {
            version: "1.0",
            response,
        }
    }
}

fn ssml(speech: &str) -> OutputSpeech {
    OutputSpeech::Ssml {
        ssml: format!("<speak>{}</speak>", speech),
    }
}

#[derive(Debug, Default)]
pub struct ResponseBuilder {
    response: Response,
}

impl ResponseBuilder {
    pub fn speak(mut self, speech: impl AsRef<str>) -> Self {
        self.response.output_speech = Some(ssml(speech.as_ref()));
        self
    }

    /// Setting a reprompt keeps the session open.
    pub fn reprompt(mut self, speech: impl AsRef<str>) -> Self {
        self.response.reprompt = Some(Reprompt {
            output_speech: ssml(speech.as_ref()),
        });
        self.response.should_end_session = Some(false);
        self
    }

    pub fn with_should_end_session(mut self, end: bool) -> Self {
        self.response.should_end_session = Some(end);
        self
    }

    pub fn build(self) -> Response {
        self.response
    }
}
