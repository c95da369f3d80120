//! Request/response interceptors run around every handler.
//!
//! Request interceptors run in registration order before routing and may only add
//! derived state to the [`TurnContext`]. Response interceptors observe the final
//! response. Both run to completion before dispatch moves on.

use crate::config::Verbosity;
use crate::context::TurnContext;
use crate::envelope::{RequestEvent, Response};
use crate::error::SkillResult;
use crate::i18n::Localizer;
use serde_json::Value;
use std::sync::Arc;

pub trait RequestInterceptor: Send + Sync {
    fn name(&self) -> &str;
    fn process(&self, ctx: &mut TurnContext) -> SkillResult<()>;
}

pub trait ResponseInterceptor: Send + Sync {
    fn name(&self) -> &str;
    fn process(&self, ctx: &TurnContext, response: &Response) -> SkillResult<()>;
}

/// Ordered pre- and post-handler hooks.
#[derive(Clone, Default)]
pub struct InterceptorChain {
    request: Vec<Arc<dyn RequestInterceptor>>,
    response: Vec<Arc<dyn ResponseInterceptor>>,
}

impl InterceptorChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request(mut self, interceptor: impl RequestInterceptor + 'static) -> Self {
        self.request.push(Arc::new(interceptor));
        self
    }

    pub fn with_response(mut self, interceptor: impl ResponseInterceptor + 'static) -> Self {
        self.response.push(Arc::new(interceptor));
        self
    }

    /// Stops at the first failing interceptor.
    pub fn run_request(&self, ctx: &mut TurnContext) -> SkillResult<()> {
        for interceptor in &self.request {
            tracing::trace!("[DISPATCH] request interceptor {}", interceptor.name());
            interceptor.process(ctx)?;
        }
        Ok(())
    }

    pub fn run_response(&self, ctx: &TurnContext, response: &Response) -> SkillResult<()> {
        for interceptor in &self.response {
            tracing::trace!("[DISPATCH] response interceptor {}", interceptor.name());
            interceptor.process(ctx, response)?;
        }
        Ok(())
    }

    pub fn names(&self) -> (Vec<&str>, Vec<&str>) {
        (
            self.request.iter().map(|i| i.name()).collect(),
            self.response.iter().map(|i| i.name()).collect(),
        )
    }
}

/// Attaches a translator for the event's locale. An event without a locale gets a
/// translator for the empty tag, so lookups fail with `UnknownLocale` at use.
#[derive(Debug, Clone)]
pub struct LocalizationInterceptor {
    localizer: Localizer,
}

impl LocalizationInterceptor {
    pub fn new(localizer: Localizer) -> Self {
        Self { localizer }
    }
}

impl RequestInterceptor for LocalizationInterceptor {
    fn name(&self) -> &str {
        "localization"
    }

    fn process(&self, ctx: &mut TurnContext) -> SkillResult<()> {
        let locale = ctx.event().locale().unwrap_or_default().to_string();
        ctx.attach_translator(self.localizer.resolve(&locale));
        Ok(())
    }
}

/// What the request logger writes for an event: the whole envelope on the first turn
/// of a session, otherwise just the request with the session id folded in.
pub fn request_log_payload(event: &RequestEvent) -> (&'static str, Value) {
    if event.is_new_session() {
        return ("Request envelope", event.raw().clone());
    }
    let mut request = event.raw().get("request").cloned().unwrap_or(Value::Null);
    if let (Value::Object(map), Some(session_id)) = (&mut request, event.session_id()) {
        map.insert(
            "sessionId".to_string(),
            Value::String(session_id.to_string()),
        );
    }
    ("Request object", request)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RequestLoggingInterceptor {
    verbosity: Verbosity,
}

impl RequestLoggingInterceptor {
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }
}

impl RequestInterceptor for RequestLoggingInterceptor {
    fn name(&self) -> &str {
        "request-logging"
    }

    fn process(&self, ctx: &mut TurnContext) -> SkillResult<()> {
        if !self.verbosity.is_verbose() {
            return Ok(());
        }
        let (label, payload) = request_log_payload(ctx.event());
        let rendered = serde_json::to_string_pretty(&payload)?;
        tracing::info!("[DISPATCH] {}: {}", label, rendered);
        Ok(())
    }
}

/// Logs only the spoken content of the response.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseLoggingInterceptor {
    verbosity: Verbosity,
}

impl ResponseLoggingInterceptor {
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }
}

impl ResponseInterceptor for ResponseLoggingInterceptor {
    fn name(&self) -> &str {
        "response-logging"
    }

    fn process(&self, _ctx: &TurnContext, response: &Response) -> SkillResult<()> {
        if self.verbosity.is_verbose() {
            tracing::info!(
                "[DISPATCH] Response text: {}",
                response.spoken_content().unwrap_or("<none>")
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::InvocationContext;
    use crate::error::SkillError;
    use crate::i18n::LocaleTable;
    use crate::progressive::{DirectiveClient, DirectiveRequest, ProgressiveSignal};
    use serde_json::json;
    use std::sync::Mutex;

    struct NoDirectives;

    #[async_trait::async_trait]
    impl DirectiveClient for NoDirectives {
        async fn enqueue(&self, _: &str, _: &str, _: &DirectiveRequest) -> SkillResult<()> {
            Ok(())
        }
    }

    fn ctx(event: Value) -> TurnContext {
        TurnContext::new(
            RequestEvent::from_value(event).unwrap(),
            InvocationContext::new("req", "fn", "stream"),
            ProgressiveSignal::new(Arc::new(NoDirectives)),
        )
    }

    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
        fail: bool,
    }

    impl RequestInterceptor for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        fn process(&self, _ctx: &mut TurnContext) -> SkillResult<()> {
            self.log.lock().unwrap().push(self.name);
            if self.fail {
                return Err(SkillError::Interceptor {
                    name: self.name.to_string(),
                    message: "refused".to_string(),
                });
            }
            Ok(())
        }
    }

    #[test]
    fn request_interceptors_run_in_order_and_stop_on_failure() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let chain = InterceptorChain::new()
            .with_request(Recorder { name: "a", log: log.clone(), fail: false })
            .with_request(Recorder { name: "b", log: log.clone(), fail: true })
            .with_request(Recorder { name: "c", log: log.clone(), fail: false });
        let mut ctx = ctx(json!({ "request": { "type": "LaunchRequest" } }));
        assert!(chain.run_request(&mut ctx).is_err());
        assert_eq!(*log.lock().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn localization_attaches_translator_for_event_locale() {
        let table = LocaleTable::new().with_locale("de-DE", &[("welcome", &["Willkommen!"])]);
        let chain = InterceptorChain::new()
            .with_request(LocalizationInterceptor::new(Localizer::new(table)));
        let mut ctx = ctx(json!({ "request": { "type": "LaunchRequest", "locale": "de-DE" } }));
        assert!(matches!(ctx.t("welcome"), Err(SkillError::MissingTranslator)));
        chain.run_request(&mut ctx).unwrap();
        assert_eq!(ctx.t("welcome").unwrap(), "Willkommen!");
    }

    #[test]
    fn missing_locale_fails_at_lookup() {
        let interceptor = LocalizationInterceptor::new(Localizer::new(LocaleTable::new()));
        let mut ctx = ctx(json!({ "request": { "type": "LaunchRequest" } }));
        interceptor.process(&mut ctx).unwrap();
        assert!(matches!(ctx.t("welcome"), Err(SkillError::UnknownLocale(_))));
    }

    #[test]
    fn request_log_payload_depends_on_session_state() {
        let first = RequestEvent::from_value(json!({
            "session": { "new": true, "sessionId": "s-1" },
            "request": { "type": "LaunchRequest" }
        }))
        .unwrap();
        let (label, payload) = request_log_payload(&first);
        assert_eq!(label, "Request envelope");
        assert_eq!(payload["session"]["sessionId"], "s-1");

        let later = RequestEvent::from_value(json!({
            "session": { "new": false, "sessionId": "s-1" },
            "request": { "type": "IntentRequest", "requestId": "r-2" }
        }))
        .unwrap();
        let (label, payload) = request_log_payload(&later);
        assert_eq!(label, "Request object");
        assert_eq!(payload, json!({ "type": "IntentRequest", "requestId": "r-2", "sessionId": "s-1" }));
    }
}
