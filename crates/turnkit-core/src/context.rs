//! The explicit per-dispatch context threaded from interceptors to the handler.
//!
//! The event and invocation metadata are shared read-only; the only state an
//! interceptor can add is derived data such as the resolved translator.

use crate::envelope::{InvocationContext, RequestEvent, Response, ResponseBuilder};
use crate::error::{SkillError, SkillResult};
use crate::i18n::Translator;
use crate::progressive::ProgressiveSignal;
use std::sync::Arc;
use tokio::task::JoinHandle;

#[derive(Clone)]
pub struct TurnContext {
    event: Arc<RequestEvent>,
    invocation: Arc<InvocationContext>,
    translator: Option<Translator>,
    progressive: ProgressiveSignal,
}

impl TurnContext {
    pub fn new(
        event: RequestEvent,
        invocation: InvocationContext,
        progressive: ProgressiveSignal,
    ) -> Self {
        Self {
            event: Arc::new(event),
            invocation: Arc::new(invocation),
            translator: None,
            progressive,
        }
    }

    pub fn event(&self) -> &RequestEvent {
        &self.event
    }

    pub fn invocation(&self) -> &InvocationContext {
        &self.invocation
    }

    pub fn attach_translator(&mut self, translator: Translator) {
        self.translator = Some(translator);
    }

    pub fn translator(&self) -> SkillResult<&Translator> {
        self.translator.as_ref().ok_or(SkillError::MissingTranslator)
    }

    /// Shorthand for `translator()?.t(key)`.
    pub fn t(&self, key: &str) -> SkillResult<String> {
        self.translator()?.t(key)
    }

    pub fn t_with(&self, key: &str, params: &[(&str, &str)]) -> SkillResult<String> {
        self.translator()?.t_with(key, params)
    }

    /// Fire an interim speech directive for this turn. The returned handle may be
    /// dropped; delivery continues independently of the handler.
    pub fn send_progressive(&self, phrase: &str) -> JoinHandle<()> {
        self.progressive.send(&self.event, phrase)
    }

    pub fn response_builder(&self) -> ResponseBuilder {
        Response::builder()
    }
}

impl std::fmt::Debug for TurnContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnContext")
            .field("request_type", &self.event.request_type())
            .field("aws_request_id", &self.invocation.aws_request_id)
            .field("translator", &self.translator)
            .finish()
    }
}
