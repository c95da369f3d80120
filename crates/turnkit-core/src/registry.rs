//! Ordered handler registry.
//!
//! Handlers are checked in registration order and the first whose predicate accepts the
//! event wins. Predicates are pure; the action receives its own copy of the context.

use crate::context::TurnContext;
use crate::envelope::{RequestEvent, Response, INTENT_REQUEST};
use crate::error::SkillResult;
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;

pub type Predicate = Arc<dyn Fn(&RequestEvent) -> bool + Send + Sync>;
pub type Action = Arc<dyn Fn(TurnContext) -> BoxFuture<'static, SkillResult<Response>> + Send + Sync>;

#[derive(Clone)]
pub struct HandlerDescriptor {
    name: String,
    predicate: Predicate,
    action: Action,
}

impl HandlerDescriptor {
    pub fn new<P, A, Fut>(name: impl Into<String>, predicate: P, action: A) -> Self
    where
        P: Fn(&RequestEvent) -> bool + Send + Sync + 'static,
        A: Fn(TurnContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = SkillResult<Response>> + Send + 'static,
    {
        Self {
            name: name.into(),
            predicate: Arc::new(predicate),
            action: Arc::new(
                move |ctx: TurnContext| -> BoxFuture<'static, SkillResult<Response>> {
                    Box::pin(action(ctx))
                },
            ),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn can_handle(&self, event: &RequestEvent) -> bool {
        (self.predicate)(event)
    }

    pub fn handle(&self, ctx: TurnContext) -> BoxFuture<'static, SkillResult<Response>> {
        (self.action)(ctx)
    }
}

impl std::fmt::Debug for HandlerDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerDescriptor").field("name", &self.name).finish()
    }
}

/// Result of routing one event.
#[derive(Debug)]
pub enum Selection<'a> {
    Handler(&'a HandlerDescriptor),
    /// Nothing matched; the fallback takes the event.
    Fallback,
}

#[derive(Debug, Clone, Default)]
pub struct HandlerRegistry {
    handlers: Vec<HandlerDescriptor>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, handler: HandlerDescriptor) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn select(&self, event: &RequestEvent) -> Selection<'_> {
        self.handlers
            .iter()
            .find(|h| h.can_handle(event))
            .map(Selection::Handler)
            .unwrap_or(Selection::Fallback)
    }

    pub fn names(&self) -> Vec<&str> {
        self.handlers.iter().map(HandlerDescriptor::name).collect()
    }
}

/// Matches events of the given request type.
pub fn request_type(expected: &'static str) -> impl Fn(&RequestEvent) -> bool + Send + Sync {
    move |event: &RequestEvent| event.request_type() == expected
}

/// Matches intent requests for the given intent.
pub fn intent(name: &'static str) -> impl Fn(&RequestEvent) -> bool + Send + Sync {
    move |event: &RequestEvent| event.request_type() == INTENT_REQUEST && event.intent_name() == Some(name)
}

/// Matches intent requests for any of the given intents.
pub fn any_intent(names: &'static [&'static str]) -> impl Fn(&RequestEvent) -> bool + Send + Sync {
    move |event: &RequestEvent| {
        event.request_type() == INTENT_REQUEST
            && event
                .intent_name()
                .map_or(false, |n| names.iter().any(|candidate| *candidate == n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::LAUNCH_REQUEST;
    use serde_json::json;

    fn descriptor(name: &'static str, predicate: impl Fn(&RequestEvent) -> bool + Send + Sync + 'static) -> HandlerDescriptor {
        HandlerDescriptor::new(name, predicate, |_ctx| async { Ok(Response::default()) })
    }

    fn intent_event(name: &str) -> RequestEvent {
        RequestEvent::from_value(json!({
            "request": { "type": "IntentRequest", "intent": { "name": name } }
        }))
        .unwrap()
    }

    fn selected(registry: &HandlerRegistry, event: &RequestEvent) -> Option<String> {
        match registry.select(event) {
            Selection::Handler(h) => Some(h.name().to_string()),
            Selection::Fallback => None,
        }
    }

    #[test]
    fn first_matching_handler_wins() {
        let registry = HandlerRegistry::new()
            .register(descriptor("launch", request_type(LAUNCH_REQUEST)))
            .register(descriptor("timeout-a", intent("TimeoutIntent")))
            .register(descriptor("timeout-b", intent("TimeoutIntent")))
            .register(descriptor("stop", any_intent(&["AMAZON.CancelIntent", "AMAZON.StopIntent"])));

        assert_eq!(selected(&registry, &intent_event("TimeoutIntent")).as_deref(), Some("timeout-a"));
        assert_eq!(selected(&registry, &intent_event("AMAZON.StopIntent")).as_deref(), Some("stop"));
        assert_eq!(registry.names(), vec!["launch", "timeout-a", "timeout-b", "stop"]);
    }

    #[test]
    fn unmatched_event_selects_fallback() {
        let registry = HandlerRegistry::new().register(descriptor("launch", request_type(LAUNCH_REQUEST)));
        assert!(selected(&registry, &intent_event("Unknown")).is_none());
        assert!(selected(&HandlerRegistry::new(), &intent_event("Unknown")).is_none());
    }
}
