//! Request dispatch: interceptors, routing, handler, fallback.
//!
//! Every inbound event produces exactly one response. Anything that goes wrong on the
//! way (an interceptor error, no matching handler, a handler error or panic) is routed
//! to the [`FallbackHandler`], which answers and files one diagnostic report. Panics
//! anywhere in the turn (interceptors included) are caught here and become failures
//! without a source location.
//!
//! A response interceptor that fails after a successful handler also routes to the
//! fallback. Response interceptors then run once more over the fallback response; any
//! failure there is logged and the fallback response is returned regardless.

use crate::context::TurnContext;
use crate::envelope::{InvocationContext, RequestEvent, Response};
use crate::error::{Failure, SkillError, SkillResult};
use crate::fallback::FallbackHandler;
use crate::interceptors::{InterceptorChain, RequestInterceptor, ResponseInterceptor};
use crate::progressive::{HttpDirectiveClient, ProgressiveSignal};
use crate::registry::{HandlerDescriptor, HandlerRegistry, Selection};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

pub struct RequestDispatcher {
    interceptors: InterceptorChain,
    registry: HandlerRegistry,
    fallback: FallbackHandler,
    progressive: ProgressiveSignal,
}

impl RequestDispatcher {
    pub fn builder(fallback: FallbackHandler) -> DispatcherBuilder {
        DispatcherBuilder {
            interceptors: InterceptorChain::new(),
            registry: HandlerRegistry::new(),
            fallback,
            progressive: None,
        }
    }

    /// Dispatch one event. Never fails; errors become the fallback response.
    pub async fn dispatch(&self, event: RequestEvent, invocation: InvocationContext) -> Response {
        let mut ctx = TurnContext::new(event, invocation, self.progressive.clone());
        let outcome = AssertUnwindSafe(self.run(&mut ctx))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(SkillError::Handler(panic_failure("dispatch", payload))));
        match outcome {
            Ok(response) => response,
            Err(error) => {
                let response = self.fallback.handle(&ctx, &error);
                let post = std::panic::catch_unwind(AssertUnwindSafe(|| {
                    self.interceptors.run_response(&ctx, &response)
                }));
                match post {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => tracing::warn!(
                        "[DISPATCH] Response interceptor failed on fallback response: {}",
                        e
                    ),
                    Err(_) => tracing::warn!(
                        "[DISPATCH] Response interceptor panicked on fallback response"
                    ),
                }
                response
            }
        }
    }

    async fn run(&self, ctx: &mut TurnContext) -> SkillResult<Response> {
        self.interceptors.run_request(ctx)?;

        let handler = match self.registry.select(ctx.event()) {
            Selection::Handler(handler) => handler,
            Selection::Fallback => {
                return Err(SkillError::Unrouted {
                    request_type: ctx.event().request_type().to_string(),
                })
            }
        };
        tracing::info!(
            "[DISPATCH] {} routed to {}",
            describe(ctx.event()),
            handler.name()
        );

        // The action is called inside the caught future so a panic before its first
        // await is attributed to the handler as well.
        let turn = ctx.clone();
        let response = AssertUnwindSafe(async move { handler.handle(turn).await })
            .catch_unwind()
            .await
            .map_err(|payload| {
                let origin = format!("handler '{}'", handler.name());
                SkillError::Handler(panic_failure(&origin, payload))
            })??;

        self.interceptors.run_response(ctx, &response)?;
        Ok(response)
    }
}

impl std::fmt::Debug for RequestDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestDispatcher")
            .field("handlers", &self.registry.names())
            .field("fallback", &self.fallback)
            .finish()
    }
}

fn describe(event: &RequestEvent) -> String {
    match event.intent_name() {
        Some(intent) => format!("{} ({})", event.request_type(), intent),
        None => event.request_type().to_string(),
    }
}

fn panic_failure(origin: &str, payload: Box<dyn Any + Send>) -> Failure {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string());
    Failure::without_location(format!("{} panicked: {}", origin, message))
}

pub struct DispatcherBuilder {
    interceptors: InterceptorChain,
    registry: HandlerRegistry,
    fallback: FallbackHandler,
    progressive: Option<ProgressiveSignal>,
}

impl DispatcherBuilder {
    pub fn handler(mut self, handler: HandlerDescriptor) -> Self {
        self.registry = self.registry.register(handler);
        self
    }

    pub fn handlers(self, handlers: impl IntoIterator<Item = HandlerDescriptor>) -> Self {
        handlers.into_iter().fold(self, DispatcherBuilder::handler)
    }

    pub fn request_interceptor(mut self, interceptor: impl RequestInterceptor + 'static) -> Self {
        self.interceptors = self.interceptors.with_request(interceptor);
        self
    }

    pub fn response_interceptor(mut self, interceptor: impl ResponseInterceptor + 'static) -> Self {
        self.interceptors = self.interceptors.with_response(interceptor);
        self
    }

    pub fn progressive(mut self, progressive: ProgressiveSignal) -> Self {
        self.progressive = Some(progressive);
        self
    }

    /// Without an explicit signal, directives go out over HTTP.
    pub fn build(self) -> SkillResult<RequestDispatcher> {
        let progressive = match self.progressive {
            Some(p) => p,
            None => ProgressiveSignal::new(Arc::new(HttpDirectiveClient::new()?)),
        };
        let (pre, post) = self.interceptors.names();
        tracing::info!(
            "[SYSTEM] Dispatcher ready: handlers={:?} request_interceptors={:?} response_interceptors={:?}",
            self.registry.names(),
            pre,
            post
        );
        Ok(RequestDispatcher {
            interceptors: self.interceptors,
            registry: self.registry,
            fallback: self.fallback,
            progressive,
        })
    }
}
