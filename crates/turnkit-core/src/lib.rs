//! # Turnkit - Voice Skill Runtime
//!
//! Turns one inbound voice-platform event into one response, and turns every failure
//! along the way into an operator-facing diagnostic report.
//!
//! ## Architecture
//!
//! ```text
//! event ─→ request interceptors ─→ handler registry ─→ handler ─→ response interceptors ─→ response
//!          (logging, locale)        (first match)       │                 │
//!                                        │ none         │ error/panic     │ error
//!                                        └──────────────┴─────────────────┴─→ fallback ─→ report (spawned)
//! ```

pub mod config;
pub mod context;
pub mod dispatcher;
pub mod envelope;
pub mod error;
pub mod fallback;
pub mod i18n;
pub mod interceptors;
pub mod progressive;
pub mod registry;
pub mod reporter;

pub use config::{NotificationConfig, SkillConfig, Verbosity};
pub use context::TurnContext;
pub use dispatcher::{DispatcherBuilder, RequestDispatcher};
pub use envelope::{
    InvocationContext, RequestEvent, Response, ResponseBuilder, ResponseEnvelope,
    INTENT_REQUEST, LAUNCH_REQUEST, SESSION_ENDED_REQUEST,
};
pub use error::{Failure, SkillError, SkillResult, SourceLocation};
pub use fallback::FallbackHandler;
pub use i18n::{LocaleTable, Localizer, RandomSource, SeededRandom, Translator};
pub use interceptors::{
    InterceptorChain, LocalizationInterceptor, RequestInterceptor, RequestLoggingInterceptor,
    ResponseInterceptor, ResponseLoggingInterceptor,
};
pub use progressive::{DirectiveClient, DirectiveRequest, HttpDirectiveClient, ProgressiveSignal};
pub use registry::{any_intent, intent, request_type, HandlerDescriptor, HandlerRegistry};
pub use reporter::channel::{LogChannel, NotificationChannel, PublishRequest, WebhookChannel};
pub use reporter::{DiagnosticReport, ErrorReporter, FailureSummary};
