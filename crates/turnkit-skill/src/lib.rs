//! Turnkit demo skill: triggers each kind of skill failure on request so the
//! diagnostic pipeline (fallback speech, redacted reports, log deep links) can be
//! exercised end to end.

pub mod handlers;
pub mod i18n;

use std::sync::Arc;
use turnkit_core::{
    ErrorReporter, FallbackHandler, LocalizationInterceptor, Localizer, ProgressiveSignal,
    RequestDispatcher, RequestLoggingInterceptor, ResponseLoggingInterceptor, SkillConfig,
    SkillResult,
};

/// Wire the skill from configuration: webhook or log reports, HTTP progressive directives.
pub fn build_skill(config: &SkillConfig) -> SkillResult<RequestDispatcher> {
    let reporter = ErrorReporter::from_config(config.notification.clone())?;
    build_skill_with(config, reporter, Localizer::new(i18n::locale_table()), None)
}

/// Wire the skill with explicit collaborators. `progressive: None` uses HTTP delivery.
pub fn build_skill_with(
    config: &SkillConfig,
    reporter: ErrorReporter,
    localizer: Localizer,
    progressive: Option<ProgressiveSignal>,
) -> SkillResult<RequestDispatcher> {
    let reporter = Arc::new(reporter);
    let mut builder = RequestDispatcher::builder(FallbackHandler::new(
        config.debug_mode,
        Arc::clone(&reporter),
    ))
    .request_interceptor(RequestLoggingInterceptor::new(config.verbosity))
    .request_interceptor(LocalizationInterceptor::new(localizer))
    .response_interceptor(ResponseLoggingInterceptor::new(config.verbosity))
    .handlers(handlers::all(reporter));
    if let Some(progressive) = progressive {
        builder = builder.progressive(progressive);
    }
    tracing::info!(
        "[SYSTEM] Building skill (debug_mode={}, verbosity={})",
        config.debug_mode,
        config.verbosity.as_str()
    );
    builder.build()
}
