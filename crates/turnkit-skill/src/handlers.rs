//! The demo skill's handlers, in routing order.
//!
//! Three intents fail on purpose so operators can see each kind of diagnostic:
//! a response that arrives too late, a response the platform rejects, and a handler
//! failure. Each sends a progressive confirmation first so the caller hears the
//! failure is intended.

use std::sync::Arc;
use std::time::Duration;
use turnkit_core::{
    any_intent, intent, request_type, ErrorReporter, Failure, FailureSummary,
    HandlerDescriptor, Response, SkillResult, TurnContext, LAUNCH_REQUEST,
    SESSION_ENDED_REQUEST,
};

/// Long enough for the platform to give up on the response.
pub const TIMEOUT_DELAY: Duration = Duration::from_millis(8000);

/// Lets the progressive confirmation land before the failing response.
pub const SIGNAL_LEAD: Duration = Duration::from_millis(1000);

/// Not valid in a response; the platform rejects it.
pub const INVALID_SSML: &str = "<break target=\"session\"/>";

pub const TIMEOUT_INTENT: &str = "TimeoutIntent";
pub const INVALID_RESPONSE_INTENT: &str = "InvalidResponseIntent";
pub const RUNTIME_ERROR_INTENT: &str = "RuntimeErrorIntent";
pub const HELP_INTENT: &str = "AMAZON.HelpIntent";
pub const FALLBACK_INTENT: &str = "AMAZON.FallbackIntent";
pub const STOP_INTENTS: &[&str] = &["AMAZON.CancelIntent", "AMAZON.StopIntent"];

const SESSION_ENDED_WITH_ERROR: &str = "ERROR";

pub fn all(reporter: Arc<ErrorReporter>) -> Vec<HandlerDescriptor> {
    vec![
        HandlerDescriptor::new("LaunchRequest", request_type(LAUNCH_REQUEST), launch),
        HandlerDescriptor::new("InvalidResponseIntent", intent(INVALID_RESPONSE_INTENT), invalid_response),
        HandlerDescriptor::new("TimeoutIntent", intent(TIMEOUT_INTENT), timeout),
        HandlerDescriptor::new("RuntimeErrorIntent", intent(RUNTIME_ERROR_INTENT), runtime_error),
        HandlerDescriptor::new("HelpIntent", intent(HELP_INTENT), help),
        HandlerDescriptor::new("FallbackIntent", intent(FALLBACK_INTENT), fallback_intent),
        HandlerDescriptor::new("CancelAndStopIntent", any_intent(STOP_INTENTS), cancel_and_stop),
        HandlerDescriptor::new(
            "SessionEndedRequest",
            request_type(SESSION_ENDED_REQUEST),
            move |ctx: TurnContext| session_ended(ctx, Arc::clone(&reporter)),
        ),
    ]
}

/// "<lead> <prompt>", reprompting with the prompt.
fn prompt_after(ctx: &TurnContext, lead_key: &str) -> SkillResult<Response> {
    let prompt = ctx.t("error-prompt")?;
    let lead = ctx.t(lead_key)?;
    Ok(ctx
        .response_builder()
        .speak(format!("{} {}", lead, prompt))
        .reprompt(prompt)
        .build())
}

async fn launch(ctx: TurnContext) -> SkillResult<Response> {
    prompt_after(&ctx, "welcome")
}

async fn help(ctx: TurnContext) -> SkillResult<Response> {
    prompt_after(&ctx, "error-help")
}

async fn fallback_intent(ctx: TurnContext) -> SkillResult<Response> {
    prompt_after(&ctx, "error-reject")
}

async fn cancel_and_stop(ctx: TurnContext) -> SkillResult<Response> {
    Ok(ctx
        .response_builder()
        .speak(ctx.t("goodbye-default")?)
        .with_should_end_session(true)
        .build())
}

/// Confirm out loud, then wait. Returns the confirmation phrase.
async fn confirm_then_wait(ctx: &TurnContext, delay: Duration) -> SkillResult<String> {
    let confirmation = ctx.t("error-confirm")?;
    ctx.send_progressive(&confirmation);
    tokio::time::sleep(delay).await;
    Ok(confirmation)
}

async fn timeout(ctx: TurnContext) -> SkillResult<Response> {
    let confirmation = confirm_then_wait(&ctx, TIMEOUT_DELAY).await?;
    // Too late: the platform has already given up on this turn.
    Ok(ctx.response_builder().speak(confirmation).build())
}

async fn invalid_response(ctx: TurnContext) -> SkillResult<Response> {
    let confirmation = confirm_then_wait(&ctx, SIGNAL_LEAD).await?;
    Ok(ctx
        .response_builder()
        .speak(format!("{} {}", confirmation, INVALID_SSML))
        .build())
}

async fn runtime_error(ctx: TurnContext) -> SkillResult<Response> {
    confirm_then_wait(&ctx, SIGNAL_LEAD).await?;
    Err(Failure::new("fragile object has no break()").into())
}

/// Some failures only surface on the next event, as a session that ended in error.
/// That event is reported here; the cause is in the logs of the preceding turn.
async fn session_ended(ctx: TurnContext, reporter: Arc<ErrorReporter>) -> SkillResult<Response> {
    if ctx.event().end_reason() == Some(SESSION_ENDED_WITH_ERROR) {
        let error = ctx.event().platform_error();
        let error_type = error.and_then(|e| e.error_type.as_deref()).unwrap_or("unknown");
        let message = error.and_then(|e| e.message.as_deref()).unwrap_or("unknown");
        tracing::warn!("[DISPATCH] Session ended with platform error {}: {}", error_type, message);
        reporter.report(
            ctx.event(),
            ctx.invocation(),
            &FailureSummary::platform_error(error_type, message),
        );
    }
    Ok(Response::default())
}
