//! Skill Test: the demo skill's turns, end to end through the dispatcher
//!
//! Run with: `cargo test --test skill_test`

use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use turnkit_core::{
    DirectiveClient, DirectiveRequest, ErrorReporter, InvocationContext, Localizer,
    NotificationChannel, NotificationConfig, ProgressiveSignal, PublishRequest,
    RequestDispatcher, RequestEvent, SeededRandom, SkillConfig, SkillResult,
};
use turnkit_skill::{build_skill_with, i18n};

struct RecordingChannel(mpsc::UnboundedSender<PublishRequest>);

#[async_trait::async_trait]
impl NotificationChannel for RecordingChannel {
    fn name(&self) -> &str {
        "recording"
    }

    async fn publish(&self, request: &PublishRequest) -> SkillResult<String> {
        let _ = self.0.send(request.clone());
        Ok("recorded".to_string())
    }
}

struct RecordingDirectives(mpsc::UnboundedSender<DirectiveRequest>);

#[async_trait::async_trait]
impl DirectiveClient for RecordingDirectives {
    async fn enqueue(&self, _endpoint: &str, _token: &str, directive: &DirectiveRequest) -> SkillResult<()> {
        let _ = self.0.send(directive.clone());
        Ok(())
    }
}

struct Skill {
    dispatcher: RequestDispatcher,
    reports: mpsc::UnboundedReceiver<PublishRequest>,
    directives: mpsc::UnboundedReceiver<DirectiveRequest>,
}

fn skill(debug_mode: bool) -> Skill {
    let config = SkillConfig {
        debug_mode,
        ..SkillConfig::default()
    };
    let (report_tx, reports) = mpsc::unbounded_channel();
    let (directive_tx, directives) = mpsc::unbounded_channel();
    let notification = NotificationConfig {
        log_group_name: "/aws/lambda/error-skill".to_string(),
        ..config.notification.clone()
    };
    let dispatcher = build_skill_with(
        &config,
        ErrorReporter::new(notification, Arc::new(RecordingChannel(report_tx))),
        Localizer::with_random(i18n::locale_table(), Arc::new(SeededRandom::new(1))),
        Some(ProgressiveSignal::new(Arc::new(RecordingDirectives(directive_tx)))),
    )
    .expect("skill builds");
    Skill {
        dispatcher,
        reports,
        directives,
    }
}

fn event(locale: &str, request: Value) -> RequestEvent {
    let mut request = request;
    request["locale"] = json!(locale);
    request["requestId"] = json!("amzn1.echo-api.request.1");
    RequestEvent::from_value(json!({
        "session": {
            "new": true,
            "sessionId": "amzn1.echo-api.session.1234",
            "user": { "userId": "amzn1.ask.account.SECRETUSER" }
        },
        "context": {
            "System": {
                "apiEndpoint": "https://api.amazonalexa.com",
                "apiAccessToken": "secret-token",
                "device": { "deviceId": "amzn1.ask.device.SECRETDEVICE" }
            }
        },
        "request": request
    }))
    .expect("valid event")
}

fn intent(locale: &str, name: &str) -> RequestEvent {
    event(locale, json!({ "type": "IntentRequest", "intent": { "name": name } }))
}

fn invocation() -> InvocationContext {
    InvocationContext::new("aws-req-1", "error-skill", "2020/10/16/[$LATEST]0123abcd")
}

async fn next_report(rx: &mut mpsc::UnboundedReceiver<PublishRequest>) -> PublishRequest {
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("report published")
        .expect("channel open")
}

const PROMPT: &str =
    "Which kind of error do you want to trigger: Time-out, invalid response, or runtime exception?";

const CONFIRMATIONS: &[&str] = &[
    "Certainly!  <break time=\"500ms\"/>",
    "As you wish!  <break time=\"500ms\"/>",
    "Alright!  <break time=\"500ms\"/>",
];

#[tokio::test]
async fn test_launch_welcomes_and_prompts() {
    let s = skill(false);
    let response = s
        .dispatcher
        .dispatch(event("en-US", json!({ "type": "LaunchRequest" })), invocation())
        .await;
    let body = serde_json::to_value(&response).unwrap();
    assert_eq!(body["outputSpeech"]["ssml"], format!("<speak>Welcome! {}</speak>", PROMPT));
    assert_eq!(body["reprompt"]["outputSpeech"]["ssml"], format!("<speak>{}</speak>", PROMPT));
    assert_eq!(body["shouldEndSession"], false);
}

#[tokio::test]
async fn test_launch_in_german() {
    let s = skill(false);
    let response = s
        .dispatcher
        .dispatch(event("de-DE", json!({ "type": "LaunchRequest" })), invocation())
        .await;
    assert!(response.spoken_content().unwrap().starts_with("<speak>Willkommen! Welche Art"));
}

#[tokio::test]
async fn test_stop_says_goodbye() {
    let s = skill(false);
    let response = s.dispatcher.dispatch(intent("es-ES", "AMAZON.StopIntent"), invocation()).await;
    assert_eq!(response.spoken_content(), Some("<speak>¡Adiós!</speak>"));
    assert_eq!(response.should_end_session, Some(true));
}

#[tokio::test(start_paused = true)]
async fn test_runtime_error_in_debug_mode() {
    let mut s = skill(true);
    let response = s.dispatcher.dispatch(intent("en-US", "RuntimeErrorIntent"), invocation()).await;

    let speech = response.spoken_content().expect("speech");
    assert!(speech.starts_with(
        "<speak><lang xml:lang=\"en-US\">fragile object has no break() <break time='200ms'/> Check handlers.rs, line "
    ));

    let directive = s.directives.try_recv().expect("progressive confirmation");
    let spoken = directive.directive.speech.trim_start_matches("<speak>").trim_end_matches("</speak>");
    assert!(CONFIRMATIONS.iter().any(|c| *c == spoken), "unexpected confirmation {spoken}");

    let report = next_report(&mut s.reports).await;
    assert_eq!(report.subject, "Skill error");
    assert!(report.message.contains("Error location: handlers.rs:"));
    assert!(report.message.contains("AWS Request ID: aws-req-1"));
    assert!(report.message.contains("amzn1.ask.account.userId"));
    for secret in ["SECRETUSER", "SECRETDEVICE", "secret-token"] {
        assert!(!report.message.contains(secret), "{secret} leaked");
    }
}

#[tokio::test(start_paused = true)]
async fn test_runtime_error_without_debug_plays_cue() {
    let mut s = skill(false);
    let response = s.dispatcher.dispatch(intent("en-US", "RuntimeErrorIntent"), invocation()).await;
    assert_eq!(
        response.spoken_content(),
        Some(format!("<speak>{}</speak>", i18n::ERROR_SOUND).as_str())
    );
    next_report(&mut s.reports).await;
}

#[tokio::test(start_paused = true)]
async fn test_invalid_response_carries_bad_markup() {
    let s = skill(false);
    let response = s.dispatcher.dispatch(intent("en-US", "InvalidResponseIntent"), invocation()).await;
    assert!(response
        .spoken_content()
        .unwrap()
        .ends_with("<break target=\"session\"/></speak>"));
}

#[tokio::test(start_paused = true)]
async fn test_timeout_overruns_after_confirming() {
    let mut s = skill(false);
    let started = tokio::time::Instant::now();
    let response = s.dispatcher.dispatch(intent("en-US", "TimeoutIntent"), invocation()).await;
    assert!(started.elapsed() >= Duration::from_millis(8000));
    let directive = s.directives.try_recv().expect("progressive confirmation");
    assert_eq!(response.spoken_content(), Some(directive.directive.speech.as_str()));
}

#[tokio::test]
async fn test_session_ended_with_error_is_reported() {
    let mut s = skill(false);
    let ended = event(
        "en-US",
        json!({
            "type": "SessionEndedRequest",
            "reason": "ERROR",
            "error": { "type": "INVALID_RESPONSE", "message": "SSML is invalid" }
        }),
    );
    let response = s.dispatcher.dispatch(ended, invocation()).await;
    assert!(response.spoken_content().is_none());

    let report = next_report(&mut s.reports).await;
    assert!(report.message.starts_with("Error type: INVALID_RESPONSE\nError message: SSML is invalid"));
    assert!(report.message.contains("Session query URL: https://console.aws.amazon.com/cloudwatch/home?region=us-east-1#logsV2:logs-insights%3FqueryDetail%3D"));
}

#[tokio::test]
async fn test_session_ended_normally_is_silent() {
    let mut s = skill(false);
    let ended = event("en-US", json!({ "type": "SessionEndedRequest", "reason": "USER_INITIATED" }));
    s.dispatcher.dispatch(ended, invocation()).await;
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert!(s.reports.try_recv().is_err());
}
