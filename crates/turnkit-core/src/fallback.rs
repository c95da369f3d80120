//! Catch-all for failed or unrouted dispatches.
//!
//! Always produces a response and always files a diagnostic report. In debug mode, a
//! failure with a known origin is spoken back (message, file, line) in English.

use crate::context::TurnContext;
use crate::envelope::Response;
use crate::error::SkillError;
use crate::reporter::{ErrorReporter, FailureSummary};
use std::sync::Arc;

/// Translation key of the non-verbal error cue.
pub const ERROR_SOUND_KEY: &str = "error-sound";

/// Spoken when no translator is available for the cue.
pub const DEFAULT_ERROR_SOUND: &str =
    "<audio src=\"soundbank://soundlibrary/ui/gameshow/amzn_ui_sfx_gameshow_negative_response_01\"/>";

#[derive(Debug, Clone)]
pub struct FallbackHandler {
    debug_mode: bool,
    reporter: Arc<ErrorReporter>,
}

impl FallbackHandler {
    pub fn new(debug_mode: bool, reporter: Arc<ErrorReporter>) -> Self {
        Self {
            debug_mode,
            reporter,
        }
    }

    pub fn handle(&self, ctx: &TurnContext, error: &SkillError) -> Response {
        tracing::error!("[DISPATCH] Error handled: {}", error);

        let speech = match (self.debug_mode, error.source_location()) {
            (true, Some(location)) => debug_speech(failure_message(error), &location.file, location.line),
            _ => ctx.t(ERROR_SOUND_KEY).unwrap_or_else(|e| {
                tracing::warn!("[DISPATCH] Error cue unavailable ({}); using default", e);
                DEFAULT_ERROR_SOUND.to_string()
            }),
        };

        self.reporter
            .report(ctx.event(), ctx.invocation(), &FailureSummary::from_error(error));

        Response::builder().speak(speech).build()
    }
}

fn failure_message(error: &SkillError) -> String {
    match error {
        SkillError::Handler(failure) => failure.message.clone(),
        other => other.to_string(),
    }
}

/// Failure messages are English, so the speech is wrapped in an en-US language tag.
pub fn debug_speech(message: String, file: &str, line: u32) -> String {
    format!(
        "<lang xml:lang=\"en-US\">{} <break time='200ms'/> Check {}, line {}</lang>",
        escape_ssml(&message),
        escape_ssml(file),
        line
    )
}

fn escape_ssml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
