//! Skill configuration loaded from the environment.
//!
//! Everything the dispatch and diagnostic pipeline needs to know about its deployment:
//! debug speech, the operator notification channel, and the log group that deep links
//! point into.

/// How much the logging interceptors write. Chosen once at startup and handed to the
/// components that log; nothing swaps a global print function at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Only warnings and errors; request/response bodies are not logged.
    Silent,
    #[default]
    Verbose,
}

impl Verbosity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verbosity::Silent => "silent",
            Verbosity::Verbose => "verbose",
        }
    }

    /// Anything other than `silent` (case-insensitive) is verbose.
    pub fn parse(s: &str) -> Self {
        match s.trim().eq_ignore_ascii_case("silent") {
            true => Verbosity::Silent,
            false => Verbosity::Verbose,
        }
    }

    /// Default `tracing` filter directive when `RUST_LOG` is not set.
    pub fn filter_directive(&self) -> &'static str {
        match self {
            Verbosity::Silent => "warn",
            Verbosity::Verbose => "info",
        }
    }

    pub fn is_verbose(&self) -> bool {
        matches!(self, Verbosity::Verbose)
    }
}

/// Where diagnostic reports go and how deep links are scoped.
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    /// NOTIFICATION_ARN: channel target (topic identifier) of diagnostic reports.
    pub channel_target: String,
    /// NOTIFICATION_SUBJECT: subject line of every report.
    pub subject: String,
    /// NOTIFICATION_WEBHOOK_URL: HTTP endpoint reports are POSTed to. Unset => log only.
    pub webhook_url: Option<String>,
    /// LOG_GROUP_REGION: region the log console links open in.
    pub log_group_region: String,
    /// LOG_GROUP_NAME: log group of the stream link.
    pub log_group_name: String,
}

/// Skill configuration loaded from environment.
///
/// | Env | Default | Description |
/// |-----|---------|-------------|
/// | DEBUG_MODE | false | Speak the failure message and location in fallback responses. |
/// | NOTIFICATION_ARN | "" | Channel target for diagnostic reports. |
/// | NOTIFICATION_SUBJECT | Skill error | Report subject line. |
/// | NOTIFICATION_WEBHOOK_URL | unset | POST reports here; otherwise they are only logged. |
/// | LOG_GROUP_REGION | us-east-1 | Region used in deep links. |
/// | LOG_GROUP_NAME | /aws/lambda/{FUNCTION_NAME} | Log group used in the stream deep link. |
/// | FUNCTION_NAME | turnkit-skill | Function name when the event does not carry one. |
/// | LOG_STREAM_NAME | local | Log stream when the event does not carry one. |
/// | SKILL_LOG_VERBOSITY | verbose | "silent" \| "verbose". |
#[derive(Debug, Clone)]
pub struct SkillConfig {
    pub debug_mode: bool,
    pub notification: NotificationConfig,
    pub function_name: String,
    pub log_stream_name: String,
    pub verbosity: Verbosity,
}

const DEFAULT_FUNCTION_NAME: &str = "turnkit-skill";

impl SkillConfig {
    /// Load from environment. Unset or blank values fall back to the defaults above.
    pub fn from_env() -> Self {
        let function_name =
            env_opt_string("FUNCTION_NAME").unwrap_or_else(|| DEFAULT_FUNCTION_NAME.to_string());
        let log_group_name = env_opt_string("LOG_GROUP_NAME")
            .unwrap_or_else(|| format!("/aws/lambda/{}", function_name));
        Self {
            debug_mode: env_bool("DEBUG_MODE", false),
            notification: NotificationConfig {
                channel_target: env_opt_string("NOTIFICATION_ARN").unwrap_or_default(),
                subject: env_opt_string("NOTIFICATION_SUBJECT")
                    .unwrap_or_else(|| "Skill error".to_string()),
                webhook_url: env_opt_string("NOTIFICATION_WEBHOOK_URL"),
                log_group_region: env_opt_string("LOG_GROUP_REGION")
                    .unwrap_or_else(|| "us-east-1".to_string()),
                log_group_name,
            },
            function_name,
            log_stream_name: env_opt_string("LOG_STREAM_NAME")
                .unwrap_or_else(|| "local".to_string()),
            verbosity: env_opt_string("SKILL_LOG_VERBOSITY")
                .map(|v| Verbosity::parse(&v))
                .unwrap_or_default(),
        }
    }
}

impl Default for SkillConfig {
    fn default() -> Self {
        Self {
            debug_mode: false,
            notification: NotificationConfig {
                channel_target: String::new(),
                subject: "Skill error".to_string(),
                webhook_url: None,
                log_group_region: "us-east-1".to_string(),
                log_group_name: format!("/aws/lambda/{}", DEFAULT_FUNCTION_NAME),
            },
            function_name: DEFAULT_FUNCTION_NAME.to_string(),
            log_stream_name: "local".to_string(),
            verbosity: Verbosity::Verbose,
        }
    }
}

/// `true` only for the literal "true" (any case, surrounding whitespace ignored).
fn env_bool(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(v) if v.trim().is_empty() => default,
        Ok(v) => v.trim().eq_ignore_ascii_case("true"),
        Err(_) => default,
    }
}

fn env_opt_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
