//! Error types for the skill runtime.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Result type alias for runtime operations
pub type SkillResult<T> = Result<T, SkillError>;

/// Errors that can occur while dispatching one request event
#[derive(Error, Debug)]
pub enum SkillError {
    #[error("Unknown locale: {0}")]
    UnknownLocale(String),

    #[error("Unknown translation key '{key}' for locale {locale}")]
    UnknownKey { locale: String, key: String },

    #[error("No translator attached to the dispatch context")]
    MissingTranslator,

    #[error("No handler registered for request type {request_type}")]
    Unrouted { request_type: String },

    #[error("Handler failure: {0}")]
    Handler(Failure),

    #[error("Interceptor '{name}' failed: {message}")]
    Interceptor { name: String, message: String },

    #[error("Directive delivery error: {0}")]
    Directive(String),

    #[error("Notification delivery error: {0}")]
    Notification(String),

    #[error("Invalid request event: {0}")]
    InvalidEvent(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SkillError {
    /// Source location of the underlying failure, if one was captured.
    pub fn source_location(&self) -> Option<&SourceLocation> {
        match self {
            SkillError::Handler(failure) => failure.location.as_ref(),
            _ => None,
        }
    }

    /// Short machine-friendly name of the variant, used in logs and reports.
    pub fn kind(&self) -> &'static str {
        match self {
            SkillError::UnknownLocale(_) => "UnknownLocale",
            SkillError::UnknownKey { .. } => "UnknownKey",
            SkillError::MissingTranslator => "MissingTranslator",
            SkillError::Unrouted { .. } => "Unrouted",
            SkillError::Handler(_) => "HandlerFailure",
            SkillError::Interceptor { .. } => "InterceptorFailure",
            SkillError::Directive(_) => "DirectiveDelivery",
            SkillError::Notification(_) => "NotificationDelivery",
            SkillError::InvalidEvent(_) => "InvalidEvent",
            SkillError::Config(_) => "Config",
            SkillError::Http(_) => "Http",
            SkillError::Json(_) => "Json",
        }
    }
}

/// File and line a failure was raised from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    /// File name only (no directories), e.g. `handlers.rs`.
    pub file: String,
    pub line: u32,
}

impl SourceLocation {
    #[track_caller]
    pub fn caller() -> Self {
        let loc = std::panic::Location::caller();
        Self::new(loc.file(), loc.line())
    }

    pub fn new(path: &str, line: u32) -> Self {
        let file = path
            .rsplit(|c: char| c == '/' || c == '\\')
            .next()
            .unwrap_or(path)
            .to_string();
        Self { file, line }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// A failure raised by handler code, carrying where it was raised.
///
/// Construct with [`Failure::new`] inside the handler so the
/// compiler records the call site; the fallback reads the location without any
/// trace-string parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub message: String,
    pub location: Option<SourceLocation>,
}

impl Failure {
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: Some(SourceLocation::caller()),
        }
    }

    /// Failure with no known origin (e.g. a caught panic payload).
    pub fn without_location(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(loc) => write!(f, "{} (at {})", self.message, loc),
            None => f.write_str(&self.message),
        }
    }
}

impl From<Failure> for SkillError {
    fn from(failure: Failure) -> Self {
        SkillError::Handler(failure)
    }
}
