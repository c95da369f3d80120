//! Structural redaction of caller identifiers and credentials.
//!
//! Walks the event JSON and rewrites values by key, at any depth. Identifiers keep
//! their platform prefix (`amzn1.ask.account.`) so a reader can still tell what kind
//! of id was there; credentials are replaced wholesale. Applying it twice is a no-op.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

/// Replacement for any credential-bearing field.
pub const TOKEN_PLACEHOLDER: &str = "placeholderToken";

/// Identifier keys and the placeholder that replaces the id part of their value.
const IDENTIFIER_KEYS: &[(&str, &str)] = &[
    ("userId", "userId"),
    ("deviceId", "deviceId"),
    ("personId", "personId"),
];

const TOKEN_KEYS: &[&str] = &["apiAccessToken", "accessToken", "consentToken"];

static PLATFORM_ID_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(amzn\d+\.ask\.[A-Za-z]+)\.").expect("platform id prefix pattern is valid")
});

/// An event body with identifiers and credentials removed. Only [`redact`] builds one,
/// so anything typed `RedactedEvent` is safe to hand to a notification channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RedactedEvent(Value);

impl RedactedEvent {
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| self.0.to_string())
    }
}

pub fn redact(event: &Value) -> RedactedEvent {
    let mut copy = event.clone();
    scrub(&mut copy);
    RedactedEvent(copy)
}

fn scrub(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, field) in map.iter_mut() {
                if TOKEN_KEYS.iter().any(|k| *k == key.as_str()) {
                    if !field.is_null() {
                        *field = Value::String(TOKEN_PLACEHOLDER.to_string());
                    }
                } else if let Some((_, placeholder)) =
                    IDENTIFIER_KEYS.iter().find(|(k, _)| *k == key.as_str())
                {
                    if !field.is_null() {
                        *field = Value::String(identifier_placeholder(field, placeholder));
                    }
                } else {
                    scrub(field);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(scrub),
        _ => {}
    }
}

fn identifier_placeholder(field: &Value, placeholder: &str) -> String {
    let prefix = field
        .as_str()
        .and_then(|s| PLATFORM_ID_PREFIX.captures(s))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str());
    match prefix {
        Some(prefix) => format!("{}.{}", prefix, placeholder),
        None => placeholder.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event() -> Value {
        json!({
            "session": {
                "sessionId": "amzn1.echo-api.session.1234",
                "user": {
                    "userId": "amzn1.ask.account.AGR4X7SECRET",
                    "accessToken": "linked-account-token"
                }
            },
            "context": {
                "System": {
                    "user": {
                        "userId": "amzn1.ask.account.AGR4X7SECRET",
                        "permissions": { "consentToken": "consent-secret" }
                    },
                    "device": { "deviceId": "amzn1.ask.device.DEV998SECRET" },
                    "person": { "personId": "amzn1.ask.person.P1SECRET" },
                    "apiAccessToken": "eyJhbGciOiJSUzI1NiJ9.secret",
                    "apiEndpoint": "https://api.amazonalexa.com"
                }
            },
            "request": { "type": "LaunchRequest" }
        })
    }

    #[test]
    fn removes_every_identifier_and_token() {
        let redacted = redact(&event());
        let text = redacted.as_value().to_string();
        for secret in [
            "AGR4X7SECRET",
            "DEV998SECRET",
            "P1SECRET",
            "linked-account-token",
            "consent-secret",
            "eyJhbGciOiJSUzI1NiJ9",
        ] {
            assert!(!text.contains(secret), "{secret} leaked: {text}");
        }
        let v = redacted.as_value();
        assert_eq!(v["session"]["user"]["userId"], "amzn1.ask.account.userId");
        assert_eq!(v["context"]["System"]["device"]["deviceId"], "amzn1.ask.device.deviceId");
        assert_eq!(v["context"]["System"]["apiAccessToken"], TOKEN_PLACEHOLDER);
    }

    #[test]
    fn leaves_everything_else_untouched() {
        let redacted = redact(&event());
        let v = redacted.as_value();
        assert_eq!(v["session"]["sessionId"], "amzn1.echo-api.session.1234");
        assert_eq!(v["context"]["System"]["apiEndpoint"], "https://api.amazonalexa.com");
        assert_eq!(v["request"]["type"], "LaunchRequest");
    }

    #[test]
    fn is_idempotent() {
        let once = redact(&event());
        let twice = redact(once.as_value());
        assert_eq!(once, twice);
    }

    #[test]
    fn unprefixed_ids_become_bare_placeholders() {
        let v = redact(&json!({ "userId": "local-user", "items": [{ "deviceId": 42 }] }));
        assert_eq!(v.as_value()["userId"], "userId");
        assert_eq!(v.as_value()["items"][0]["deviceId"], "deviceId");
    }
}
