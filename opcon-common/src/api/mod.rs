//! API envelope and wire types shared by the service and the console
//!
//! Every response is a JSON object carrying `"ok"`. Successful responses
//! flatten their body next to it (`{"ok": true, "sessionId": 4}`); failures
//! carry a human-readable message (`{"ok": false, "error": "..."}`) that the
//! console shows to the operator as-is.

pub mod types;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Message used when a failure envelope carries no text
pub const GENERIC_API_ERROR: &str = "API error";

/// Success envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub ok: bool,
    #[serde(flatten)]
    pub body: T,
}

impl<T> Envelope<T> {
    pub fn ok(body: T) -> Self {
        Self { ok: true, body }
    }
}

/// Failure envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub ok: bool,
    pub error: String,
}

impl ErrorEnvelope {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: error.into(),
        }
    }
}

/// Why an envelope could not be opened
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// The service answered `ok: false`
    #[error("{0}")]
    Failure(String),

    /// The service answered `ok: true` with a body of the wrong shape
    #[error("Malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Unwrap a response envelope into its body.
///
/// A missing `ok` field counts as success, matching services that only flag
/// failures. The `ok` key itself is ignored while decoding the body.
pub fn open_envelope<T: DeserializeOwned>(value: Value) -> Result<T, EnvelopeError> {
    if value.get("ok").and_then(Value::as_bool) == Some(false) {
        let message = value
            .get("error")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .unwrap_or(GENERIC_API_ERROR);
        return Err(EnvelopeError::Failure(message.to_string()));
    }
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::types::StartSessionResponse;
    use super::*;
    use crate::models::SessionId;
    use serde_json::json;

    #[test]
    fn test_success_envelope_flattens_body() {
        let envelope = Envelope::ok(StartSessionResponse {
            session_id: SessionId(5),
        });
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value, json!({ "ok": true, "sessionId": 5 }));
    }

    #[test]
    fn test_open_envelope_success() {
        let body: StartSessionResponse =
            open_envelope(json!({ "ok": true, "sessionId": 11 })).unwrap();
        assert_eq!(body.session_id, SessionId(11));
    }

    #[test]
    fn test_open_envelope_failure_keeps_message() {
        let err = open_envelope::<StartSessionResponse>(json!({
            "ok": false,
            "error": "operatorId and mediaItemId are required."
        }))
        .unwrap_err();
        assert_eq!(err.to_string(), "operatorId and mediaItemId are required.");
    }

    #[test]
    fn test_open_envelope_failure_without_message() {
        let err = open_envelope::<StartSessionResponse>(json!({ "ok": false })).unwrap_err();
        assert_eq!(err.to_string(), GENERIC_API_ERROR);
    }

    #[test]
    fn test_open_envelope_malformed_body() {
        let err = open_envelope::<StartSessionResponse>(json!({ "ok": true })).unwrap_err();
        assert!(matches!(err, EnvelopeError::Malformed(_)));
    }
}
