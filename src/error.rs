//! Console error types and the backend error envelope.
//!
//! [`ConsoleError`] is the central error type for the console. Every
//! failure is handled at the request that caused it: searches surface it
//! as a "querying events" alert, detail loads as a row-local "getting
//! event data" alert.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// JSON body the eventmaster API returns on non-2xx responses.
///
/// ```json
/// { "error": "bad filter" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorEnvelope {
    /// Human-readable message, shown to the user verbatim.
    pub error: String,
}

impl ErrorEnvelope {
    /// Parses a response body as an error envelope.
    ///
    /// Returns `None` when the body is not JSON or has no `error` string.
    #[must_use]
    pub fn parse(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }
}

/// Client-side error enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsoleError {
    /// Non-2xx response carrying a parseable `{ "error": ... }` body.
    #[error("{message}")]
    Backend {
        /// HTTP status returned by the backend.
        status: StatusCode,
        /// Message from the error envelope.
        message: String,
    },

    /// Non-2xx response whose body could not be parsed.
    #[error("request failed with status {status}")]
    Http {
        /// HTTP status returned by the backend.
        status: StatusCode,
    },

    /// Connection, timeout or other transport-level failure.
    #[error("request failed: {0}")]
    Transport(String),

    /// A 2xx response whose body does not match the expected JSON shape.
    #[error("malformed response: {0}")]
    Decode(String),

    /// Point lookup answered with `{"result": null}`.
    #[error("event not found: {0}")]
    EventNotFound(String),

    /// Date/time field value that cannot be turned into a unix timestamp.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Base or page URL that cannot be parsed.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// Row selection for an event id that is not in the current table.
    #[error("row not found: {0}")]
    RowNotFound(String),
}

impl ConsoleError {
    /// Builds the error for a non-2xx response from its status and body.
    ///
    /// Uses the backend's message when the body is an [`ErrorEnvelope`],
    /// a generic status message otherwise.
    #[must_use]
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        match ErrorEnvelope::parse(body) {
            Some(envelope) => Self::Backend {
                status,
                message: envelope.error,
            },
            None => Self::Http { status },
        }
    }

    /// Returns the HTTP status for errors that came from a response.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Backend { status, .. } | Self::Http { status } => Some(*status),
            _ => None,
        }
    }

    /// Text shown to the user: the backend's own message when it sent
    /// one, a generic description otherwise.
    #[must_use]
    pub fn backend_message(&self) -> String {
        match self {
            Self::Backend { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Alert text for a failed search.
    #[must_use]
    pub fn search_alert(&self) -> String {
        format!("Error querying events: {}", self.backend_message())
    }

    /// Alert text for a failed detail load.
    #[must_use]
    pub fn detail_alert(&self) -> String {
        format!("Error getting event data: {}", self.backend_message())
    }
}

impl From<reqwest::Error> for ConsoleError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_message_is_shown_verbatim() {
        let err = ConsoleError::from_response(StatusCode::BAD_REQUEST, r#"{"error":"bad filter"}"#);
        assert_eq!(err.backend_message(), "bad filter");
        assert_eq!(err.search_alert(), "Error querying events: bad filter");
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn plain_text_body_falls_back_to_generic_message() {
        let err = ConsoleError::from_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Error executing query: boom",
        );
        assert!(matches!(err, ConsoleError::Http { .. }));
        assert_eq!(
            err.detail_alert(),
            "Error getting event data: request failed with status 500 Internal Server Error"
        );
    }

    #[test]
    fn envelope_without_error_field_is_rejected() {
        assert!(ErrorEnvelope::parse(r#"{"message":"nope"}"#).is_none());
        assert!(ErrorEnvelope::parse("").is_none());
    }

    #[test]
    fn non_response_errors_have_no_status() {
        assert_eq!(ConsoleError::Transport("refused".into()).status(), None);
    }
}
