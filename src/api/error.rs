//! Unified client error handling for campus.
//!
//! Every failure a dashboard action can hit (transport, backend rejection,
//! client-side guards) is a [`ClientError`]. Views never branch on the variant;
//! they show [`ClientError::user_message`] and leave state as it was.

use serde::Deserialize;
use thiserror::Error;

/// Result alias used across the library.
pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced an HTTP response.
    #[error("Failed to reach server: {0}")]
    Transport(String),

    /// The backend answered with a non-2xx status.
    #[error("Server returned error {status}: {message}")]
    Rejected { status: u16, message: String },

    /// The response body did not match the expected record shape.
    #[error("Failed to parse response for {path}: {reason}")]
    Decode { path: String, reason: String },

    /// Required input fields were empty; nothing was sent.
    #[error("Missing required fields: {}", fields.join(", "))]
    Validation { fields: Vec<String> },

    /// The record is not in the latest snapshot.
    #[error("{what} {id} not found")]
    NotFound { what: &'static str, id: i64 },

    #[error("Only the creator of this notification can change it")]
    NotOwner,

    #[error("Attendance already marked for student {0}")]
    AlreadyMarked(i64),

    #[error("Not logged in")]
    Unauthenticated,

    #[error("This action requires the {expected} role (current role: {actual})")]
    WrongRole { expected: String, actual: String },

    /// The owning controller was closed while the request was in flight.
    #[error("Request cancelled")]
    Cancelled,

    #[error("Session storage error: {0}")]
    Storage(String),
}

impl ClientError {
    /// Collapse any failure into the single line shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Transport(_) => {
                "Could not reach the campus server. Check your connection.".to_string()
            }
            ClientError::Rejected { message, .. } if !message.is_empty() => message.clone(),
            ClientError::Rejected { status, .. } => format!("Request failed ({})", status),
            ClientError::Decode { .. } => "Unexpected response from server".to_string(),
            other => other.to_string(),
        }
    }

    /// True for a 401/403 answer, which means the persisted token is no longer valid.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self, ClientError::Rejected { status, .. } if *status == 401 || *status == 403)
    }

    pub(crate) fn decode(path: &str, err: impl std::fmt::Display) -> Self {
        ClientError::Decode {
            path: path.to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        tracing::debug!("Transport error: {}", err);
        ClientError::Transport(err.to_string())
    }
}

/// Error envelopes the backend uses: `{"error": "..."}` or `{"message": "..."}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

/// Pull a readable message out of a rejected response body.
///
/// Falls back to the raw text (some endpoints answer with a bare string such as
/// `ISBN already issued`) and finally to an empty string.
pub fn rejection_message(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(trimmed) {
        if let Some(msg) = parsed.error.or(parsed.message) {
            return msg;
        }
    }

    // A JSON string literal, e.g. "Invalid student ID"
    if let Ok(serde_json::Value::String(s)) = serde_json::from_str::<serde_json::Value>(trimmed) {
        return s;
    }

    trimmed.to_string()
}

/// Collects missing required fields before a write is attempted.
#[derive(Debug, Default)]
pub struct RequiredFields {
    missing: Vec<String>,
}

impl RequiredFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `field` as missing when `value` is blank.
    pub fn text(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.missing.push(field.to_string());
        }
        self
    }

    /// Record `field` as missing unless `value` is positive (ids, mark ceilings).
    pub fn positive(&mut self, field: &str, value: i64) -> &mut Self {
        if value <= 0 {
            self.missing.push(field.to_string());
        }
        self
    }

    pub fn present<T>(&mut self, field: &str, value: &Option<T>) -> &mut Self {
        if value.is_none() {
            self.missing.push(field.to_string());
        }
        self
    }

    pub fn finish(&mut self) -> Result<()> {
        if self.missing.is_empty() {
            Ok(())
        } else {
            Err(ClientError::Validation {
                fields: std::mem::take(&mut self.missing),
            })
        }
    }
}
