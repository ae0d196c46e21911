/// Maximum number of server message characters surfaced to callers.
const MAX_MESSAGE_CHARS: usize = 200;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The request could not be completed (no response).
    #[error("HTTP error: {0}")]
    Network(#[from] reqwest::Error),

    /// Login was rejected; `message` is the server-supplied reason, safe to display.
    #[error("{message}")]
    Authentication { status: u16, message: String },

    /// The refresh secret is absent, expired or invalid.
    #[error("Session refresh failed ({status}): {detail}")]
    Refresh { status: u16, detail: String },

    /// A 401 could not be recovered by refreshing; the session has been cleared.
    #[error("Session expired")]
    SessionExpired,

    /// Non-success response from a registration or resource endpoint.
    #[error("{operation} failed ({status}): {message}")]
    Api {
        operation: &'static str,
        status: u16,
        message: String,
    },

    /// The response body did not have the expected shape.
    #[error("Unexpected response from {operation}: {detail}")]
    InvalidResponse {
        operation: &'static str,
        detail: String,
    },

    /// The stored access token cannot be sent as an `Authorization` header.
    #[error("Access token is not a valid header value")]
    InvalidCredential,

    /// The request body is a stream and cannot be re-sent after a refresh.
    #[error("Request body cannot be replayed")]
    UnreplayableRequest,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether the caller should discard its view and send the user to login.
    #[must_use]
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }
}

/// Extracts a displayable message from an error body.
///
/// Prefers the JSON `message` field, falls back to the raw text, and finally to
/// `fallback`. The result is trimmed and truncated.
pub(crate) fn server_message(body: &str, fallback: &str) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        message: Option<String>,
    }

    let candidate = match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.message.unwrap_or_default(),
        Err(_) => body.to_owned(),
    };

    let trimmed = candidate.trim();
    if trimmed.is_empty() {
        fallback.to_owned()
    } else {
        trimmed.chars().take(MAX_MESSAGE_CHARS).collect()
    }
}
