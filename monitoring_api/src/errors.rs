//! Error types for the API client.

use std::time::Duration;

/// Maximum number of body bytes kept on an error value.
const MAX_BODY_SNIPPET: usize = 2000;

/// Errors that can occur when making API requests.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The client could not be built from the supplied configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// The request descriptor is unusable (empty path, unencodable body).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    /// The transport failed. Only connect, timeout, send and body-read
    /// failures are retried; builder, redirect and decode failures are not.
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),
    /// The API returned a non-success HTTP status.
    #[error("Request failed with status {status}")]
    HttpStatus {
        status: u16,
        /// Truncated response body.
        body: String,
        /// `message` from an error envelope, when the body carried one.
        message: Option<String>,
        /// Parsed `Retry-After` header.
        retry_after: Option<Duration>,
    },
    /// The transport succeeded but the envelope reported `status: "error"`.
    #[error("API error: {message}")]
    Api {
        status: u16,
        message: String,
        code: Option<String>,
    },
    /// The response body did not match the expected envelope shape.
    #[error("Failed to decode response: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
        /// Truncated response body.
        body: String,
    },
    /// A successful envelope carried no `data` where the caller requires one.
    #[error("Response envelope contained no data")]
    MissingData,
    /// The per-call deadline elapsed before a result was produced.
    #[error("Deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),
    /// Every attempt allowed by the retry policy failed.
    #[error("Retries exhausted after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<Error>,
    },
}

impl Error {
    /// Whether the retry policy may try the request again after this error.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Network(e) => {
                e.is_connect() || e.is_timeout() || e.is_request() || e.is_body()
            }
            Error::HttpStatus { status, .. } => *status == 429 || (500..=599).contains(status),
            _ => false,
        }
    }

    /// HTTP status associated with the error, if any. Looks through
    /// [`Error::RetriesExhausted`] to the last underlying error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::HttpStatus { status, .. } | Error::Api { status, .. } => Some(*status),
            Error::Network(e) => e.status().map(|s| s.as_u16()),
            Error::RetriesExhausted { last, .. } => last.status(),
            _ => None,
        }
    }

    /// Server-requested delay before the next attempt.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Error::HttpStatus { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// The innermost error, unwrapping [`Error::RetriesExhausted`].
    pub fn last_error(&self) -> &Error {
        match self {
            Error::RetriesExhausted { last, .. } => last.last_error(),
            other => other,
        }
    }

    pub(crate) fn decode(source: serde_json::Error, body: &[u8]) -> Self {
        Error::Decode {
            source,
            body: truncate_body(&String::from_utf8_lossy(body)),
        }
    }
}

/// Shortens a response body so it can be logged or stored on an error.
pub(crate) fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_BODY_SNIPPET {
        return body.to_string();
    }
    let mut end = MAX_BODY_SNIPPET;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...[truncated]", &body[..end])
}
