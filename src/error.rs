use reqwest::StatusCode;
use thiserror::Error;

use crate::credentials::CredentialError;

/// Errors surfaced by every `ApiClient` operation.
///
/// Nothing in the client retries on its own; callers decide whether to
/// retry, re-authenticate or give up based on the variant.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The endpoint could not be resolved to an absolute URL.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// No credential was available for an authenticated call, or the
    /// server answered 401.
    #[error("unauthorized, please log in again")]
    Unauthorized,

    #[error("{}", server_error_text(*.status, .message.as_deref()))]
    ServerError {
        status: u16,
        message: Option<String>,
    },

    /// The body, empty ones included, did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),

    /// An event-stream line was not valid UTF-8 or outgrew the line limit.
    #[error("malformed event stream: {0}")]
    InvalidEvent(String),

    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// The exchange produced no HTTP response metadata. reqwest always
    /// reports a status, so only custom byte sources surface this.
    #[error("no data received from server")]
    NoData,

    /// Timeout, connectivity loss or any other failure below HTTP.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("credential store error: {0}")]
    Credential(#[from] CredentialError),
}

fn server_error_text(status: u16, message: Option<&str>) -> String {
    match message {
        Some(message) => format!("server error (status {status}): {message}"),
        None => format!("server error with status code: {status}"),
    }
}

impl ApiError {
    /// True for failures that happened below the HTTP layer, including
    /// timeouts.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Transport(e) if e.is_timeout())
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Unauthorized => Some(StatusCode::UNAUTHORIZED),
            ApiError::ServerError { status, .. } => StatusCode::from_u16(*status).ok(),
            ApiError::Transport(e) => e.status(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
