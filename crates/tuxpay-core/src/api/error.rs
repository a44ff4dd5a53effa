use reqwest::StatusCode;
use thiserror::Error;

use super::body::ResponseBody;
use crate::notify::{Notification, LONG_DURATION, SHORT_DURATION};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("No response from server: {0}")]
    NoResponse(#[source] reqwest::Error),

    #[error("Session expired - please log in to continue")]
    SessionExpired,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Could not reach server (gateway timeout)")]
    GatewayTimeout,

    #[error("Not found")]
    NotFound,

    #[error("Server error (status {status}): {message}")]
    Application { status: u16, message: String },

    #[error("Unknown response (status {0})")]
    Unparseable(u16),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Could not build request: {0}")]
    Request(String),

    #[error("Session storage error: {0}")]
    Storage(anyhow::Error),
}

/// Maximum length for error response bodies in log messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    pub(crate) fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Map a failed status to an error. 401 is not decided here because it
    /// depends on the session state at the time of the failure.
    pub fn from_status(status: StatusCode, body: &ResponseBody) -> Self {
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            504 => ApiError::GatewayTimeout,
            404 => ApiError::NotFound,
            code => match body.error_message() {
                Some(message) => ApiError::Application {
                    status: code,
                    message,
                },
                None => ApiError::Unparseable(code),
            },
        }
    }

    /// The notification a user should see for this error, if any.
    ///
    /// A 401 on an already logged-out session stays silent, as do failures
    /// that are programming or storage errors rather than server answers.
    pub fn notification(&self) -> Option<Notification> {
        match self {
            ApiError::NoResponse(_) => Some(Notification::error(
                "Error: No response from server",
                LONG_DURATION,
            )),
            ApiError::SessionExpired => Some(Notification::error(
                "Please log in to continue",
                SHORT_DURATION,
            )),
            ApiError::GatewayTimeout => Some(Notification::error(
                "Could not reach server. Please refresh the page or try again later",
                LONG_DURATION,
            )),
            ApiError::NotFound => Some(Notification::error("Error: Not Found", LONG_DURATION)),
            ApiError::Application { message, .. } => {
                Some(Notification::error(format!("Error: {}", message), LONG_DURATION))
            }
            ApiError::Unparseable(_) => Some(Notification::error(
                "Error: Unknown response",
                LONG_DURATION,
            )),
            ApiError::Unauthorized
            | ApiError::InvalidResponse(_)
            | ApiError::Request(_)
            | ApiError::Storage(_) => None,
        }
    }

    /// Whether the caller should send the user back to the login screen
    pub fn requires_login(&self) -> bool {
        matches!(self, ApiError::SessionExpired | ApiError::Unauthorized)
    }
}
