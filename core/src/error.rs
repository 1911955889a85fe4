//! Error types for the todo client.
//!
//! # Design
//! No status code gets its own variant: every non-2xx response is an
//! `ApiError::Http` carrying the status and, when the body had one, the
//! server's `msg`. Callers show that message or fall back to a generic notice.

use thiserror::Error;

/// Errors returned by `TodoClient` and by host transports.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Item text was empty; raised before any request is built.
    #[error("todo content cannot be empty")]
    EmptyContent,

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}{}", message_suffix(.message))]
    Http {
        status: u16,
        message: Option<String>,
    },

    /// The request never produced a response.
    #[error("transport failed: {0}")]
    Transport(String),

    #[error("deserialization failed: {0}")]
    Deserialization(String),

    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// Message supplied by the server in the error body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Http { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

fn message_suffix(message: &Option<String>) -> String {
    message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
}

/// Errors raised by a `SessionStore`.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("session file is not valid JSON: {0}")]
    Format(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_display_includes_server_message() {
        let err = ApiError::Http {
            status: 401,
            message: Some("Bad username or password".to_string()),
        };
        assert_eq!(err.to_string(), "HTTP 401: Bad username or password");
        assert_eq!(err.server_message(), Some("Bad username or password"));
    }

    #[test]
    fn http_error_display_without_message() {
        let err = ApiError::Http {
            status: 500,
            message: None,
        };
        assert_eq!(err.to_string(), "HTTP 500");
        assert!(err.server_message().is_none());
    }
}
