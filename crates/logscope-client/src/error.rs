//! Error types for the backend client.

use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur while talking to the log backend.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport failure (connection, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status from the backend.
    #[error("Backend responded with status {status}: {message}")]
    Status { status: u16, message: String },

    /// A 2xx response whose body carried an `error` field.
    #[error("Backend error: {0}")]
    Backend(String),

    /// The response body was not valid JSON.
    #[error("Invalid response format: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Rejected before sending.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ClientError {
    /// Check if this error was caused by the request timing out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Http(e) if e.is_timeout())
    }

    /// Human-readable description of a status code. Any text the backend
    /// sends is appended after it.
    pub fn describe_status(status: u16) -> String {
        match status {
            400 => "bad request parameters".to_string(),
            401 => "unauthorized".to_string(),
            403 => "access denied".to_string(),
            404 => "resource not found".to_string(),
            500 => "internal server error".to_string(),
            other => format!("unexpected status {}", other),
        }
    }
}
