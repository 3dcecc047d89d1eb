//! Error types for the WebDriver client

use thiserror::Error;

/// Result type alias for WebDriver operations
pub type Result<T> = std::result::Result<T, WebDriverError>;

/// Errors that can occur while talking to a WebDriver server
#[derive(Debug, Error)]
pub enum WebDriverError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The driver answered with a protocol error
    #[error("WebDriver error (status {status}, {error}): {message}")]
    Protocol {
        /// HTTP status code
        status: u16,
        /// W3C error code, e.g. "invalid argument"
        error: String,
        /// Human readable message from the driver
        message: String,
    },

    /// No element matched a locator
    #[error("No such element: {0}")]
    NoSuchElement(String),

    /// A wait condition did not hold before its deadline
    #[error("Timed out waiting for {0}")]
    Timeout(String),

    /// The session was already closed
    #[error("No active WebDriver session")]
    NoSession,

    /// Failed to parse a driver response
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

impl WebDriverError {
    /// Builds an error from a W3C error payload
    pub fn protocol(status: u16, error: impl Into<String>, message: impl Into<String>) -> Self {
        let error = error.into();
        let message = message.into();
        if error == "no such element" {
            return Self::NoSuchElement(message);
        }
        Self::Protocol {
            status,
            error,
            message,
        }
    }

    /// Check if this error is a wait timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}
