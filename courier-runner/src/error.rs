//! Runner error types

use courier_webdriver::WebDriverError;
use thiserror::Error;

/// The messaging client could not be opened or authenticated
///
/// Aborts the whole job; never retried.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to launch browser: {0}")]
    Launch(#[source] WebDriverError),

    #[error("Login timed out after {0}s")]
    LoginTimeout(u64),

    #[error("Browser error: {0}")]
    Browser(#[from] WebDriverError),
}

/// A single delivery attempt failed
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The number has no account on the messaging service
    #[error("{0} is not registered on WhatsApp")]
    NotRegistered(String),

    #[error("Timed out waiting for {0}")]
    Timeout(String),

    #[error("Browser error: {0}")]
    Browser(#[from] WebDriverError),
}

impl DeliveryError {
    /// Whether another attempt could succeed
    ///
    /// An unregistered number stays unregistered, so it is not retried.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, DeliveryError::NotRegistered(_))
    }
}

/// Errors surfaced to callers of the job manager
#[derive(Debug, Error)]
pub enum JobError {
    #[error("A sending process is already active")]
    AlreadyActive,

    /// A stopped job's runner has not released the browser yet
    #[error("The previous sending process is still stopping")]
    StillStopping,
}
