//! Messaging-client seams
//!
//! The processing loop only sees these traits. The production implementation
//! drives WhatsApp Web (see [`crate::whatsapp`]); tests plug in scripted fakes.

use async_trait::async_trait;
use courier_core::domain::log::LogLevel;
use std::path::Path;
use std::sync::Arc;

use crate::error::{DeliveryError, SessionError};

/// Append-only audit trail of a job
///
/// Implemented by the job record; handed to sessions so that browser
/// lifecycle events land in the same trail as delivery outcomes.
pub trait ActivityLog: Send + Sync {
    /// Appends an entry stamped with the current time
    fn append(&self, level: LogLevel, message: String);

    fn log_debug(&self, message: String) {
        self.append(LogLevel::Debug, message);
    }

    fn log_info(&self, message: String) {
        self.append(LogLevel::Info, message);
    }

    fn log_warning(&self, message: String) {
        self.append(LogLevel::Warning, message);
    }

    fn log_error(&self, message: String) {
        self.append(LogLevel::Error, message);
    }
}

/// Opens authenticated sessions with the messaging service
#[async_trait]
pub trait MessagingClient: Send + Sync {
    /// Opens a browser and authenticates
    ///
    /// # Arguments
    /// * `log` - Trail for lifecycle events (profile in use, QR prompts, ...)
    async fn open_session(
        &self,
        log: Arc<dyn ActivityLog>,
    ) -> Result<Arc<dyn MessagingSession>, SessionError>;
}

/// An open, authenticated messaging session
#[async_trait]
pub trait MessagingSession: Send + Sync {
    /// Delivers one message, optionally with an attachment
    async fn send(
        &self,
        contact: &str,
        message: &str,
        attachment: Option<&Path>,
    ) -> Result<(), DeliveryError>;

    /// Releases the session
    ///
    /// Must be idempotent: closing an already closed session is a no-op.
    async fn close(&self) -> Result<(), SessionError>;
}
