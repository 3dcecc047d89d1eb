//! Courier Runner
//!
//! Executes bulk-messaging jobs in the background.
//!
//! Architecture:
//! - [`JobManager`]: at most one active job, start/stop/progress
//! - Job record: progress counters and the audit trail, shared with readers
//! - Processing loop: per-recipient delivery with bounded retries
//! - [`messaging`]: the seam between the loop and the messaging service
//! - [`whatsapp`]: WhatsApp Web driven through chromedriver
//!
//! # Example
//!
//! ```no_run
//! use courier_core::domain::recipient::Recipient;
//! use courier_runner::{JobManager, RunnerSettings, WhatsAppSettings, WhatsAppWebClient};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = Arc::new(WhatsAppWebClient::new(WhatsAppSettings::default()));
//!     let manager = JobManager::new(client, RunnerSettings::default());
//!
//!     let job = manager.start(vec![Recipient::new("+1 555 0100", "Hello")], None)?;
//!     println!("Started job {}", job.job_id);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
mod manager;
pub mod messaging;
mod record;
mod runner;
mod session;
pub mod whatsapp;

pub use config::RunnerSettings;
pub use error::{DeliveryError, JobError, SessionError};
pub use manager::{JobManager, StartedJob};
pub use messaging::{ActivityLog, MessagingClient, MessagingSession};
pub use record::JobRecord;
pub use whatsapp::{WhatsAppSettings, WhatsAppWebClient};
