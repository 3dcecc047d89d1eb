//! Processing loop
//!
//! One run per job: open a session, walk recipients in order with retries,
//! then release the session. Nothing here returns an error to the caller;
//! every outcome becomes a log entry or a counter update on the record.

use courier_core::domain::job::JobPhase;
use courier_core::domain::recipient::{Recipient, normalize_contact};
use std::any::Any;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::RunnerSettings;
use crate::messaging::{ActivityLog, MessagingClient, MessagingSession};
use crate::record::JobRecord;
use crate::session::SessionSlot;

/// Everything a single run needs, moved into the runner task
pub(crate) struct JobRun {
    pub record: Arc<JobRecord>,
    pub slot: Arc<SessionSlot>,
    pub recipients: Vec<Recipient>,
    pub attachment: Option<PathBuf>,
    pub client: Arc<dyn MessagingClient>,
    pub settings: RunnerSettings,
}

/// Runs a job, turning a panic inside the loop into a failed job
///
/// The loop runs in its own task so that a panic surfaces here as a
/// `JoinError` instead of tearing down the supervisor.
pub(crate) async fn supervise(run: JobRun) {
    let record = Arc::clone(&run.record);
    let slot = Arc::clone(&run.slot);

    if let Err(e) = tokio::spawn(run.execute()).await {
        let reason = if e.is_panic() {
            panic_message(e.into_panic())
        } else {
            "runner task was cancelled".to_string()
        };
        record.log_error(format!("Process failed: {}", reason));
        slot.release(record.as_ref()).await;
        record.finish(JobPhase::Failed);
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return message.to_string();
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.clone();
    }
    "unexpected panic".to_string()
}

impl JobRun {
    async fn execute(self) {
        let total = self.recipients.len();
        self.record
            .log_info(format!("Starting to process {} recipients...", total));
        if let Some(attachment) = &self.attachment {
            self.record
                .log_info(format!("Attachment: {}", attachment.display()));
        }

        let log: Arc<dyn ActivityLog> = self.record.clone();
        let session = match self.client.open_session(log).await {
            Ok(session) => session,
            Err(e) => {
                self.record
                    .log_error(format!("Failed to open messaging session: {}", e));
                self.record.finish(JobPhase::Failed);
                return;
            }
        };
        self.slot.install(Arc::clone(&session));

        self.process(session.as_ref()).await;

        self.slot.release(self.record.as_ref()).await;

        let (success, failure) = self.record.counts();
        if self.record.is_active() {
            self.record.log_info(format!(
                "Process completed! Success: {}, Failed: {}",
                success, failure
            ));
        } else {
            self.record.log_info(format!(
                "Process stopped. Success: {}, Failed: {}",
                success, failure
            ));
        }
        self.record.finish(JobPhase::Completed);
    }

    async fn process(&self, session: &dyn MessagingSession) {
        let total = self.recipients.len();

        for (index, recipient) in self.recipients.iter().enumerate() {
            if !self.record.is_active() {
                self.record.log_info(format!(
                    "Stop requested, {} recipient(s) left unprocessed",
                    total - index
                ));
                break;
            }

            let contact = normalize_contact(&recipient.contact);
            if contact.is_empty() {
                continue;
            }

            self.record.set_current(index + 1);

            if self.deliver(session, &contact, recipient.message.trim()).await {
                self.record.record_success();
                tokio::time::sleep(self.settings.message_delay).await;
            } else {
                self.record.record_failure();
            }

            tokio::time::sleep(self.settings.recipient_delay).await;
        }
    }

    /// Attempts one recipient up to `max_retries` times
    async fn deliver(&self, session: &dyn MessagingSession, contact: &str, message: &str) -> bool {
        let max_attempts = self.settings.max_retries.max(1);
        let mut attempts = 0;

        while attempts < max_attempts {
            attempts += 1;
            self.record
                .log_debug(format!("Sending message to {}...", contact));

            let error = match session
                .send(contact, message, self.attachment.as_deref())
                .await
            {
                Ok(()) => {
                    self.record
                        .log_info(format!("Message sent successfully to {}", contact));
                    return true;
                }
                Err(e) => e,
            };

            self.record.log_warning(format!(
                "Attempt {}/{} failed for {}: {}",
                attempts, max_attempts, contact, error
            ));

            if !error.is_retryable() || attempts == max_attempts || !self.record.is_active() {
                break;
            }
            tokio::time::sleep(self.settings.retry_backoff).await;
        }

        self.record.log_error(format!(
            "Failed to send message to {} after {} attempt(s)",
            contact, attempts
        ));
        false
    }
}
