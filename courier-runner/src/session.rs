//! Take-once holder for the job's messaging session
//!
//! Both `stop()` and the runner's own cleanup release the session. Whoever
//! takes it first closes it; the other finds the slot empty.

use std::sync::{Arc, Mutex, PoisonError};

use crate::messaging::{ActivityLog, MessagingSession};

#[derive(Default)]
pub(crate) struct SessionSlot {
    session: Mutex<Option<Arc<dyn MessagingSession>>>,
}

impl SessionSlot {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn install(&self, session: Arc<dyn MessagingSession>) {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = Some(session);
    }

    fn take(&self) -> Option<Arc<dyn MessagingSession>> {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Closes the session if it is still held
    ///
    /// Errors are logged and swallowed.
    pub(crate) async fn release(&self, log: &dyn ActivityLog) {
        let Some(session) = self.take() else {
            return;
        };

        match session.close().await {
            Ok(()) => log.log_info("Browser session closed".to_string()),
            Err(e) => log.log_warning(format!("Failed to close browser session: {}", e)),
        }
    }
}
