//! Job manager
//!
//! Owns at most one job record and the handle of its runner task. Start,
//! stop and progress are safe to call from any request handler; none of
//! them waits for the job to finish.

use courier_core::domain::job::JobProgress;
use courier_core::domain::recipient::Recipient;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::RunnerSettings;
use crate::error::JobError;
use crate::messaging::{ActivityLog, MessagingClient};
use crate::record::JobRecord;
use crate::runner::{self, JobRun};
use crate::session::SessionSlot;

/// Result of an accepted start request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartedJob {
    pub job_id: Uuid,
    pub total: usize,
}

struct CurrentJob {
    record: Arc<JobRecord>,
    slot: Arc<SessionSlot>,
    handle: Option<JoinHandle<()>>,
}

impl CurrentJob {
    fn runner_alive(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

/// Process-wide owner of the single bulk-send job
pub struct JobManager {
    client: Arc<dyn MessagingClient>,
    settings: RunnerSettings,
    current: Mutex<Option<CurrentJob>>,
}

impl JobManager {
    /// Creates a manager with no job
    ///
    /// # Arguments
    /// * `client` - Opens messaging sessions for each job
    /// * `settings` - Retry and pacing parameters
    pub fn new(client: Arc<dyn MessagingClient>, settings: RunnerSettings) -> Self {
        Self {
            client,
            settings,
            current: Mutex::new(None),
        }
    }

    /// Starts a job in the background
    ///
    /// Rejected while another job is active, and while a stopped job's
    /// runner task is still winding down, so that at most one runner and
    /// one browser exist at a time. Must be called from within a tokio
    /// runtime.
    pub fn start(
        &self,
        recipients: Vec<Recipient>,
        attachment: Option<PathBuf>,
    ) -> Result<StartedJob, JobError> {
        let mut current = self.lock();

        if let Some(job) = current.as_ref() {
            if job.record.is_active() {
                return Err(JobError::AlreadyActive);
            }
            if job.runner_alive() {
                return Err(JobError::StillStopping);
            }
        }

        let record = JobRecord::new(recipients.len());
        let slot = SessionSlot::new();
        let started = StartedJob {
            job_id: record.id(),
            total: recipients.len(),
        };

        let run = JobRun {
            record: Arc::clone(&record),
            slot: Arc::clone(&slot),
            recipients,
            attachment,
            client: Arc::clone(&self.client),
            settings: self.settings.clone(),
        };
        let handle = tokio::spawn(runner::supervise(run));

        info!(
            "Started job {} for {} recipient(s)",
            started.job_id, started.total
        );

        *current = Some(CurrentJob {
            record,
            slot,
            handle: Some(handle),
        });

        Ok(started)
    }

    pub fn is_active(&self) -> bool {
        self.lock()
            .as_ref()
            .is_some_and(|job| job.record.is_active())
    }

    /// Copies the current job's progress
    pub fn progress(&self) -> JobProgress {
        match self.lock().as_ref() {
            Some(job) => job.record.snapshot(),
            None => JobProgress::idle(),
        }
    }

    /// Asks the running job to stop and closes its session
    ///
    /// The runner notices at its next recipient boundary; a delivery already
    /// in flight completes first. No-op when nothing is running.
    pub async fn stop(&self) {
        let target = self
            .lock()
            .as_ref()
            .map(|job| (Arc::clone(&job.record), Arc::clone(&job.slot)));

        let Some((record, slot)) = target else {
            return;
        };

        if record.request_stop() {
            record.log_info("Stop requested".to_string());
            slot.release(record.as_ref()).await;
        }
    }

    /// Stops the job and waits for its runner task to exit
    ///
    /// Gives up after the configured grace period; the task is then left to
    /// the runtime's own teardown.
    pub async fn shutdown(&self) {
        self.stop().await;

        let handle = self.lock().as_mut().and_then(|job| job.handle.take());
        let Some(handle) = handle else {
            return;
        };

        match tokio::time::timeout(self.settings.shutdown_grace, handle).await {
            Ok(_) => info!("Runner task finished"),
            Err(_) => warn!(
                "Runner task still busy after {:?}, abandoning it",
                self.settings.shutdown_grace
            ),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<CurrentJob>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DeliveryError, SessionError};
    use crate::messaging::MessagingSession;
    use async_trait::async_trait;
    use courier_core::domain::job::JobPhase;
    use courier_webdriver::WebDriverError;
    use std::collections::{HashMap, HashSet};
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;

    /// Holds one contact's first attempt until released
    struct Gate {
        contact: String,
        entered: Notify,
        release: Notify,
    }

    #[derive(Default)]
    struct Script {
        /// Failing attempts before a success; `usize::MAX` fails forever
        failures: HashMap<String, usize>,
        unregistered: HashSet<String>,
        panic_on: Option<String>,
        fail_open: bool,
        gate: Option<Gate>,
    }

    impl Script {
        fn gated(contact: &str) -> Self {
            Self {
                gate: Some(Gate {
                    contact: contact.to_string(),
                    entered: Notify::new(),
                    release: Notify::new(),
                }),
                ..Default::default()
            }
        }

        fn gate(&self) -> &Gate {
            self.gate.as_ref().unwrap()
        }
    }

    #[derive(Default)]
    struct Calls {
        sends: Mutex<Vec<String>>,
        opens: AtomicUsize,
        closes: AtomicUsize,
    }

    impl Calls {
        fn sends(&self) -> Vec<String> {
            self.sends.lock().unwrap().clone()
        }
    }

    struct FakeClient {
        script: Arc<Script>,
        calls: Arc<Calls>,
    }

    struct FakeSession {
        script: Arc<Script>,
        calls: Arc<Calls>,
        attempts: Mutex<HashMap<String, usize>>,
    }

    #[async_trait]
    impl MessagingClient for FakeClient {
        async fn open_session(
            &self,
            log: Arc<dyn ActivityLog>,
        ) -> Result<Arc<dyn MessagingSession>, SessionError> {
            self.calls.opens.fetch_add(1, Ordering::SeqCst);
            if self.script.fail_open {
                return Err(SessionError::Launch(WebDriverError::NoSession));
            }
            log.log_info("Fake session opened".to_string());
            Ok(Arc::new(FakeSession {
                script: Arc::clone(&self.script),
                calls: Arc::clone(&self.calls),
                attempts: Mutex::new(HashMap::new()),
            }))
        }
    }

    #[async_trait]
    impl MessagingSession for FakeSession {
        async fn send(
            &self,
            contact: &str,
            _message: &str,
            _attachment: Option<&Path>,
        ) -> Result<(), DeliveryError> {
            self.calls.sends.lock().unwrap().push(contact.to_string());

            if self.script.panic_on.as_deref() == Some(contact) {
                panic!("selector exploded for {}", contact);
            }

            let attempt = {
                let mut attempts = self.attempts.lock().unwrap();
                let attempt = attempts.entry(contact.to_string()).or_insert(0);
                *attempt += 1;
                *attempt
            };

            if let Some(gate) = &self.script.gate {
                if gate.contact == contact && attempt == 1 {
                    gate.entered.notify_one();
                    gate.release.notified().await;
                }
            }

            if self.script.unregistered.contains(contact) {
                return Err(DeliveryError::NotRegistered(contact.to_string()));
            }

            let failures = self.script.failures.get(contact).copied().unwrap_or(0);
            if attempt <= failures {
                return Err(DeliveryError::Timeout("scripted chat".to_string()));
            }
            Ok(())
        }

        async fn close(&self) -> Result<(), SessionError> {
            self.calls.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn manager(script: Script, max_retries: u32) -> (JobManager, Arc<Script>, Arc<Calls>) {
        let script = Arc::new(script);
        let calls = Arc::new(Calls::default());
        let client = FakeClient {
            script: Arc::clone(&script),
            calls: Arc::clone(&calls),
        };
        let manager = JobManager::new(Arc::new(client), RunnerSettings::immediate(max_retries));
        (manager, script, calls)
    }

    fn recipients(contacts: &[&str]) -> Vec<Recipient> {
        contacts
            .iter()
            .map(|c| Recipient::new(c, format!("hello {}", c)))
            .collect()
    }

    async fn wait_until_idle(manager: &JobManager) -> JobProgress {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let progress = manager.progress();
                let runner_alive = manager.lock().as_ref().is_some_and(CurrentJob::runner_alive);
                if !progress.is_active && !runner_alive {
                    return progress;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("job did not finish in time")
    }

    /// Waits for the runner's closing log line; a stopped job is inactive
    /// before its runner has wound down.
    async fn wait_for_log(manager: &JobManager, needle: &str) -> JobProgress {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let progress = manager.progress();
                if count_logs(&progress, needle) > 0 {
                    return progress;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("log line never appeared")
    }

    fn count_logs(progress: &JobProgress, needle: &str) -> usize {
        progress
            .logs
            .iter()
            .filter(|entry| entry.message.contains(needle))
            .count()
    }

    #[tokio::test]
    async fn test_all_recipients_delivered() {
        let (manager, _, calls) = manager(Script::default(), 3);

        let started = manager.start(recipients(&["111", "222", "333"]), None).unwrap();
        assert_eq!(started.total, 3);

        let progress = wait_until_idle(&manager).await;
        assert_eq!(progress.phase, JobPhase::Completed);
        assert_eq!(progress.current, 3);
        assert_eq!(progress.success_count, 3);
        assert_eq!(progress.failure_count, 0);
        assert!(progress.is_completed());
        assert_eq!(calls.sends(), vec!["111", "222", "333"]);
        assert_eq!(calls.closes.load(Ordering::SeqCst), 1);
        assert_eq!(count_logs(&progress, "Process completed!"), 1);
    }

    #[tokio::test]
    async fn test_failing_recipient_exhausts_retries_and_job_continues() {
        let script = Script {
            failures: HashMap::from([("222".to_string(), usize::MAX)]),
            ..Default::default()
        };
        let (manager, _, calls) = manager(script, 2);

        manager.start(recipients(&["111", "222", "333"]), None).unwrap();
        let progress = wait_until_idle(&manager).await;

        assert_eq!(progress.success_count, 2);
        assert_eq!(progress.failure_count, 1);
        assert_eq!(calls.sends(), vec!["111", "222", "222", "333"]);
        assert_eq!(count_logs(&progress, "failed for 222"), 2);
        assert_eq!(count_logs(&progress, "Failed to send message to 222"), 1);
    }

    #[tokio::test]
    async fn test_success_on_later_attempt_counts_once() {
        let script = Script {
            failures: HashMap::from([("111".to_string(), 2)]),
            ..Default::default()
        };
        let (manager, _, calls) = manager(script, 3);

        manager.start(recipients(&["111"]), None).unwrap();
        let progress = wait_until_idle(&manager).await;

        assert_eq!(progress.success_count, 1);
        assert_eq!(progress.failure_count, 0);
        assert_eq!(calls.sends().len(), 3);
    }

    #[tokio::test]
    async fn test_unregistered_number_is_not_retried() {
        let script = Script {
            unregistered: HashSet::from(["222".to_string()]),
            ..Default::default()
        };
        let (manager, _, calls) = manager(script, 3);

        manager.start(recipients(&["111", "222", "333"]), None).unwrap();
        let progress = wait_until_idle(&manager).await;

        assert_eq!(calls.sends(), vec!["111", "222", "333"]);
        assert_eq!(progress.success_count, 2);
        assert_eq!(progress.failure_count, 1);
        assert_eq!(count_logs(&progress, "after 1 attempt(s)"), 1);
    }

    #[tokio::test]
    async fn test_second_start_is_rejected_while_active() {
        let (manager, script, _) = manager(Script::gated("111"), 3);

        let first = manager.start(recipients(&["111", "222"]), None).unwrap();
        script.gate().entered.notified().await;

        let second = manager.start(recipients(&["999"]), None);
        assert!(matches!(second, Err(JobError::AlreadyActive)));

        let progress = manager.progress();
        assert_eq!(progress.job_id, Some(first.job_id));
        assert_eq!(progress.total, 2);
        assert!(progress.is_active);

        script.gate().release.notify_one();
        let progress = wait_until_idle(&manager).await;
        assert_eq!(progress.success_count, 2);
    }

    #[tokio::test]
    async fn test_stop_between_recipients() {
        let (manager, script, calls) = manager(Script::gated("111"), 3);

        manager.start(recipients(&["111", "222", "333"]), None).unwrap();
        script.gate().entered.notified().await;

        manager.stop().await;
        assert!(!manager.is_active());
        script.gate().release.notify_one();

        let progress = wait_for_log(&manager, "Process stopped").await;
        assert_eq!(progress.phase, JobPhase::Stopped);
        assert_eq!(progress.current, 1);
        assert_eq!(progress.success_count, 1);
        assert_eq!(progress.failure_count, 0);
        assert_eq!(calls.sends(), vec!["111"]);
        assert_eq!(calls.closes.load(Ordering::SeqCst), 1);
        assert_eq!(count_logs(&progress, "2 recipient(s) left unprocessed"), 1);
    }

    #[tokio::test]
    async fn test_session_failure_aborts_job() {
        let script = Script {
            fail_open: true,
            ..Default::default()
        };
        let (manager, _, calls) = manager(script, 3);

        manager.start(recipients(&["111", "222"]), None).unwrap();
        let progress = wait_until_idle(&manager).await;

        assert_eq!(progress.phase, JobPhase::Failed);
        assert_eq!(progress.current, 0);
        assert_eq!(progress.success_count + progress.failure_count, 0);
        assert!(calls.sends().is_empty());
        assert_eq!(calls.opens.load(Ordering::SeqCst), 1);
        assert_eq!(count_logs(&progress, "Failed to open messaging session"), 1);
    }

    #[tokio::test]
    async fn test_panic_in_loop_fails_job_and_releases_session() {
        let script = Script {
            panic_on: Some("222".to_string()),
            ..Default::default()
        };
        let (manager, _, calls) = manager(script, 3);

        manager.start(recipients(&["111", "222", "333"]), None).unwrap();
        let progress = wait_until_idle(&manager).await;

        assert_eq!(progress.phase, JobPhase::Failed);
        assert_eq!(progress.success_count, 1);
        assert_eq!(calls.closes.load(Ordering::SeqCst), 1);
        assert_eq!(count_logs(&progress, "selector exploded for 222"), 1);
    }

    #[tokio::test]
    async fn test_empty_contact_is_skipped_without_counting() {
        let (manager, _, calls) = manager(Script::default(), 3);

        let list = vec![Recipient::new("n/a", "skip me"), Recipient::new("111", "hi")];
        manager.start(list, None).unwrap();
        let progress = wait_until_idle(&manager).await;

        assert_eq!(progress.total, 2);
        assert_eq!(progress.current, 2);
        assert_eq!(progress.success_count, 1);
        assert_eq!(progress.failure_count, 0);
        assert_eq!(calls.sends(), vec!["111"]);
    }

    #[tokio::test]
    async fn test_new_job_resets_progress() {
        let (manager, _, _) = manager(Script::default(), 3);

        let first = manager.start(recipients(&["111", "222"]), None).unwrap();
        wait_until_idle(&manager).await;

        let second = manager.start(recipients(&["333"]), None).unwrap();
        assert_ne!(first.job_id, second.job_id);

        let progress = wait_until_idle(&manager).await;
        assert_eq!(progress.job_id, Some(second.job_id));
        assert_eq!(progress.total, 1);
        assert_eq!(progress.success_count, 1);
        assert!(progress.logs[0].message.starts_with("Starting to process 1"));
    }

    #[tokio::test]
    async fn test_restart_waits_for_stopped_runner() {
        let (manager, script, calls) = manager(Script::gated("111"), 3);

        manager.start(recipients(&["111", "222"]), None).unwrap();
        script.gate().entered.notified().await;
        manager.stop().await;
        assert!(!manager.is_active());

        // The first runner is still inside its send for 111.
        let restart = manager.start(recipients(&["333"]), None);
        assert!(matches!(restart, Err(JobError::StillStopping)));
        assert_eq!(calls.opens.load(Ordering::SeqCst), 1);

        script.gate().release.notify_one();
        wait_until_idle(&manager).await;

        let second = manager.start(recipients(&["333"]), None).unwrap();
        manager.shutdown().await;

        let progress = manager.progress();
        assert_eq!(progress.job_id, Some(second.job_id));
        assert!(!progress.is_active);
        assert!(manager.lock().as_ref().is_some_and(|job| !job.runner_alive()));
        assert_eq!(calls.opens.load(Ordering::SeqCst), 2);
        assert_eq!(calls.sends()[0], "111");
    }

    #[tokio::test]
    async fn test_stop_without_job_is_noop() {
        let (manager, _, calls) = manager(Script::default(), 3);

        manager.stop().await;
        manager.stop().await;

        assert_eq!(manager.progress(), JobProgress::idle());
        assert_eq!(calls.closes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_shutdown_joins_runner() {
        let (manager, script, calls) = manager(Script::gated("111"), 3);

        manager.start(recipients(&["111", "222"]), None).unwrap();
        script.gate().entered.notified().await;
        script.gate().release.notify_one();

        manager.shutdown().await;

        let progress = manager.progress();
        assert!(!progress.is_active);
        assert_eq!(progress.phase, JobPhase::Stopped);
        assert_eq!(calls.closes.load(Ordering::SeqCst), 1);
    }
}
