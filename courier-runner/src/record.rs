//! Shared progress record of a job
//!
//! The runner task is the only writer of counters; HTTP handlers read
//! snapshots. Every access goes through one short-lived mutex, never held
//! across an `.await`, so a reader always sees a consistent record.

use chrono::{DateTime, Utc};
use courier_core::domain::job::{JobPhase, JobProgress};
use courier_core::domain::log::{LogEntry, LogLevel};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::messaging::ActivityLog;

/// Progress and audit trail of one job
#[derive(Debug)]
pub struct JobRecord {
    id: Uuid,
    started_at: DateTime<Utc>,
    state: Mutex<RecordState>,
}

#[derive(Debug)]
struct RecordState {
    phase: JobPhase,
    current: usize,
    total: usize,
    success_count: usize,
    failure_count: usize,
    logs: Vec<LogEntry>,
}

impl JobRecord {
    /// Creates a running record for `total` recipients
    pub fn new(total: usize) -> Arc<Self> {
        Arc::new(Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            state: Mutex::new(RecordState {
                phase: JobPhase::Running,
                current: 0,
                total,
                success_count: 0,
                failure_count: 0,
                logs: Vec::new(),
            }),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.lock().phase.is_active()
    }

    /// Copies the record, logs included
    pub fn snapshot(&self) -> JobProgress {
        let state = self.lock();
        JobProgress {
            job_id: Some(self.id),
            phase: state.phase,
            is_active: state.phase.is_active(),
            current: state.current,
            total: state.total,
            success_count: state.success_count,
            failure_count: state.failure_count,
            started_at: Some(self.started_at),
            logs: state.logs.clone(),
        }
    }

    /// Moves the cursor to a 1-based recipient position; never moves back
    pub(crate) fn set_current(&self, position: usize) {
        let mut state = self.lock();
        state.current = state.current.max(position.min(state.total));
    }

    pub(crate) fn record_success(&self) {
        self.lock().success_count += 1;
    }

    pub(crate) fn record_failure(&self) {
        self.lock().failure_count += 1;
    }

    /// Clears the active flag
    ///
    /// Returns `false` if the job was not running.
    pub(crate) fn request_stop(&self) -> bool {
        let mut state = self.lock();
        if !state.phase.is_active() {
            return false;
        }
        state.phase = JobPhase::Stopped;
        true
    }

    /// Moves a running job to its terminal phase
    ///
    /// A job that was already stopped stays stopped. Returns the final phase.
    pub(crate) fn finish(&self, phase: JobPhase) -> JobPhase {
        let mut state = self.lock();
        if state.phase.is_active() {
            state.phase = phase;
        }
        state.phase
    }

    /// Returns `(success_count, failure_count)`
    pub(crate) fn counts(&self) -> (usize, usize) {
        let state = self.lock();
        (state.success_count, state.failure_count)
    }

    fn lock(&self) -> MutexGuard<'_, RecordState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ActivityLog for JobRecord {
    fn append(&self, level: LogLevel, message: String) {
        match level {
            LogLevel::Debug => debug!(job_id = %self.id, "{}", message),
            LogLevel::Info => info!(job_id = %self.id, "{}", message),
            LogLevel::Warning => warn!(job_id = %self.id, "{}", message),
            LogLevel::Error => error!(job_id = %self.id, "{}", message),
        }

        self.lock().logs.push(LogEntry::now(level, message));
    }
}
