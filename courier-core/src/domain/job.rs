//! Job domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::log::LogEntry;

/// Lifecycle phase of a bulk-send job
///
/// `Idle -> Running -> {Completed | Stopped | Failed}`; a new job starts from
/// any phase other than `Running`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobPhase {
    #[default]
    Idle,
    Running,
    Completed,
    Stopped,
    Failed,
}

impl JobPhase {
    pub fn is_active(self) -> bool {
        self == JobPhase::Running
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobPhase::Completed | JobPhase::Stopped | JobPhase::Failed
        )
    }
}

/// Point-in-time copy of a job's progress
///
/// Field names follow the public progress API. `logs` is an owned copy; the
/// live log sequence never leaves the runner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobProgress {
    pub job_id: Option<Uuid>,
    pub phase: JobPhase,
    pub is_active: bool,
    pub current: usize,
    pub total: usize,
    pub success_count: usize,
    pub failure_count: usize,
    pub started_at: Option<DateTime<Utc>>,
    pub logs: Vec<LogEntry>,
}

impl JobProgress {
    /// Progress reported before any job has been started
    pub fn idle() -> Self {
        Self::default()
    }

    /// A job has run and is no longer active
    pub fn is_completed(&self) -> bool {
        !self.is_active && self.total > 0
    }

    /// Number of recipients not yet reached by the runner
    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_progress_is_not_completed() {
        let progress = JobProgress::idle();
        assert_eq!(progress.phase, JobPhase::Idle);
        assert!(!progress.is_active);
        assert!(!progress.is_completed());
    }

    #[test]
    fn test_completed_requires_inactive_and_nonempty() {
        let mut progress = JobProgress {
            total: 3,
            current: 3,
            is_active: true,
            phase: JobPhase::Running,
            ..Default::default()
        };
        assert!(!progress.is_completed());

        progress.is_active = false;
        progress.phase = JobPhase::Completed;
        assert!(progress.is_completed());
        assert_eq!(progress.remaining(), 0);
    }

    #[test]
    fn test_phase_serializes_snake_case() {
        let json = serde_json::to_value(JobPhase::Stopped).unwrap();
        assert_eq!(json, "stopped");
        assert!(JobPhase::Failed.is_terminal());
        assert!(!JobPhase::Idle.is_terminal());
    }
}
