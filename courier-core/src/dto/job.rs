//! Job DTOs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::job::JobProgress;
use crate::domain::log::LogEntry;

/// Multipart field carrying the recipients spreadsheet
pub const RECIPIENTS_FIELD: &str = "recipientsFile";

/// Multipart field carrying the optional attachment
pub const ATTACHMENT_FIELD: &str = "attachmentFile";

/// Response to an accepted send request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendAccepted {
    pub message: String,
    pub total_recipients: usize,
    pub job_id: Uuid,
}

/// Derived end-of-run view over a progress snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatusView {
    pub is_active: bool,
    pub completed: bool,
    pub total_processed: usize,
    pub success_count: usize,
    pub failure_count: usize,
    pub logs: Vec<LogEntry>,
}

impl From<JobProgress> for JobStatusView {
    fn from(progress: JobProgress) -> Self {
        Self {
            is_active: progress.is_active,
            completed: progress.is_completed(),
            total_processed: progress.current,
            success_count: progress.success_count,
            failure_count: progress.failure_count,
            logs: progress.logs,
        }
    }
}

/// Generic acknowledgement body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
