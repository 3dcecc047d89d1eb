//! Shared handler state

use courier_runner::JobManager;
use std::sync::Arc;

use crate::storage::UploadStore;

#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<JobManager>,
    pub uploads: UploadStore,
}
