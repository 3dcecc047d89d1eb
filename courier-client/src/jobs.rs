//! Job-related API endpoints

use crate::CourierClient;
use crate::error::{ClientError, Result};
use courier_core::domain::job::JobProgress;
use courier_core::dto::job::{
    ATTACHMENT_FIELD, JobStatusView, MessageResponse, RECIPIENTS_FIELD, SendAccepted,
};
use reqwest::multipart::{Form, Part};
use std::path::Path;
use tracing::debug;

impl CourierClient {
    // =============================================================================
    // Job Control
    // =============================================================================

    /// Upload a recipients spreadsheet and start a job
    ///
    /// # Arguments
    /// * `recipients` - Path to an `.xlsx`/`.xls` file
    /// * `attachment` - Optional file sent to every recipient
    ///
    /// # Returns
    /// The accepted job with its recipient count
    pub async fn send_recipients(
        &self,
        recipients: &Path,
        attachment: Option<&Path>,
    ) -> Result<SendAccepted> {
        let mut form = Form::new().part(RECIPIENTS_FIELD, file_part(recipients).await?);
        if let Some(attachment) = attachment {
            form = form.part(ATTACHMENT_FIELD, file_part(attachment).await?);
        }

        let url = format!("{}/api/send", self.base_url);
        let response = self.client.post(&url).multipart(form).send().await?;

        self.handle_response(response).await
    }

    /// Request the active job to stop
    ///
    /// Succeeds even when no job is running.
    pub async fn stop(&self) -> Result<MessageResponse> {
        let url = format!("{}/api/stop", self.base_url);
        let response = self.client.post(&url).send().await?;

        self.handle_response(response).await
    }

    // =============================================================================
    // Job Observation
    // =============================================================================

    /// Get the live progress snapshot
    pub async fn progress(&self) -> Result<JobProgress> {
        let url = format!("{}/api/progress", self.base_url);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// Get the end-of-run status view
    pub async fn status(&self) -> Result<JobStatusView> {
        let url = format!("{}/api/status", self.base_url);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }
}

async fn file_part(path: &Path) -> Result<Part> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| ClientError::InvalidRequest(format!("{} is not a file", path.display())))?;

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| ClientError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

    debug!("Attaching {} ({} bytes)", file_name, bytes.len());
    Ok(Part::bytes(bytes).file_name(file_name))
}
