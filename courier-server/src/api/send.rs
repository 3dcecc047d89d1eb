//! Send handler
//!
//! Accepts the recipients spreadsheet and an optional attachment, then
//! starts a background job.

use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, State},
};
use courier_core::dto::job::{ATTACHMENT_FIELD, RECIPIENTS_FIELD, SendAccepted};
use courier_runner::JobError;
use std::path::PathBuf;

use crate::api::error::{ApiError, ApiResult};
use crate::spreadsheet;
use crate::state::AppState;
use crate::storage::{ATTACHMENT_EXTENSIONS, RECIPIENT_EXTENSIONS, UploadError, allowed_extension};

struct UploadedFile {
    file_name: String,
    bytes: Bytes,
}

/// POST /api/send
/// Start sending to every recipient in the uploaded spreadsheet
pub async fn send_messages(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<SendAccepted>> {
    if state.manager.is_active() {
        return Err(JobError::AlreadyActive.into());
    }

    let mut recipients_file = None;
    let mut attachment_file = None;

    while let Some(field) = multipart.next_field().await? {
        let slot = match field.name() {
            Some(RECIPIENTS_FIELD) => &mut recipients_file,
            Some(ATTACHMENT_FIELD) => &mut attachment_file,
            other => {
                tracing::debug!("Ignoring form field {:?}", other);
                continue;
            }
        };
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        *slot = Some(UploadedFile { file_name, bytes });
    }

    let recipients_file = recipients_file
        .ok_or_else(|| ApiError::BadRequest("Recipients file is required".to_string()))?;

    if recipients_file.file_name.is_empty() {
        return Err(ApiError::BadRequest(
            "No recipients file selected".to_string(),
        ));
    }

    if !allowed_extension(&recipients_file.file_name, RECIPIENT_EXTENSIONS) {
        return Err(ApiError::BadRequest(
            "Recipients file must be Excel format (.xlsx or .xls)".to_string(),
        ));
    }

    let recipients_path = store(&state, &recipients_file, "Recipients file name is invalid").await?;

    let recipients = tokio::task::spawn_blocking(move || {
        spreadsheet::read_recipients(&recipients_path)
    })
    .await
    .map_err(|e| ApiError::InternalError(format!("Spreadsheet reader failed: {}", e)))?
    .map_err(|e| ApiError::BadRequest(format!("Invalid Excel file: {}", e)))?;

    if recipients.is_empty() {
        return Err(ApiError::BadRequest(
            "Recipients file is empty or has no valid contacts".to_string(),
        ));
    }

    let attachment_path = match attachment_file.filter(|file| !file.file_name.is_empty()) {
        Some(file) => {
            if !allowed_extension(&file.file_name, ATTACHMENT_EXTENSIONS) {
                return Err(ApiError::BadRequest(
                    "Invalid attachment file format".to_string(),
                ));
            }
            Some(store(&state, &file, "Attachment file name is invalid").await?)
        }
        None => None,
    };

    let started = state.manager.start(recipients, attachment_path)?;

    Ok(Json(SendAccepted {
        message: "Message sending process started successfully".to_string(),
        total_recipients: started.total,
        job_id: started.job_id,
    }))
}

async fn store(state: &AppState, file: &UploadedFile, invalid_name: &str) -> ApiResult<PathBuf> {
    state
        .uploads
        .save(&file.file_name, &file.bytes)
        .await
        .map_err(|e| match e {
            UploadError::InvalidName(_) => ApiError::BadRequest(invalid_name.to_string()),
            UploadError::Io(e) => ApiError::InternalError(format!("Failed to save upload: {}", e)),
        })
}
