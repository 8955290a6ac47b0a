use super::error::ApiError;
use super::AppState;
use crate::relay::encode::{encode_file, split_data_uri};
use crate::relay::schema::{ExportResponse, UploadResponse};
use crate::relay::storage::is_safe_id;
use crate::relay::ExportWriter;
use axum::body::Bytes;
use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};
use std::path::Path as FsPath;

/// Multipart field carrying the upload.
pub const FILE_FIELD: &str = "file";

/// The `file` part of an upload request.
#[derive(Debug)]
pub struct UploadedFile {
    pub filename: String,
    pub data: Bytes,
}

/// `POST /upload`
pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let multipart = multipart.map_err(|e| {
        tracing::debug!(error = %e, "Upload request is not multipart");
        ApiError::MissingFile
    })?;
    let file = read_file_field(multipart).await?.ok_or(ApiError::MissingFile)?;

    tracing::info!(filename = %file.filename, size = file.data.len(), "Received upload");

    let saved = state.uploads.save(&file.filename, &file.data).await?;
    let result = encode_and_store(&state, &saved).await;

    if state.cleanup_uploads {
        if let Err(e) = state.uploads.remove(&saved).await {
            tracing::warn!(path = %saved.display(), error = %e, "Failed to clean up upload");
        }
    }

    let document_id = result?;
    Ok(Json(UploadResponse {
        message: "File uploaded and indexed successfully".to_string(),
        document_id,
    }))
}

async fn encode_and_store(state: &AppState, saved: &FsPath) -> Result<String, ApiError> {
    let payload = encode_file(saved).await.map_err(ApiError::Encode)?;
    if let Some((mime_type, data)) = split_data_uri(&payload) {
        tracing::info!(mime_type, encoded_len = data.len(), "Encoded upload");
    }
    let id = state.store.create(&state.index, &payload).await?;
    Ok(id)
}

/// First part named `file` that carries a filename. Other parts are skipped.
async fn read_file_field(mut multipart: Multipart) -> Result<Option<UploadedFile>, ApiError> {
    loop {
        let Some(field) = multipart.next_field().await? else {
            return Ok(None);
        };

        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let data = field.bytes().await?;
        return Ok(Some(UploadedFile { filename, data }));
    }
}

/// `GET /file/{id}`
pub async fn export(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ExportResponse>, ApiError> {
    if !is_safe_id(&id) {
        return Err(ApiError::InvalidId { id });
    }

    let content = state.store.fetch(&state.index, &id).await?;
    let path = state.exports.write(&id, &content).await?;
    tracing::info!(id = %id, path = %path.display(), bytes = content.len(), "Exported document");

    Ok(Json(ExportResponse {
        message: format!("File data exported to {}", ExportWriter::file_name(&id)),
    }))
}

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
