use crate::relay::StoreError;
use axum::extract::multipart::MultipartError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Body is not multipart, or has no `file` part
    #[error("No file uploaded")]
    MissingFile,

    /// Multipart body could not be read: malformed, cut off, or over the size limit
    #[error("Failed to read multipart body: {0}")]
    Multipart(#[from] MultipartError),

    /// Document id that cannot be used as a file name
    #[error("Invalid document id {id:?}")]
    InvalidId { id: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Reading the saved upload failed
    #[error("Failed to encode upload: {0}")]
    Encode(#[source] std::io::Error),

    /// Local filesystem or other unexpected failure, with context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingFile | ApiError::InvalidId { .. } => StatusCode::BAD_REQUEST,
            ApiError::Multipart(e) => e.status(),
            ApiError::Store(_) | ApiError::Encode(_) | ApiError::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to return to the caller. Store and I/O detail stays in the log.
    pub fn user_message(&self) -> &'static str {
        match self {
            ApiError::MissingFile => "No file uploaded",
            ApiError::InvalidId { .. } => "Invalid document id",
            ApiError::Multipart(e) => match e.status() {
                s if s == StatusCode::PAYLOAD_TOO_LARGE => "File too large",
                s if s.is_client_error() => "Malformed upload",
                _ => "Internal server error",
            },
            ApiError::Store(_) | ApiError::Encode(_) | ApiError::Other(_) => {
                "Internal server error"
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::MissingFile | ApiError::InvalidId { .. } => {
                tracing::debug!("Client error: {}", self);
            }
            ApiError::Multipart(_) if self.status_code().is_client_error() => {
                tracing::warn!("Rejected upload: {}", self);
            }
            _ => {
                tracing::error!("Request failed: {:#}", self);
            }
        }
        let body = Json(json!({ "error": self.user_message() }));
        (self.status_code(), body).into_response()
    }
}
