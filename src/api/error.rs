use crate::models::ErrorResponse;
use crate::services::compression::CompressionError;
use crate::services::staging::StagingError;
use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

pub const NO_IMAGE_MESSAGE: &str = "No image file uploaded";
pub const FAILED_TO_COMPRESS_MESSAGE: &str = "Failed to compress image";
pub const SERVICE_ERROR_MESSAGE: &str = "Compression service error";
pub const PAYLOAD_TOO_LARGE_MESSAGE: &str = "Uploaded image exceeds the maximum allowed size";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("No image file uploaded")]
    NoImageUploaded,

    #[error("Payload Too Large: {0}")]
    PayloadTooLarge(String),

    #[error("Compression error: {0}")]
    Compression(#[from] CompressionError),

    #[error("Internal Server Error: {0}")]
    Internal(String),
}

impl AppError {
    /// Multipart failures are the caller's problem: oversize bodies or a body
    /// we cannot read an image from.
    pub fn from_multipart(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(err.body_text())
        } else {
            tracing::warn!("Unreadable multipart body: {}", err.body_text());
            AppError::NoImageUploaded
        }
    }
}

impl From<StagingError> for AppError {
    fn from(err: StagingError) -> Self {
        match err {
            StagingError::Multipart(e) => AppError::from_multipart(e),
            StagingError::Io(e) => AppError::Internal(format!("Staging failed: {}", e)),
            StagingError::TooLarge { limit } => {
                AppError::PayloadTooLarge(format!("Image exceeds {} bytes", limit))
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NoImageUploaded => (StatusCode::BAD_REQUEST, NO_IMAGE_MESSAGE),
            AppError::PayloadTooLarge(detail) => {
                tracing::warn!("Upload rejected: {}", detail);
                (StatusCode::PAYLOAD_TOO_LARGE, PAYLOAD_TOO_LARGE_MESSAGE)
            }
            AppError::Compression(e) if e.is_malformed_response() => {
                tracing::error!("TinyPNG returned no usable output: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, FAILED_TO_COMPRESS_MESSAGE)
            }
            AppError::Compression(e) => {
                tracing::error!("TinyPNG compression error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, SERVICE_ERROR_MESSAGE)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, SERVICE_ERROR_MESSAGE)
            }
        };

        let body = Json(ErrorResponse {
            error: message.to_string(),
        });

        (status, body).into_response()
    }
}
