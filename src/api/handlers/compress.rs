use crate::AppState;
use crate::api::error::AppError;
use crate::api::middleware::request_id::RequestId;
use crate::services::staging::StagedUpload;
use axum::{
    Extension,
    extract::{Multipart, State, multipart::MultipartRejection},
    http::header,
    response::{IntoResponse, Response},
};
use tracing::info;

/// Multipart field carrying the image
pub const IMAGE_FIELD: &str = "image";

#[utoipa::path(
    post,
    path = "/api/compress/tinypng",
    request_body(content = crate::models::CompressForm, content_type = "multipart/form-data", description = "Image upload"),
    responses(
        (status = 200, description = "Compressed image bytes", content_type = "image/png"),
        (status = 400, description = "No image file uploaded", body = crate::models::ErrorResponse),
        (status = 413, description = "Image exceeds the configured size limit", body = crate::models::ErrorResponse),
        (status = 500, description = "Compression service error", body = crate::models::ErrorResponse)
    ),
    tag = "compress"
)]
pub async fn compress_tinypng(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, AppError> {
    let request_id = request_id
        .map(|Extension(RequestId(id))| id)
        .unwrap_or_default();

    let mut multipart = multipart.map_err(|e| {
        tracing::warn!(request_id = %request_id, "Not a multipart upload: {}", e.body_text());
        AppError::NoImageUploaded
    })?;

    // 1. Stage the first image file field
    let mut upload: Option<StagedUpload> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(AppError::from_multipart)?
    {
        // Browsers send `filename=""` when no file was chosen.
        let is_image = field.name() == Some(IMAGE_FIELD)
            && field.file_name().is_some_and(|name| !name.is_empty());
        if !is_image || upload.is_some() {
            continue;
        }
        upload = Some(state.stager.stage(field).await?);
    }

    let upload = upload.ok_or(AppError::NoImageUploaded)?;
    info!(
        request_id = %request_id,
        filename = %upload.filename,
        content_type = ?upload.content_type,
        size = upload.size,
        "Staged upload for compression"
    );

    // 2. Relay through the vendor; `upload` is removed when it goes out of scope
    let compressed = state.relay.compress(&upload).await?;

    // 3. Return compressed bytes
    Ok((
        [(header::CONTENT_TYPE, mime::IMAGE_PNG.as_ref())],
        compressed.bytes,
    )
        .into_response())
}
