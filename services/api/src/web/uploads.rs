//! services/api/src/web/uploads.rs
//!
//! Media upload endpoint for class videos and course materials. The file
//! goes to blob storage; only the resulting URL is ever persisted.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::identity::ensure_instructor;
use crate::web::rest::port_error_response;
use crate::web::state::AppState;

#[derive(Serialize, ToSchema)]
pub struct UploadResponse {
    pub url: String,
}

/// Upload a media file. Instructor only.
#[utoipa::path(
    post,
    path = "/uploads",
    request_body(content_type = "multipart/form-data", description = "The file to upload."),
    responses(
        (status = 201, description = "File stored", body = UploadResponse),
        (status = 400, description = "Multipart form must include a file"),
        (status = 403, description = "Caller is not the instructor"),
        (status = 502, description = "Upload failed")
    )
)]
pub async fn upload_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    ensure_instructor(&state, user_id).await?;

    let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            format!("Failed to read multipart data: {}", e),
        )
    })?
    else {
        return Err((
            StatusCode::BAD_REQUEST,
            "Multipart form must include a file".to_string(),
        ));
    };

    let file_name = field.file_name().unwrap_or("upload.bin").to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let bytes = field.bytes().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            format!("Failed to read file bytes: {}", e),
        )
    })?;

    let url = state
        .media
        .store("uploads", &file_name, &content_type, bytes.to_vec())
        .await
        .map_err(|e| port_error_response("the uploaded file", e))?;
    Ok((StatusCode::CREATED, Json(UploadResponse { url })))
}
