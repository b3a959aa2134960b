use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;

use crate::auth::middleware::AdminClaims;
use crate::dto::ApiResponse;
use crate::error::AppError;
use crate::services::media::{ImageUpload, UploadedImage, ALLOWED_IMAGE_TYPES};
use crate::state::AppState;

/// Folder names are passed to the media host verbatim, so keep them boring.
fn valid_folder(folder: &str) -> bool {
    !folder.is_empty()
        && folder.len() <= 100
        && !folder.contains("..")
        && folder
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '/'))
}

pub async fn upload_image(
    AdminClaims(claims): AdminClaims,
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<ApiResponse<UploadedImage>>), AppError> {
    let mut multipart = multipart.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let max_bytes = state.config.max_upload_bytes();

    let mut file: Option<(String, String, Vec<u8>)> = None;
    let mut folder: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                file = Some((file_name, content_type, bytes.to_vec()));
            }
            Some("folder") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                folder = Some(text.trim().to_string());
            }
            _ => {}
        }
    }

    let (file_name, content_type, bytes) =
        file.ok_or_else(|| AppError::BadRequest("No file provided".to_string()))?;

    if !ALLOWED_IMAGE_TYPES.contains(&content_type.as_str()) {
        return Err(AppError::BadRequest(format!(
            "Unsupported file type: {content_type}"
        )));
    }
    if bytes.is_empty() {
        return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
    }
    if bytes.len() > max_bytes {
        return Err(AppError::BadRequest(format!(
            "File too large (max {} MB)",
            state.config.media.max_upload_size_mb
        )));
    }

    let folder = folder
        .filter(|f| !f.is_empty())
        .unwrap_or_else(|| state.config.media.default_folder.clone());
    if !valid_folder(&folder) {
        return Err(AppError::BadRequest("Invalid folder name".to_string()));
    }

    tracing::info!(
        "{} uploading {file_name} ({} bytes) to {folder}",
        claims.sub,
        bytes.len()
    );

    let uploaded = state
        .media
        .upload(ImageUpload {
            file_name,
            content_type,
            bytes,
            folder,
        })
        .await
        .map_err(|e| AppError::Upstream(format!("image upload: {e:#}")))?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(uploaded))))
}
