//! File handlers for the dropkey Web API.

use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use utoipa;

use crate::store::{self, name};
use crate::web::dto::{
    file_info_response, MessageResponse, MultiUploadResponse, SingleUploadResponse, UploadedFile,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// Multipart field name carrying uploaded files.
const UPLOAD_FIELD: &str = "files";

/// Generate a safe Content-Disposition header value for file downloads.
///
/// Sanitizes the filename to prevent header injection and uses RFC 5987
/// encoding for non-ASCII filenames.
fn content_disposition_header(filename: &str) -> String {
    // Sanitize filename for the basic filename parameter (ASCII fallback)
    let sanitized: String = filename
        .chars()
        .filter(|c| !c.is_control()) // Remove control characters (CR, LF, etc.)
        .map(|c| match c {
            '"' => '_',  // Replace double quotes
            '\\' => '_', // Replace backslashes
            _ => c,
        })
        .collect();

    // For ASCII-only filenames, use simple format
    if filename.is_ascii() && !filename.chars().any(|c| c.is_control() || c == '"' || c == '\\') {
        return format!("attachment; filename=\"{}\"", filename);
    }

    // Use RFC 5987 filename* parameter with UTF-8 encoding
    let encoded = urlencoding::encode(filename);

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        sanitized, encoded
    )
}

/// POST /api/files - Upload one or more files.
///
/// Request body: multipart/form-data with repeated "files" fields. Each
/// accepted file is stored under a fresh public/private key pair; the
/// response shape is singular for exactly one file and plural otherwise.
#[utoipa::path(
    post,
    path = "/api/files",
    tag = "files",
    responses(
        (status = 200, description = "Files uploaded", body = MultiUploadResponse),
        (status = 400, description = "No files uploaded or invalid multipart data"),
        (status = 429, description = "Upload rate limit exceeded")
    )
)]
pub async fn upload_files(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut uploaded: Vec<UploadedFile> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("Failed to read multipart field: {}", e);
        ApiError::bad_request("Invalid multipart data")
    })? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let filename = field
            .file_name()
            .map(|s| s.to_string())
            .ok_or_else(|| ApiError::bad_request("File field is missing a filename"))?;

        let content = field.bytes().await.map_err(|e| {
            tracing::error!("Failed to read file content: {}", e);
            ApiError::bad_request("Failed to read file")
        })?;

        if content.len() as u64 > state.max_upload_size {
            let max_mb = state.max_upload_size / 1024 / 1024;
            return Err(ApiError::bad_request(format!(
                "File too large (max {}MB)",
                max_mb
            )));
        }

        let keys = store::mint_keys(&state.store);
        let physical = state.store.save(&keys, &filename, &content)?;
        tracing::info!(physical = %physical, filename = %filename, "Stored uploaded file");

        uploaded.push(UploadedFile { filename, keys });
    }

    if uploaded.is_empty() {
        return Err(ApiError::bad_request("No files uploaded."));
    }

    let mut infos = file_info_response(&uploaded);

    let response = if infos.len() == 1 {
        Json(SingleUploadResponse {
            message: "File uploaded successfully!".to_string(),
            file: infos.remove(0),
        })
        .into_response()
    } else {
        Json(MultiUploadResponse {
            message: "Files uploaded successfully!".to_string(),
            files: infos,
        })
        .into_response()
    };

    Ok(response)
}

/// GET /api/files/:key - Download a file by its public key.
#[utoipa::path(
    get,
    path = "/api/files/{publicKey}",
    tag = "files",
    params(
        ("publicKey" = String, Path, description = "Download capability key")
    ),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 404, description = "File not found"),
        (status = 429, description = "Download rate limit exceeded"),
        (status = 500, description = "Storage error")
    )
)]
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(public_key): Path<String>,
) -> Result<Response, ApiError> {
    let physical = state.store.find_by_public_key(&public_key)?;
    let content = state.store.read(&physical)?;

    // Present the file under its original name, not the key-laden
    // physical one.
    let display_name = name::decode(&physical)
        .map(|decoded| decoded.display_name())
        .unwrap_or_else(|| physical.clone());

    let content_type = mime_guess::from_path(&display_name)
        .first_or_octet_stream()
        .to_string();

    let response = Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(&display_name),
        )
        .header(header::CONTENT_LENGTH, content.len())
        .body(Body::from(content))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Could not download the file.")
        })?;

    Ok(response)
}

/// DELETE /api/files/:key - Delete a file by its private key.
#[utoipa::path(
    delete,
    path = "/api/files/{privateKey}",
    tag = "files",
    params(
        ("privateKey" = String, Path, description = "Deletion capability key")
    ),
    responses(
        (status = 200, description = "File deleted", body = MessageResponse),
        (status = 404, description = "File not found or private key is invalid"),
        (status = 500, description = "Deletion failed")
    )
)]
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    Path(private_key): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.store.delete_by_private_key(&private_key)?;
    tracing::info!("Deleted stored file by private key");

    Ok(Json(MessageResponse::new("File deleted successfully")))
}
