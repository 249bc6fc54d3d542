use axum::body::Body;
use axum::extract::multipart::{Field, MultipartError};
use axum::http::{StatusCode, header};
use axum::response::Response;

use crate::error::AppError;
use crate::utils::filename::{content_disposition_value, resolve_content_type, validate_flat_filename};

/// A multipart file part read fully into memory.
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Translate a multipart read failure. Body-limit hits surface as 413.
pub fn multipart_error(err: MultipartError, limit: u64) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge { limit }
    } else {
        AppError::Validation(format!("Multipart error: {}", err.body_text()))
    }
}

pub async fn read_text_field(field: Field<'_>, name: &str) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read '{name}': {}", e.body_text())))
}

/// Read a file part chunk by chunk, rejecting it once it grows past `max_size`.
///
/// Returns `Ok(None)` when the part carries no bytes, which browsers send for
/// an untouched optional file input.
pub async fn read_file_field(
    mut field: Field<'_>,
    max_size: u64,
) -> Result<Option<UploadedFile>, AppError> {
    let raw_name = field.file_name().map(str::to_string);
    let declared = field.content_type().map(str::to_string);

    let mut data = Vec::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| multipart_error(e, max_size))?
    {
        if (data.len() + chunk.len()) as u64 > max_size {
            return Err(AppError::PayloadTooLarge { limit: max_size });
        }
        data.extend_from_slice(&chunk);
    }

    if data.is_empty() && raw_name.as_deref().is_none_or(|n| n.trim().is_empty()) {
        return Ok(None);
    }

    let raw_name =
        raw_name.ok_or_else(|| AppError::Validation("File field must have a filename".into()))?;
    let filename = validate_flat_filename(&raw_name)
        .map_err(|e| AppError::Validation(e.message().into()))?
        .to_string();
    if data.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty".into()));
    }
    let content_type = resolve_content_type(&filename, declared.as_deref());

    Ok(Some(UploadedFile {
        filename,
        content_type,
        data,
    }))
}

/// Build a binary response. With `download_name` the body is sent as an attachment.
pub fn binary_response(
    data: Vec<u8>,
    content_type: &str,
    download_name: Option<&str>,
) -> Result<Response, AppError> {
    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, data.len().to_string())
        .header(header::CACHE_CONTROL, "private, no-cache");
    if let Some(name) = download_name {
        builder = builder.header(header::CONTENT_DISPOSITION, content_disposition_value(name));
    }
    builder
        .body(Body::from(data))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))
}
