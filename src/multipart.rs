use axum::extract::Multipart;
use tracing::debug;

use crate::backend::{FilePart, MultipartBody};
use crate::error::AppError;

pub const UPLOAD_LIMIT_BYTES: usize = 20 * 1024 * 1024;

/// Buffer an incoming multipart request so it can be validated and forwarded.
/// Parts with a file name become files; everything else is text.
pub async fn collect(mut mp: Multipart) -> Result<MultipartBody, AppError> {
    let mut body = MultipartBody::new();
    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let content_type = field
                    .content_type()
                    .map(str::to_string)
                    .unwrap_or_else(|| "application/octet-stream".into());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                if bytes.is_empty() {
                    continue;
                }
                debug!(field = %name, %file_name, size = bytes.len(), "file part received");
                body = body.file(FilePart {
                    field: name,
                    file_name,
                    content_type,
                    bytes,
                });
            }
            None => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                body = body.text(name, value);
            }
        }
    }
    Ok(body)
}
