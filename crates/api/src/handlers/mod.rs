pub mod auth;
pub mod cough;
pub mod device;
pub mod image;
pub mod info;
pub mod offline;
pub mod voice;

use axum::body::Bytes;
use axum::extract::Multipart;

use crate::error::{AppError, AppResult};

/// A file pulled out of a multipart request.
#[derive(Debug)]
pub struct UploadedFile {
    /// File name as sent by the client.
    pub file_name: String,
    pub data: Bytes,
}

/// Read the file field called `field_name`, ignoring any other fields.
pub async fn read_file_field(multipart: &mut Multipart, field_name: &str) -> AppResult<UploadedFile> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(field_name) {
            continue;
        }
        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::BadRequest(format!("{field_name} must be a file")))?;
        let data = field.bytes().await?;
        return Ok(UploadedFile { file_name, data });
    }
    Err(AppError::BadRequest(format!("Missing {field_name} field")))
}
