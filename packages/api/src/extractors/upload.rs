//! Normalization of image upload requests.
//!
//! Images arrive either as `multipart/form-data` with a `file` part, or as
//! a JSON body whose `file` (or `contentUrl`) member is a base64 `data:`
//! URI. Both forms end up as the same [`ImageUpload`]: a file on local
//! disk plus the remaining body fields.

use std::path::{Path, PathBuf};

use axum::{
    extract::{FromRequest, Multipart, Request, multipart::Field},
    http::header,
};
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::AppError;
use crate::extractors::json::AppJson;
use crate::state::AppState;
use crate::utils::data_uri::{self, DataUriError};

/// Body members that may carry the base64 file in JSON uploads, in order
/// of preference.
const JSON_FILE_KEYS: [&str; 2] = ["file", "contentUrl"];

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("\"file\" is required")]
    MissingFile,
    #[error("The content-type \"{0}\" is not supported.")]
    UnsupportedEncoding(String),
    #[error("file: {0}")]
    InvalidDataUri(#[from] DataUriError),
    #[error("file: The file is too large. Allowed maximum size is {limit} bytes.")]
    TooLarge { limit: u64 },
    #[error("Multipart error: {0}")]
    Multipart(String),
    #[error("Failed to buffer upload: {0}")]
    Io(#[from] std::io::Error),
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::MissingFile => AppError::MissingRequiredField(err.to_string()),
            UploadError::UnsupportedEncoding(_) => AppError::UnsupportedEncoding(err.to_string()),
            UploadError::InvalidDataUri(DataUriError::Unsupported(_)) => {
                AppError::UnsupportedEncoding("Unsupported image encoding".into())
            }
            UploadError::InvalidDataUri(_) => AppError::UnsupportedEncoding(err.to_string()),
            UploadError::TooLarge { .. } => AppError::ConstraintViolation(err.to_string()),
            UploadError::Multipart(_) => AppError::MalformedBody(err.to_string()),
            UploadError::Io(e) => AppError::Internal(format!("Upload buffering failed: {e}")),
        }
    }
}

/// An uploaded file parked in a temporary file for the duration of the
/// request. Whoever holds it calls [`discard`](Self::discard) when done.
#[derive(Debug)]
pub struct UploadedFile {
    path: PathBuf,
    original_name: String,
    content_type: String,
    size: u64,
}

impl UploadedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Client-side file name, or a generated `upload-{uuid}.{ext}` for
    /// base64 uploads.
    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Remove the temporary file. Best effort.
    pub async fn discard(self) {
        if let Err(e) = tokio::fs::remove_file(&self.path).await {
            tracing::warn!(path = %self.path.display(), "Failed to remove upload temp file: {e}");
        }
    }
}

/// A normalized image upload.
#[derive(Debug)]
pub struct ImageUpload {
    pub file: UploadedFile,
    /// Body fields other than the file, as JSON values.
    pub fields: Map<String, Value>,
}

impl FromRequest<AppState> for ImageUpload {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let max_size = state.config.storage.max_image_size;
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();

        if mime == "multipart/form-data" {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| UploadError::Multipart(e.body_text()))?;
            Ok(from_multipart(multipart, max_size).await?)
        } else if mime == "application/json" || mime.ends_with("+json") {
            let AppJson(body) = AppJson::<Value>::from_request(req, state).await?;
            from_json(body, max_size).await
        } else {
            Err(UploadError::UnsupportedEncoding(content_type).into())
        }
    }
}

async fn from_multipart(mut multipart: Multipart, max_size: u64) -> Result<ImageUpload, UploadError> {
    let mut file: Option<UploadedFile> = None;
    let mut fields = Map::new();

    let outcome = async {
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| UploadError::Multipart(e.body_text()))?
        {
            match field.name() {
                Some("file") => {
                    let received = buffer_field(field, max_size).await?;
                    if let Some(previous) = file.replace(received) {
                        previous.discard().await;
                    }
                }
                Some(name) => {
                    let name = name.to_string();
                    let text = field
                        .text()
                        .await
                        .map_err(|e| UploadError::Multipart(e.body_text()))?;
                    fields.insert(name, Value::String(text));
                }
                None => {}
            }
        }
        Ok::<(), UploadError>(())
    }
    .await;

    match (outcome, file) {
        (Ok(()), Some(file)) => Ok(ImageUpload { file, fields }),
        (Ok(()), None) => Err(UploadError::MissingFile),
        (Err(e), file) => {
            if let Some(file) = file {
                file.discard().await;
            }
            Err(e)
        }
    }
}

/// Stream a multipart file part into a temp file.
async fn buffer_field(mut field: Field<'_>, max_size: u64) -> Result<UploadedFile, UploadError> {
    let original_name = field
        .file_name()
        .and_then(|name| Path::new(name).file_name())
        .and_then(|name| name.to_str())
        .unwrap_or("")
        .to_string();
    let content_type = field
        .content_type()
        .map(str::to_string)
        .or_else(|| mime_guess::from_path(&original_name).first().map(|m| m.to_string()))
        .unwrap_or_else(|| "application/octet-stream".into());
    let extension = Path::new(&original_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("bin")
        .to_ascii_lowercase();
    let path = temp_upload_path(&extension);

    let result = async {
        let mut temp_file = tokio::fs::File::create(&path).await?;
        let mut size: u64 = 0;

        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| UploadError::Multipart(e.body_text()))?
        {
            size += chunk.len() as u64;
            if size > max_size {
                return Err(UploadError::TooLarge { limit: max_size });
            }
            temp_file.write_all(&chunk).await?;
        }
        temp_file.flush().await?;
        Ok::<u64, UploadError>(size)
    }
    .await;

    match result {
        Ok(size) => Ok(UploadedFile {
            path,
            original_name,
            content_type,
            size,
        }),
        Err(e) => {
            // Best effort.
            let _ = tokio::fs::remove_file(&path).await;
            Err(e)
        }
    }
}

async fn from_json(body: Value, max_size: u64) -> Result<ImageUpload, AppError> {
    let Value::Object(mut fields) = body else {
        return Err(AppError::Denormalization(
            "Cannot create image from given input".into(),
        ));
    };

    let encoded = JSON_FILE_KEYS
        .iter()
        .find_map(|key| match fields.remove(*key) {
            Some(Value::String(s)) if !s.is_empty() => Some(s),
            _ => None,
        })
        .ok_or(UploadError::MissingFile)?;
    for key in JSON_FILE_KEYS {
        fields.remove(key);
    }

    let decoded = data_uri::decode(&encoded).map_err(UploadError::from)?;
    let size = decoded.bytes.len() as u64;
    if size > max_size {
        return Err(UploadError::TooLarge { limit: max_size }.into());
    }

    let path = temp_upload_path(decoded.extension);
    if let Err(e) = tokio::fs::write(&path, &decoded.bytes).await {
        let _ = tokio::fs::remove_file(&path).await;
        return Err(UploadError::Io(e).into());
    }

    let file = UploadedFile {
        path,
        original_name: format!("upload-{}.{}", Uuid::new_v4(), decoded.extension),
        content_type: decoded.content_type.to_string(),
        size,
    };
    Ok(ImageUpload { file, fields })
}

fn temp_upload_path(extension: &str) -> PathBuf {
    std::env::temp_dir().join(format!("hammer-upload-{}.{extension}", Uuid::new_v4()))
}
