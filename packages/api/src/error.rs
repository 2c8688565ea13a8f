use axum::{
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use common::storage::StorageError;
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;

use crate::models::LD_JSON;
use crate::relations::{FlushError, RelationError};
use crate::utils::iri::IriError;

/// Hydra error document returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    #[serde(rename = "@context")]
    #[schema(value_type = String, example = "/contexts/Error")]
    pub context: &'static str,
    #[serde(rename = "@type")]
    #[schema(value_type = String, example = "hydra:Error")]
    pub kind: &'static str,
    #[serde(rename = "hydra:title")]
    #[schema(value_type = String, example = "An error occurred")]
    pub title: &'static str,
    /// Human-readable description. Validation failures list one
    /// `field: message` pair per line.
    #[serde(rename = "hydra:description")]
    #[schema(example = "email: This value is already used.")]
    pub description: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    /// A required part of the request is absent, such as the upload file.
    MissingRequiredField(String),
    /// The request body could not be parsed at all.
    MalformedBody(String),
    /// A relation field names an IRI that is malformed or points nowhere.
    InvalidReference(String),
    /// The request uses a content type the endpoint cannot read.
    UnsupportedEncoding(String),
    /// The body parsed but could not be turned into the target resource.
    Denormalization(String),
    /// Saving would leave the relation graph in an inconsistent state.
    InvariantViolation(String),
    UniquenessViolation(String),
    ConstraintViolation(String),
    NotFound(String),
    Internal(String),
}

impl AppError {
    fn status_and_description(self) -> (StatusCode, String) {
        match self {
            AppError::MissingRequiredField(msg)
            | AppError::MalformedBody(msg)
            | AppError::InvalidReference(msg)
            | AppError::InvariantViolation(msg)
            | AppError::UniquenessViolation(msg)
            | AppError::ConstraintViolation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::UnsupportedEncoding(msg) => (StatusCode::UNSUPPORTED_MEDIA_TYPE, msg),
            AppError::Denormalization(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred".into(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, description) = self.status_and_description();
        let body = ErrorBody {
            context: "/contexts/Error",
            kind: "hydra:Error",
            title: "An error occurred",
            description,
        };

        match serde_json::to_vec(&body) {
            Ok(bytes) => (
                status,
                [(header::CONTENT_TYPE, HeaderValue::from_static(LD_JSON))],
                bytes,
            )
                .into_response(),
            Err(_) => status.into_response(),
        }
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        // Uniqueness is checked before writing; this catches concurrent inserts.
        if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
            tracing::warn!("Unique constraint violation: {detail}");
            return AppError::UniquenessViolation("This value is already used.".into());
        }
        AppError::Internal(err.to_string())
    }
}

impl From<RelationError> for AppError {
    fn from(err: RelationError) -> Self {
        AppError::InvariantViolation(err.to_string())
    }
}

impl From<FlushError> for AppError {
    fn from(err: FlushError) -> Self {
        match err {
            FlushError::Invariant(e) => e.into(),
            FlushError::Database(e) => e.into(),
        }
    }
}

impl From<IriError> for AppError {
    fn from(err: IriError) -> Self {
        AppError::InvalidReference(err.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(name) => AppError::NotFound(format!("Media file {name} not found")),
            StorageError::InvalidName(msg) => AppError::NotFound(msg),
            StorageError::SizeLimitExceeded { actual, limit } => AppError::ConstraintViolation(
                format!("file: The file is too large ({actual} bytes). Allowed maximum size is {limit} bytes."),
            ),
            StorageError::Io(e) => AppError::Internal(format!("Storage error: {e}")),
        }
    }
}
