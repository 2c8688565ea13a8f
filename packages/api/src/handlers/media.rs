use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use common::storage::validate_flat_name;
use sea_orm::*;
use tokio_util::io::ReaderStream;
use tracing::instrument;

use crate::entity::image;
use crate::error::{AppError, ErrorBody};
use crate::state::AppState;
use crate::utils::lookup::not_found;

#[utoipa::path(
    get,
    path = "/media/images/{file_name}",
    tag = "Media",
    operation_id = "getMediaFile",
    summary = "Download a stored image file",
    description = "Streams the stored file of an image. The ETag is the SHA-256 of the content; \
                   a matching `If-None-Match` yields 304.",
    params(("file_name" = String, Path, description = "Stored file name, as found at the end of `contentUrl`")),
    responses(
        (status = 200, description = "File content"),
        (status = 304, description = "Not modified"),
        (status = 404, description = "Not Found", body = ErrorBody),
    ),
)]
#[instrument(skip(state, headers), fields(file_name = %file_name))]
pub async fn get_media_file(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let file_name = validate_flat_name(&file_name).map_err(|_| not_found())?;
    let model = image::Entity::find()
        .filter(image::Column::FileName.eq(file_name))
        .one(&state.db)
        .await?
        .ok_or_else(not_found)?;

    let etag_value = format!("\"{}\"", model.content_hash);
    if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH)
        && let Ok(val) = if_none_match.to_str()
        && (val == etag_value || val == "*")
    {
        return Ok(StatusCode::NOT_MODIFIED.into_response());
    }

    let reader = state.media.get_stream(&model.file_name).await?;
    let body = Body::from_stream(ReaderStream::new(reader));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, &model.content_type)
        .header(header::CONTENT_LENGTH, model.size.to_string())
        .header(header::ETAG, &etag_value)
        .header(header::CACHE_CONTROL, "public, max-age=3600")
        .body(body)
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))
}
