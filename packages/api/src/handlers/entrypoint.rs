use axum::extract::Path;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::models::JsonLd;
use crate::models::context::context_document;
use crate::models::entrypoint::Entrypoint;

#[utoipa::path(
    get,
    path = "/",
    tag = "Entrypoint",
    operation_id = "getEntrypoint",
    summary = "API entry point",
    description = "Lists the path of every resource collection.",
    responses(
        (status = 200, description = "Entry point", body = Entrypoint),
    ),
)]
#[instrument]
pub async fn get_entrypoint() -> impl IntoResponse {
    JsonLd::ok(Entrypoint::default())
}

#[utoipa::path(
    get,
    path = "/contexts/{name}",
    tag = "Entrypoint",
    operation_id = "getContext",
    summary = "JSON-LD context of a resource",
    params(("name" = String, Path, description = "Resource short name, e.g. `Person`, `Entrypoint` or `Error`")),
    responses(
        (status = 200, description = "JSON-LD context document"),
        (status = 404, description = "Not Found", body = ErrorBody),
    ),
)]
#[instrument]
pub async fn get_context(Path(name): Path<String>) -> Result<impl IntoResponse, AppError> {
    let document = context_document(&name).ok_or_else(|| AppError::NotFound("Not Found".into()))?;
    Ok(JsonLd::ok(document))
}
