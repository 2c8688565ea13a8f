use std::path::Path as FsPath;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use common::storage::{MediaName, MediaStore};
use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::{info, instrument, warn};

use crate::entity::{image, person, project_photo};
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::extractors::origin::RequestOrigin;
use crate::extractors::upload::ImageUpload;
use crate::models::image::*;
use crate::models::{Document, HydraCollection, JsonLd, PAGE_SIZE};
use crate::state::AppState;
use crate::utils::iri::ResourceKind;
use crate::utils::lookup::{ensure_unique, find_or_404};

/// A file to turn into an image record.
pub struct ImageSource<'a> {
    pub path: &'a FsPath,
    /// Client-side name, used to derive the stored file name.
    pub original_name: &'a str,
    pub content_type: &'a str,
    pub alternate_name: &'a str,
}

/// Copy `source` into the media store and insert its image row.
///
/// The stored copy is removed again when the row cannot be written.
pub async fn store_image<C: ConnectionTrait>(
    db: &C,
    media: &dyn MediaStore,
    source: ImageSource<'_>,
) -> Result<image::Model, AppError> {
    ensure_unique::<image::Entity, _>(
        db,
        "alternateName",
        image::Column::AlternateName,
        source.alternate_name,
        None,
    )
    .await?;

    let fallback_extension = source
        .path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("bin");
    let name = MediaName::from_original(source.original_name, fallback_extension);
    let stored = media.put_file(&name, source.path).await?;

    let inserted = image::ActiveModel {
        alternate_name: Set(source.alternate_name.to_string()),
        file_name: Set(stored.file_name.clone()),
        content_type: Set(source.content_type.to_string()),
        content_hash: Set(stored.content_hash.to_hex()),
        size: Set(stored.size as i64),
        upload_date: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await;

    match inserted {
        Ok(model) => Ok(model),
        Err(e) => {
            if let Err(cleanup) = media.delete(&stored.file_name).await {
                warn!(file_name = %stored.file_name, "Failed to remove orphaned media file: {cleanup}");
            }
            Err(e.into())
        }
    }
}

#[utoipa::path(
    get,
    path = "/images",
    tag = "Images",
    operation_id = "listImages",
    summary = "List images",
    description = "Returns one page of images ordered by id, 30 per page. The `uploadDate[...]` parameters \
                   filter on the upload date and accept RFC 3339 timestamps or `YYYY-MM-DD` dates.",
    params(ImageListQuery),
    responses(
        (status = 200, description = "hydra:Collection of ImageObject"),
        (status = 400, description = "Invalid date filter", body = ErrorBody),
    ),
)]
#[instrument(skip(state, origin, query))]
pub async fn list_images(
    State(state): State<AppState>,
    origin: RequestOrigin,
    Query(query): Query<ImageListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = query.page()?;
    let filter = query.upload_date_filter()?;

    let mut select = image::Entity::find();
    if let Some(after) = filter.after {
        select = select.filter(image::Column::UploadDate.gte(after));
    }
    if let Some(before) = filter.before {
        select = select.filter(image::Column::UploadDate.lte(before));
    }
    if let Some(after) = filter.strictly_after {
        select = select.filter(image::Column::UploadDate.gt(after));
    }
    if let Some(before) = filter.strictly_before {
        select = select.filter(image::Column::UploadDate.lt(before));
    }

    let paginator = select
        .order_by_asc(image::Column::Id)
        .paginate(&state.db, PAGE_SIZE);
    let total = paginator.num_items().await?;
    let images = paginator.fetch_page(page - 1).await?;

    let urls = state.content_urls(&origin);
    let member = images.iter().map(|i| ImageView::project(i, &urls)).collect();

    Ok(JsonLd::ok(HydraCollection::new(
        ResourceKind::Image,
        ResourceKind::Image.collection(),
        member,
        total,
        page,
    )))
}

#[utoipa::path(
    post,
    path = "/images",
    tag = "Images",
    operation_id = "createImage",
    summary = "Upload an image",
    description = "Accepts either `multipart/form-data` with a `file` part, or a JSON body whose `file` member \
                   is a base64 data URI (`data:image/png;base64,...` or `data:image/jpeg;base64,...`). \
                   `alternateName` defaults to the uploaded file name.",
    request_body(content_type = "multipart/form-data", description = "`file` part plus optional `alternateName`"),
    responses(
        (status = 201, description = "Image created", body = ImageView),
        (status = 400, description = "Missing file, validation error or duplicate alternateName", body = ErrorBody),
        (status = 415, description = "Unsupported body or image encoding", body = ErrorBody),
        (status = 422, description = "Fields cannot be turned into an image", body = ErrorBody),
    ),
)]
#[instrument(skip(state, origin, upload), fields(original_name = %upload.file.original_name(), size = upload.file.size()))]
pub async fn create_image(
    State(state): State<AppState>,
    origin: RequestOrigin,
    upload: ImageUpload,
) -> Result<impl IntoResponse, AppError> {
    let ImageUpload { file, fields } = upload;

    let stored = async {
        let attached = ImageDraft::denormalize(fields)?.attach_file(&file)?;
        store_image(
            &state.db,
            state.media.as_ref(),
            ImageSource {
                path: file.path(),
                original_name: file.original_name(),
                content_type: &attached.content_type,
                alternate_name: &attached.alternate_name,
            },
        )
        .await
    }
    .await;
    file.discard().await;
    let model = stored?;

    info!(image_id = model.id, file_name = %model.file_name, "Image uploaded");
    let view = ImageView::project(&model, &state.content_urls(&origin));
    Ok(JsonLd::created(Document::new(ResourceKind::Image, view)))
}

#[utoipa::path(
    get,
    path = "/images/{id}",
    tag = "Images",
    operation_id = "getImage",
    summary = "Get an image",
    params(("id" = i32, Path, description = "Image ID")),
    responses(
        (status = 200, description = "Image", body = ImageView),
        (status = 404, description = "Not Found", body = ErrorBody),
    ),
)]
#[instrument(skip(state, origin), fields(id))]
pub async fn get_image(
    State(state): State<AppState>,
    origin: RequestOrigin,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let model = find_or_404::<image::Entity, _>(&state.db, id).await?;
    let view = ImageView::project(&model, &state.content_urls(&origin));
    Ok(JsonLd::ok(Document::new(ResourceKind::Image, view)))
}

#[utoipa::path(
    put,
    path = "/images/{id}",
    tag = "Images",
    operation_id = "updateImage",
    summary = "Rename an image",
    description = "Only `alternateName` is writable; the file itself cannot be replaced.",
    params(("id" = i32, Path, description = "Image ID")),
    request_body = UpdateImageRequest,
    responses(
        (status = 200, description = "Image updated", body = ImageView),
        (status = 400, description = "Validation error or duplicate alternateName", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody),
    ),
)]
#[instrument(skip(state, origin, payload), fields(id))]
pub async fn update_image(
    State(state): State<AppState>,
    origin: RequestOrigin,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateImageRequest>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    let existing = find_or_404::<image::Entity, _>(&txn, id).await?;
    validate_update_image(&payload)?;

    let model = match payload.alternate_name {
        Some(alternate_name) => {
            ensure_unique::<image::Entity, _>(
                &txn,
                "alternateName",
                image::Column::AlternateName,
                &alternate_name,
                Some((image::Column::Id, id)),
            )
            .await?;
            let mut active: image::ActiveModel = existing.into();
            active.alternate_name = Set(alternate_name);
            active.update(&txn).await?
        }
        None => existing,
    };
    txn.commit().await?;

    info!(image_id = id, "Image updated");
    let view = ImageView::project(&model, &state.content_urls(&origin));
    Ok(JsonLd::ok(Document::new(ResourceKind::Image, view)))
}

#[utoipa::path(
    delete,
    path = "/images/{id}",
    tag = "Images",
    operation_id = "deleteImage",
    summary = "Delete an image",
    description = "Deletes the image and its stored file. Refused while a project photo shows the image; \
                   people using it as avatar lose their avatar.",
    params(("id" = i32, Path, description = "Image ID")),
    responses(
        (status = 204, description = "Image deleted"),
        (status = 400, description = "Image still used by a project photo", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn delete_image(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    let model = find_or_404::<image::Entity, _>(&txn, id).await?;

    let used_by_photo = project_photo::Entity::find()
        .filter(project_photo::Column::ImageId.eq(id))
        .count(&txn)
        .await?;
    if used_by_photo > 0 {
        return Err(AppError::InvariantViolation(
            "Cannot delete an image used by a project photo".into(),
        ));
    }

    let cleared = person::Entity::update_many()
        .col_expr(person::Column::ImageId, Expr::value(Option::<i32>::None))
        .filter(person::Column::ImageId.eq(id))
        .exec(&txn)
        .await?
        .rows_affected;
    image::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    match state.media.delete(&model.file_name).await {
        Ok(true) => {}
        Ok(false) => warn!(file_name = %model.file_name, "Stored file was already gone"),
        Err(e) => warn!(file_name = %model.file_name, "Failed to delete stored file: {e}"),
    }

    info!(image_id = id, avatars_cleared = cleared, "Image deleted");
    Ok(StatusCode::NO_CONTENT)
}
