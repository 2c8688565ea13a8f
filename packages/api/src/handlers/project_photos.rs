use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::{image, project_photo};
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::extractors::origin::RequestOrigin;
use crate::models::project_photo::*;
use crate::models::shared::PageQuery;
use crate::models::{Document, HydraCollection, JsonLd, PAGE_SIZE};
use crate::relations::{NewPhoto, UnitOfWork};
use crate::state::AppState;
use crate::utils::content_url::ContentUrlResolver;
use crate::utils::iri::ResourceKind;
use crate::utils::lookup::{
    ensure_photo_image_free, find_or_404, images_by_id, load_project_ref, not_found, resolve_image,
};

async fn photo_view<C: ConnectionTrait>(
    db: &C,
    model: &project_photo::Model,
    urls: &ContentUrlResolver,
) -> Result<ProjectPhotoView, AppError> {
    let image = image::Entity::find_by_id(model.image_id).one(db).await?;
    Ok(ProjectPhotoView::project(model, image.as_ref(), urls))
}

#[utoipa::path(
    get,
    path = "/project_photos",
    tag = "Project Photos",
    operation_id = "listProjectPhotos",
    summary = "List project photos",
    description = "Returns one page of project photos ordered by id, 30 per page.",
    params(PageQuery),
    responses(
        (status = 200, description = "hydra:Collection of ProjectPhoto"),
    ),
)]
#[instrument(skip(state, origin, query))]
pub async fn list_project_photos(
    State(state): State<AppState>,
    origin: RequestOrigin,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = query.page()?;
    let paginator = project_photo::Entity::find()
        .order_by_asc(project_photo::Column::Id)
        .paginate(&state.db, PAGE_SIZE);
    let total = paginator.num_items().await?;
    let photos = paginator.fetch_page(page - 1).await?;

    let image_ids: Vec<i32> = photos.iter().map(|p| p.image_id).collect();
    let images = images_by_id(&state.db, &image_ids).await?;
    let urls = state.content_urls(&origin);
    let member = photos
        .iter()
        .map(|p| ProjectPhotoView::project(p, images.get(&p.image_id), &urls))
        .collect();

    Ok(JsonLd::ok(HydraCollection::new(
        ResourceKind::ProjectPhoto,
        ResourceKind::ProjectPhoto.collection(),
        member,
        total,
        page,
    )))
}

#[utoipa::path(
    post,
    path = "/project_photos",
    tag = "Project Photos",
    operation_id = "createProjectPhoto",
    summary = "Create a project photo",
    description = "Attaches an existing image to a project. An image can back at most one photo.",
    request_body = CreateProjectPhotoRequest,
    responses(
        (status = 201, description = "Project photo created", body = ProjectPhotoView),
        (status = 400, description = "Validation error, image already used or invalid IRI", body = ErrorBody),
        (status = 415, description = "Body is not JSON", body = ErrorBody),
        (status = 422, description = "Body members have the wrong type", body = ErrorBody),
    ),
)]
#[instrument(skip(state, origin, payload), fields(project = ?payload.project, photo = ?payload.photo))]
pub async fn create_project_photo(
    State(state): State<AppState>,
    origin: RequestOrigin,
    AppJson(payload): AppJson<CreateProjectPhotoRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_project_photo(&payload)?;
    let short_description = payload.short_description.unwrap_or_default();

    let txn = state.db.begin().await?;
    let mut uow = UnitOfWork::new();
    let project_key = match &payload.project {
        Some(value) => Some(load_project_ref(&mut uow, &txn, value).await?),
        None => None,
    };
    let image_id = match &payload.photo {
        Some(value) => {
            let image_id = resolve_image(&txn, value).await?;
            ensure_photo_image_free(&txn, image_id, None).await?;
            Some(image_id)
        }
        None => None,
    };

    let photo_key = uow.stage_photo(NewPhoto { short_description }, image_id);
    if let Some(project_key) = project_key {
        uow.graph_mut().add_photo(project_key, photo_key);
    }
    uow.flush(&txn).await?;

    let id = uow.graph().photo_id(photo_key).ok_or_else(|| {
        AppError::Internal("project photo has no id after flush".into())
    })?;
    let model = find_or_404::<project_photo::Entity, _>(&txn, id).await?;
    let view = photo_view(&txn, &model, &state.content_urls(&origin)).await?;
    txn.commit().await?;

    info!(photo_id = id, project_id = model.project_id, image_id = model.image_id, "Project photo created");
    Ok(JsonLd::created(Document::new(ResourceKind::ProjectPhoto, view)))
}

#[utoipa::path(
    get,
    path = "/project_photos/{id}",
    tag = "Project Photos",
    operation_id = "getProjectPhoto",
    summary = "Get a project photo",
    params(("id" = i32, Path, description = "Project photo ID")),
    responses(
        (status = 200, description = "Project photo", body = ProjectPhotoView),
        (status = 404, description = "Not Found", body = ErrorBody),
    ),
)]
#[instrument(skip(state, origin), fields(id))]
pub async fn get_project_photo(
    State(state): State<AppState>,
    origin: RequestOrigin,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let model = find_or_404::<project_photo::Entity, _>(&state.db, id).await?;
    let view = photo_view(&state.db, &model, &state.content_urls(&origin)).await?;
    Ok(JsonLd::ok(Document::new(ResourceKind::ProjectPhoto, view)))
}

#[utoipa::path(
    put,
    path = "/project_photos/{id}",
    tag = "Project Photos",
    operation_id = "updateProjectPhoto",
    summary = "Update a project photo",
    description = "Updates a project photo. Absent members are left unchanged. A new `project` moves the photo \
                   there; `null` for `project` or `photo` is refused.",
    params(("id" = i32, Path, description = "Project photo ID")),
    request_body = UpdateProjectPhotoRequest,
    responses(
        (status = 200, description = "Project photo updated", body = ProjectPhotoView),
        (status = 400, description = "Validation error, invalid IRI or broken relation", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody),
    ),
)]
#[instrument(skip(state, origin, payload), fields(id))]
pub async fn update_project_photo(
    State(state): State<AppState>,
    origin: RequestOrigin,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateProjectPhotoRequest>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    let existing = find_or_404::<project_photo::Entity, _>(&txn, id).await?;
    validate_update_project_photo(&payload)?;

    if let Some(short_description) = &payload.short_description {
        let mut active: project_photo::ActiveModel = existing.into();
        active.short_description = Set(short_description.clone());
        active.updated_at = Set(chrono::Utc::now());
        active.update(&txn).await?;
    }

    let mut uow = UnitOfWork::new();
    let photo_key = uow.load_photo(&txn, id).await?.ok_or_else(not_found)?;
    match &payload.photo {
        Some(Some(value)) => {
            let image_id = resolve_image(&txn, value).await?;
            ensure_photo_image_free(&txn, image_id, Some(id)).await?;
            uow.graph_mut().set_photo_image(photo_key, Some(image_id));
        }
        Some(None) => uow.graph_mut().set_photo_image(photo_key, None),
        None => {}
    }
    match &payload.project {
        Some(Some(value)) => {
            let project_key = load_project_ref(&mut uow, &txn, value).await?;
            uow.graph_mut().add_photo(project_key, photo_key);
        }
        Some(None) => {
            if let Some(current) = uow.graph().project_of(photo_key) {
                uow.graph_mut().remove_photo(current, photo_key);
            }
        }
        None => {}
    }
    uow.flush(&txn).await?;

    let model = find_or_404::<project_photo::Entity, _>(&txn, id).await?;
    let view = photo_view(&txn, &model, &state.content_urls(&origin)).await?;
    txn.commit().await?;

    info!(photo_id = id, "Project photo updated");
    Ok(JsonLd::ok(Document::new(ResourceKind::ProjectPhoto, view)))
}

#[utoipa::path(
    delete,
    path = "/project_photos/{id}",
    tag = "Project Photos",
    operation_id = "deleteProjectPhoto",
    summary = "Delete a project photo",
    description = "Removes the photo from its project. The image stays.",
    params(("id" = i32, Path, description = "Project photo ID")),
    responses(
        (status = 204, description = "Project photo deleted"),
        (status = 404, description = "Not Found", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn delete_project_photo(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    let mut uow = UnitOfWork::new();
    let photo_key = uow.load_photo(&txn, id).await?.ok_or_else(not_found)?;
    uow.graph_mut().remove_photo_entity(photo_key);
    uow.flush(&txn).await?;
    txn.commit().await?;

    info!(photo_id = id, "Project photo deleted");
    Ok(StatusCode::NO_CONTENT)
}
