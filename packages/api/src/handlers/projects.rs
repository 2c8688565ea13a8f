use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::{project, project_photo};
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::extractors::origin::RequestOrigin;
use crate::models::project::*;
use crate::models::project_photo::ProjectPhotoView;
use crate::models::shared::PageQuery;
use crate::models::{Document, HydraCollection, JsonLd, PAGE_SIZE};
use crate::relations::{NewProject, UnitOfWork};
use crate::state::AppState;
use crate::utils::iri::{ResourceKind, iri};
use crate::utils::lookup::{
    ensure_unique, find_or_404, images_by_id, load_person_ref, load_photo_refs, not_found,
    photos_by_project,
};

async fn project_view<C: ConnectionTrait>(db: &C, model: &project::Model) -> Result<ProjectView, AppError> {
    let mut photos = photos_by_project(db, &[model.id]).await?;
    Ok(ProjectView::project(model, &photos.remove(&model.id).unwrap_or_default()))
}

#[utoipa::path(
    get,
    path = "/projects",
    tag = "Projects",
    operation_id = "listProjects",
    summary = "List projects",
    description = "Returns one page of projects ordered by id, 30 per page.",
    params(PageQuery),
    responses(
        (status = 200, description = "hydra:Collection of Project"),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_projects(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = query.page()?;
    let paginator = project::Entity::find()
        .order_by_asc(project::Column::Id)
        .paginate(&state.db, PAGE_SIZE);
    let total = paginator.num_items().await?;
    let projects = paginator.fetch_page(page - 1).await?;

    let ids: Vec<i32> = projects.iter().map(|p| p.id).collect();
    let mut photos = photos_by_project(&state.db, &ids).await?;
    let member = projects
        .iter()
        .map(|p| ProjectView::project(p, &photos.remove(&p.id).unwrap_or_default()))
        .collect();

    Ok(JsonLd::ok(HydraCollection::new(
        ResourceKind::Project,
        ResourceKind::Project.collection(),
        member,
        total,
        page,
    )))
}

#[utoipa::path(
    post,
    path = "/projects",
    tag = "Projects",
    operation_id = "createProject",
    summary = "Create a project",
    description = "Creates a project led by `foreman`. Photos listed in `photos` are moved onto the new project.",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created", body = ProjectView),
        (status = 400, description = "Validation error, duplicate name or invalid IRI", body = ErrorBody),
        (status = 415, description = "Body is not JSON", body = ErrorBody),
        (status = 422, description = "Body members have the wrong type", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(name = ?payload.name))]
pub async fn create_project(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateProjectRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_project(&payload)?;
    let name = payload.name.unwrap_or_default().trim().to_string();
    let description = payload.description.unwrap_or_default();

    let txn = state.db.begin().await?;
    ensure_unique::<project::Entity, _>(&txn, "name", project::Column::Name, &name, None).await?;

    let mut uow = UnitOfWork::new();
    let project_key = uow.stage_project(NewProject { name, description });
    if let Some(foreman) = &payload.foreman {
        let person_key = load_person_ref(&mut uow, &txn, foreman).await?;
        uow.graph_mut().add_led_project(person_key, project_key);
    }
    let photos = load_photo_refs(&mut uow, &txn, &payload.photos).await?;
    for photo in photos {
        uow.graph_mut().add_photo(project_key, photo);
    }
    uow.flush(&txn).await?;

    let id = uow.graph().project_id(project_key).ok_or_else(|| {
        AppError::Internal("project has no id after flush".into())
    })?;
    let model = find_or_404::<project::Entity, _>(&txn, id).await?;
    let view = project_view(&txn, &model).await?;
    txn.commit().await?;

    info!(project_id = id, foreman_id = model.foreman_id, "Project created");
    Ok(JsonLd::created(Document::new(ResourceKind::Project, view)))
}

#[utoipa::path(
    get,
    path = "/projects/{id}",
    tag = "Projects",
    operation_id = "getProject",
    summary = "Get a project",
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project", body = ProjectView),
        (status = 404, description = "Not Found", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let model = find_or_404::<project::Entity, _>(&state.db, id).await?;
    let view = project_view(&state.db, &model).await?;
    Ok(JsonLd::ok(Document::new(ResourceKind::Project, view)))
}

#[utoipa::path(
    put,
    path = "/projects/{id}",
    tag = "Projects",
    operation_id = "updateProject",
    summary = "Update a project",
    description = "Updates a project. Absent members are left unchanged. A new `foreman` takes the project over \
                   from the previous one; `null` is refused. `photos` replaces the full set, and photos dropped \
                   from it would be orphaned, which is refused.",
    params(("id" = i32, Path, description = "Project ID")),
    request_body = UpdateProjectRequest,
    responses(
        (status = 200, description = "Project updated", body = ProjectView),
        (status = 400, description = "Validation error, invalid IRI or broken relation", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(id))]
pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateProjectRequest>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    let existing = find_or_404::<project::Entity, _>(&txn, id).await?;
    validate_update_project(&payload)?;

    let mut active: project::ActiveModel = existing.into();
    if let Some(name) = &payload.name {
        let name = name.trim().to_string();
        ensure_unique::<project::Entity, _>(
            &txn,
            "name",
            project::Column::Name,
            &name,
            Some((project::Column::Id, id)),
        )
        .await?;
        active.name = Set(name);
    }
    if let Some(description) = &payload.description {
        active.description = Set(description.clone());
    }
    active.updated_at = Set(chrono::Utc::now());
    active.update(&txn).await?;

    let mut uow = UnitOfWork::new();
    let project_key = uow.load_project(&txn, id).await?.ok_or_else(not_found)?;
    match &payload.foreman {
        Some(Some(value)) => {
            let person_key = load_person_ref(&mut uow, &txn, value).await?;
            uow.graph_mut().add_led_project(person_key, project_key);
        }
        Some(None) => {
            if let Some(current) = uow.graph().foreman(project_key) {
                uow.graph_mut().remove_led_project(current, project_key);
            }
        }
        None => {}
    }
    if let Some(photos) = &payload.photos {
        let photos = load_photo_refs(&mut uow, &txn, photos).await?;
        uow.graph_mut().set_photos(project_key, &photos);
    }
    uow.flush(&txn).await?;

    let model = find_or_404::<project::Entity, _>(&txn, id).await?;
    let view = project_view(&txn, &model).await?;
    txn.commit().await?;

    info!(project_id = id, "Project updated");
    Ok(JsonLd::ok(Document::new(ResourceKind::Project, view)))
}

#[utoipa::path(
    delete,
    path = "/projects/{id}",
    tag = "Projects",
    operation_id = "deleteProject",
    summary = "Delete a project",
    description = "Deletes a project together with all of its photos. The images stay.",
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 204, description = "Project deleted"),
        (status = 404, description = "Not Found", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    let mut uow = UnitOfWork::new();
    let project_key = uow.load_project(&txn, id).await?.ok_or_else(not_found)?;
    let photo_count = uow.graph().photos(project_key).len();
    uow.graph_mut().remove_project(project_key);
    uow.flush(&txn).await?;
    txn.commit().await?;

    info!(project_id = id, photo_count, "Project deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/projects/{id}/photos",
    tag = "Projects",
    operation_id = "listProjectPhotosOfProject",
    summary = "List the photos of a project",
    params(
        ("id" = i32, Path, description = "Project ID"),
        PageQuery,
    ),
    responses(
        (status = 200, description = "hydra:Collection of ProjectPhoto"),
        (status = 404, description = "Not Found", body = ErrorBody),
    ),
)]
#[instrument(skip(state, origin, query), fields(id))]
pub async fn list_photos_of_project(
    State(state): State<AppState>,
    origin: RequestOrigin,
    Path(id): Path<i32>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    find_or_404::<project::Entity, _>(&state.db, id).await?;

    let page = query.page()?;
    let paginator = project_photo::Entity::find()
        .filter(project_photo::Column::ProjectId.eq(id))
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

    let path = format!("{}/photos", iri(ResourceKind::Project, id));
    Ok(JsonLd::ok(HydraCollection::new(
        ResourceKind::ProjectPhoto,
        &path,
        member,
        total,
        page,
    )))
}
