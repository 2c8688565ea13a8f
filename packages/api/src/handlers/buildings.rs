use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::building;
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::building::*;
use crate::models::shared::PageQuery;
use crate::models::{Document, HydraCollection, JsonLd, PAGE_SIZE};
use crate::state::AppState;
use crate::utils::iri::ResourceKind;
use crate::utils::lookup::{ensure_unique, find_or_404};

#[utoipa::path(
    get,
    path = "/buildings",
    tag = "Buildings",
    operation_id = "listBuildings",
    summary = "List buildings",
    description = "Returns one page of buildings ordered by id, 30 per page.",
    params(PageQuery),
    responses(
        (status = 200, description = "hydra:Collection of Building"),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_buildings(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = query.page()?;
    let paginator = building::Entity::find()
        .order_by_asc(building::Column::Id)
        .paginate(&state.db, PAGE_SIZE);
    let total = paginator.num_items().await?;
    let buildings = paginator.fetch_page(page - 1).await?;

    Ok(JsonLd::ok(HydraCollection::new(
        ResourceKind::Building,
        ResourceKind::Building.collection(),
        buildings.iter().map(BuildingView::project).collect(),
        total,
        page,
    )))
}

#[utoipa::path(
    post,
    path = "/buildings",
    tag = "Buildings",
    operation_id = "createBuilding",
    summary = "Create a building",
    description = "Creates a building. Creating it published sets `datePublished`.",
    request_body = BuildingRequest,
    responses(
        (status = 201, description = "Building created", body = BuildingView),
        (status = 400, description = "Validation error or duplicate name", body = ErrorBody),
        (status = 415, description = "Body is not JSON", body = ErrorBody),
        (status = 422, description = "Body members have the wrong type", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(name = ?payload.name))]
pub async fn create_building(
    State(state): State<AppState>,
    AppJson(payload): AppJson<BuildingRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_building(&payload, false)?;
    let name = payload.name.unwrap_or_default().trim().to_string();
    let (is_published, date_published) =
        apply_publication(false, None, payload.is_published, Utc::now())?;

    let txn = state.db.begin().await?;
    ensure_unique::<building::Entity, _>(&txn, "name", building::Column::Name, &name, None)
        .await?;

    let now = Utc::now();
    let model = building::ActiveModel {
        name: Set(name),
        description: Set(payload.description.unwrap_or_default()),
        is_published: Set(is_published),
        date_published: Set(date_published),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    info!(building_id = model.id, is_published, "Building created");
    Ok(JsonLd::created(Document::new(ResourceKind::Building, BuildingView::project(&model))))
}

#[utoipa::path(
    get,
    path = "/buildings/{id}",
    tag = "Buildings",
    operation_id = "getBuilding",
    summary = "Get a building",
    params(("id" = i32, Path, description = "Building ID")),
    responses(
        (status = 200, description = "Building", body = BuildingView),
        (status = 404, description = "Not Found", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_building(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let model = find_or_404::<building::Entity, _>(&state.db, id).await?;
    Ok(JsonLd::ok(Document::new(ResourceKind::Building, BuildingView::project(&model))))
}

#[utoipa::path(
    put,
    path = "/buildings/{id}",
    tag = "Buildings",
    operation_id = "updateBuilding",
    summary = "Update a building",
    description = "Updates a building. Absent members are left unchanged. A published building cannot be un-published.",
    params(("id" = i32, Path, description = "Building ID")),
    request_body = BuildingRequest,
    responses(
        (status = 200, description = "Building updated", body = BuildingView),
        (status = 400, description = "Validation error, duplicate name or un-publish attempt", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(id))]
pub async fn update_building(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<BuildingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    let existing = find_or_404::<building::Entity, _>(&txn, id).await?;
    validate_building(&payload, true)?;
    let (is_published, date_published) = apply_publication(
        existing.is_published,
        existing.date_published,
        payload.is_published,
        Utc::now(),
    )?;

    let mut active: building::ActiveModel = existing.into();
    if let Some(name) = &payload.name {
        let name = name.trim().to_string();
        ensure_unique::<building::Entity, _>(
            &txn,
            "name",
            building::Column::Name,
            &name,
            Some((building::Column::Id, id)),
        )
        .await?;
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    active.is_published = Set(is_published);
    active.date_published = Set(date_published);
    active.updated_at = Set(Utc::now());
    let model = active.update(&txn).await?;
    txn.commit().await?;

    info!(building_id = id, is_published, "Building updated");
    Ok(JsonLd::ok(Document::new(ResourceKind::Building, BuildingView::project(&model))))
}

#[utoipa::path(
    delete,
    path = "/buildings/{id}",
    tag = "Buildings",
    operation_id = "deleteBuilding",
    summary = "Delete a building",
    params(("id" = i32, Path, description = "Building ID")),
    responses(
        (status = 204, description = "Building deleted"),
        (status = 404, description = "Not Found", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn delete_building(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let result = building::Entity::delete_by_id(id).exec(&state.db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Not Found".into()));
    }

    info!(building_id = id, "Building deleted");
    Ok(StatusCode::NO_CONTENT)
}
