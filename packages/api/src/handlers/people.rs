use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::person;
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::person::*;
use crate::models::shared::PageQuery;
use crate::models::{Document, HydraCollection, JsonLd, PAGE_SIZE};
use crate::relations::UnitOfWork;
use crate::state::AppState;
use crate::utils::iri::ResourceKind;
use crate::utils::lookup::{
    ensure_unique, find_or_404, led_projects_by_person, load_project_refs, not_found,
    resolve_image,
};

async fn person_view<C: ConnectionTrait>(db: &C, model: &person::Model) -> Result<PersonView, AppError> {
    let mut led = led_projects_by_person(db, &[model.id]).await?;
    Ok(PersonView::project(model, &led.remove(&model.id).unwrap_or_default()))
}

#[utoipa::path(
    get,
    path = "/people",
    tag = "People",
    operation_id = "listPeople",
    summary = "List people",
    description = "Returns one page of people ordered by id, 30 per page.",
    params(PageQuery),
    responses(
        (status = 200, description = "hydra:Collection of Person"),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_people(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = query.page()?;
    let paginator = person::Entity::find()
        .order_by_asc(person::Column::Id)
        .paginate(&state.db, PAGE_SIZE);
    let total = paginator.num_items().await?;
    let people = paginator.fetch_page(page - 1).await?;

    let ids: Vec<i32> = people.iter().map(|p| p.id).collect();
    let mut led = led_projects_by_person(&state.db, &ids).await?;
    let member = people
        .iter()
        .map(|p| PersonView::project(p, &led.remove(&p.id).unwrap_or_default()))
        .collect();

    Ok(JsonLd::ok(HydraCollection::new(
        ResourceKind::Person,
        ResourceKind::Person.collection(),
        member,
        total,
        page,
    )))
}

#[utoipa::path(
    post,
    path = "/people",
    tag = "People",
    operation_id = "createPerson",
    summary = "Create a person",
    description = "Creates a person. Projects listed in `ledProjects` are taken over from their current foreman.",
    request_body = CreatePersonRequest,
    responses(
        (status = 201, description = "Person created", body = PersonView),
        (status = 400, description = "Validation error, duplicate email or invalid IRI", body = ErrorBody),
        (status = 415, description = "Body is not JSON", body = ErrorBody),
        (status = 422, description = "Body members have the wrong type", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(email = ?payload.email))]
pub async fn create_person(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreatePersonRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_person(&payload)?;
    let name = payload.name.unwrap_or_default();
    let email = payload.email.unwrap_or_default();

    let txn = state.db.begin().await?;
    ensure_unique::<person::Entity, _>(&txn, "email", person::Column::Email, email.trim(), None)
        .await?;
    let image_id = match &payload.image {
        Some(value) => Some(resolve_image(&txn, value).await?),
        None => None,
    };

    let model = person::ActiveModel {
        name: Set(name.trim().to_string()),
        email: Set(email.trim().to_string()),
        image_id: Set(image_id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    if !payload.led_projects.is_empty() {
        let mut uow = UnitOfWork::new();
        let person_key = uow.load_person(&txn, model.id).await?.ok_or_else(not_found)?;
        let projects = load_project_refs(&mut uow, &txn, &payload.led_projects).await?;
        uow.graph_mut().set_led_projects(person_key, &projects);
        uow.flush(&txn).await?;
    }

    let view = person_view(&txn, &model).await?;
    txn.commit().await?;

    info!(person_id = model.id, "Person created");
    Ok(JsonLd::created(Document::new(ResourceKind::Person, view)))
}

#[utoipa::path(
    get,
    path = "/people/{id}",
    tag = "People",
    operation_id = "getPerson",
    summary = "Get a person",
    params(("id" = i32, Path, description = "Person ID")),
    responses(
        (status = 200, description = "Person", body = PersonView),
        (status = 404, description = "Not Found", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_person(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let model = find_or_404::<person::Entity, _>(&state.db, id).await?;
    let view = person_view(&state.db, &model).await?;
    Ok(JsonLd::ok(Document::new(ResourceKind::Person, view)))
}

#[utoipa::path(
    put,
    path = "/people/{id}",
    tag = "People",
    operation_id = "updatePerson",
    summary = "Update a person",
    description = "Updates name, avatar and led projects. Absent members are left unchanged; `email` is ignored. \
                   Dropping a led project leaves it without a foreman, which is refused.",
    params(("id" = i32, Path, description = "Person ID")),
    request_body = UpdatePersonRequest,
    responses(
        (status = 200, description = "Person updated", body = PersonView),
        (status = 400, description = "Validation error, invalid IRI or project left without foreman", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(id))]
pub async fn update_person(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdatePersonRequest>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    let existing = find_or_404::<person::Entity, _>(&txn, id).await?;
    validate_update_person(&payload)?;

    let mut active: person::ActiveModel = existing.into();
    if let Some(name) = &payload.name {
        active.name = Set(name.trim().to_string());
    }
    match &payload.image {
        Some(Some(value)) => active.image_id = Set(Some(resolve_image(&txn, value).await?)),
        Some(None) => active.image_id = Set(None),
        None => {}
    }
    let model = active.update(&txn).await?;

    if let Some(led_projects) = &payload.led_projects {
        let mut uow = UnitOfWork::new();
        let person_key = uow.load_person(&txn, id).await?.ok_or_else(not_found)?;
        let projects = load_project_refs(&mut uow, &txn, led_projects).await?;
        uow.graph_mut().set_led_projects(person_key, &projects);
        uow.flush(&txn).await?;
    }

    let view = person_view(&txn, &model).await?;
    txn.commit().await?;

    info!(person_id = id, "Person updated");
    Ok(JsonLd::ok(Document::new(ResourceKind::Person, view)))
}

#[utoipa::path(
    delete,
    path = "/people/{id}",
    tag = "People",
    operation_id = "deletePerson",
    summary = "Delete a person",
    description = "Deletes a person. Refused while the person still leads a project, since that project would lose its foreman.",
    params(("id" = i32, Path, description = "Person ID")),
    responses(
        (status = 204, description = "Person deleted"),
        (status = 400, description = "Person still leads projects", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn delete_person(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    let mut uow = UnitOfWork::new();
    let person_key = uow.load_person(&txn, id).await?.ok_or_else(not_found)?;
    uow.graph_mut().remove_person(person_key);
    uow.flush(&txn).await?;
    txn.commit().await?;

    info!(person_id = id, "Person deleted");
    Ok(StatusCode::NO_CONTENT)
}
