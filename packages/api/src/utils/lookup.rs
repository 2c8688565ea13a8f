//! Query helpers shared by the handlers.

use std::collections::HashMap;

use sea_orm::*;

use crate::entity::{image, project, project_photo};
use crate::error::AppError;
use crate::models::shared::already_used;
use crate::relations::{PersonKey, PhotoKey, ProjectKey, UnitOfWork};
use crate::utils::iri::{IriError, ResourceKind, parse_iri};

pub fn not_found() -> AppError {
    AppError::NotFound("Not Found".into())
}

/// Fetch a row by primary key or fail with 404.
pub async fn find_or_404<E, C>(db: &C, id: i32) -> Result<E::Model, AppError>
where
    E: EntityTrait,
    C: ConnectionTrait,
    i32: Into<<E::PrimaryKey as PrimaryKeyTrait>::ValueType>,
{
    E::find_by_id(id).one(db).await?.ok_or_else(not_found)
}

/// Fail with `{field}: This value is already used.` when another row
/// holds `value` in `column`. `exclude` skips the row being updated.
pub async fn ensure_unique<E, C>(
    db: &C,
    field: &str,
    column: E::Column,
    value: &str,
    exclude: Option<(E::Column, i32)>,
) -> Result<(), AppError>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let mut select = E::find().filter(column.eq(value));
    if let Some((id_column, id)) = exclude {
        select = select.filter(id_column.ne(id));
    }
    if select.one(db).await?.is_some() {
        return Err(already_used(field));
    }
    Ok(())
}

/// Resolve an image IRI to the id of an existing image.
pub async fn resolve_image<C: ConnectionTrait>(db: &C, value: &str) -> Result<i32, AppError> {
    let id = parse_iri(ResourceKind::Image, value)?;
    if image::Entity::find_by_id(id).one(db).await?.is_none() {
        return Err(IriError::NotFound(value.to_string()).into());
    }
    Ok(id)
}

/// An image backs at most one project photo.
pub async fn ensure_photo_image_free<C: ConnectionTrait>(
    db: &C,
    image_id: i32,
    exclude_photo: Option<i32>,
) -> Result<(), AppError> {
    let mut select = project_photo::Entity::find().filter(project_photo::Column::ImageId.eq(image_id));
    if let Some(id) = exclude_photo {
        select = select.filter(project_photo::Column::Id.ne(id));
    }
    if select.one(db).await?.is_some() {
        return Err(already_used("photo"));
    }
    Ok(())
}

pub async fn load_person_ref<C: ConnectionTrait>(
    uow: &mut UnitOfWork,
    db: &C,
    value: &str,
) -> Result<PersonKey, AppError> {
    let id = parse_iri(ResourceKind::Person, value)?;
    Ok(uow
        .load_person(db, id)
        .await?
        .ok_or_else(|| IriError::NotFound(value.to_string()))?)
}

pub async fn load_project_ref<C: ConnectionTrait>(
    uow: &mut UnitOfWork,
    db: &C,
    value: &str,
) -> Result<ProjectKey, AppError> {
    let id = parse_iri(ResourceKind::Project, value)?;
    Ok(uow
        .load_project(db, id)
        .await?
        .ok_or_else(|| IriError::NotFound(value.to_string()))?)
}

pub async fn load_photo_ref<C: ConnectionTrait>(
    uow: &mut UnitOfWork,
    db: &C,
    value: &str,
) -> Result<PhotoKey, AppError> {
    let id = parse_iri(ResourceKind::ProjectPhoto, value)?;
    Ok(uow
        .load_photo(db, id)
        .await?
        .ok_or_else(|| IriError::NotFound(value.to_string()))?)
}

pub async fn load_project_refs<C: ConnectionTrait>(
    uow: &mut UnitOfWork,
    db: &C,
    values: &[String],
) -> Result<Vec<ProjectKey>, AppError> {
    let mut keys = Vec::with_capacity(values.len());
    for value in values {
        keys.push(load_project_ref(uow, db, value).await?);
    }
    Ok(keys)
}

pub async fn load_photo_refs<C: ConnectionTrait>(
    uow: &mut UnitOfWork,
    db: &C,
    values: &[String],
) -> Result<Vec<PhotoKey>, AppError> {
    let mut keys = Vec::with_capacity(values.len());
    for value in values {
        keys.push(load_photo_ref(uow, db, value).await?);
    }
    Ok(keys)
}

/// Ids of the projects led by each of `person_ids`, in id order.
pub async fn led_projects_by_person<C: ConnectionTrait>(
    db: &C,
    person_ids: &[i32],
) -> Result<HashMap<i32, Vec<i32>>, DbErr> {
    let mut map: HashMap<i32, Vec<i32>> = HashMap::new();
    if person_ids.is_empty() {
        return Ok(map);
    }
    let projects = project::Entity::find()
        .filter(project::Column::ForemanId.is_in(person_ids.iter().copied()))
        .order_by_asc(project::Column::Id)
        .all(db)
        .await?;
    for p in projects {
        map.entry(p.foreman_id).or_default().push(p.id);
    }
    Ok(map)
}

/// Ids of the photos of each of `project_ids`, in id order.
pub async fn photos_by_project<C: ConnectionTrait>(
    db: &C,
    project_ids: &[i32],
) -> Result<HashMap<i32, Vec<i32>>, DbErr> {
    let mut map: HashMap<i32, Vec<i32>> = HashMap::new();
    if project_ids.is_empty() {
        return Ok(map);
    }
    let photos = project_photo::Entity::find()
        .filter(project_photo::Column::ProjectId.is_in(project_ids.iter().copied()))
        .order_by_asc(project_photo::Column::Id)
        .all(db)
        .await?;
    for photo in photos {
        map.entry(photo.project_id).or_default().push(photo.id);
    }
    Ok(map)
}

pub async fn images_by_id<C: ConnectionTrait>(
    db: &C,
    image_ids: &[i32],
) -> Result<HashMap<i32, image::Model>, DbErr> {
    if image_ids.is_empty() {
        return Ok(HashMap::new());
    }
    Ok(image::Entity::find()
        .filter(image::Column::Id.is_in(image_ids.iter().copied()))
        .all(db)
        .await?
        .into_iter()
        .map(|image| (image.id, image))
        .collect())
}
