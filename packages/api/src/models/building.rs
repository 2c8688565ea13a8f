use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::{Identifier, building};
use crate::error::AppError;
use crate::utils::iri::ResourceKind;

use super::shared::Violations;

const NAME_MIN: usize = 5;
const NAME_MAX: usize = 50;

/// Create and replace payload.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BuildingRequest {
    #[schema(example = "Town hall")]
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_published: Option<bool>,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BuildingView {
    #[serde(rename = "@id")]
    #[schema(example = "/buildings/1")]
    pub id: String,
    #[serde(rename = "@type")]
    #[schema(value_type = String, example = "Building")]
    pub kind: &'static str,
    pub name: String,
    pub description: String,
    pub is_published: bool,
    pub date_published: Option<DateTime<Utc>>,
}

impl BuildingView {
    pub fn project(model: &building::Model) -> Self {
        Self {
            id: model.iri(),
            kind: ResourceKind::Building.type_name(),
            name: model.name.clone(),
            description: model.description.clone(),
            is_published: model.is_published,
            date_published: model.date_published,
        }
    }
}

/// `partial` skips null checks for members absent from a replace body.
pub fn validate_building(req: &BuildingRequest, partial: bool) -> Result<(), AppError> {
    let mut v = Violations::new();
    match &req.name {
        Some(name) => {
            if v.not_blank("name", name) {
                v.length("name", name, Some(NAME_MIN), Some(NAME_MAX));
            }
        }
        None if !partial => {
            v.not_null("name", &req.name);
        }
        None => {}
    }
    match &req.description {
        Some(description) => {
            v.not_blank("description", description);
        }
        None if !partial => {
            v.not_null("description", &req.description);
        }
        None => {}
    }
    v.into_result()
}

/// Publication state after applying `requested` to a building currently
/// in `current` state. Returns the new flag and publication date.
pub fn apply_publication(
    current: bool,
    date_published: Option<DateTime<Utc>>,
    requested: Option<bool>,
    now: DateTime<Utc>,
) -> Result<(bool, Option<DateTime<Utc>>), AppError> {
    match requested {
        None => Ok((current, date_published)),
        Some(false) if current => Err(AppError::InvariantViolation(
            "Cannot un-publish building".into(),
        )),
        Some(false) => Ok((false, date_published)),
        Some(true) => Ok((true, date_published.or(Some(now)))),
    }
}
