use serde::{Deserialize, Serialize};

use crate::entity::{Identifier, person};
use crate::error::AppError;
use crate::utils::iri::{ResourceKind, iri};

use super::shared::{Violations, double_option};

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePersonRequest {
    #[schema(example = "Daniel")]
    pub name: Option<String>,
    #[schema(example = "daniel@fake.com")]
    pub email: Option<String>,
    /// IRIs of projects this person leads. Listed projects are taken over
    /// from their current foreman.
    #[serde(default)]
    pub led_projects: Vec<String>,
    /// IRI of the avatar image.
    pub image: Option<String>,
}

/// Update payload. The email address cannot be changed once set.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePersonRequest {
    pub name: Option<String>,
    /// Replaces the full set of led projects when present.
    pub led_projects: Option<Vec<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub image: Option<Option<String>>,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PersonView {
    #[serde(rename = "@id")]
    #[schema(example = "/people/1")]
    pub id: String,
    #[serde(rename = "@type")]
    #[schema(value_type = String, example = "Person")]
    pub kind: &'static str,
    pub name: String,
    pub email: String,
    #[schema(example = json!(["/projects/1"]))]
    pub led_projects: Vec<String>,
    #[schema(example = "/images/1")]
    pub image: Option<String>,
}

impl PersonView {
    pub fn project(model: &person::Model, led_project_ids: &[i32]) -> Self {
        Self {
            id: model.iri(),
            kind: ResourceKind::Person.type_name(),
            name: model.name.clone(),
            email: model.email.clone(),
            led_projects: led_project_ids
                .iter()
                .map(|id| iri(ResourceKind::Project, *id))
                .collect(),
            image: model.image_id.map(|id| iri(ResourceKind::Image, id)),
        }
    }
}

pub fn validate_create_person(req: &CreatePersonRequest) -> Result<(), AppError> {
    let mut v = Violations::new();
    if v.not_null("name", &req.name)
        && let Some(name) = &req.name
    {
        v.not_blank("name", name);
    }
    if v.not_null("email", &req.email)
        && let Some(email) = &req.email
    {
        v.email("email", email);
    }
    v.into_result()
}

pub fn validate_update_person(req: &UpdatePersonRequest) -> Result<(), AppError> {
    let mut v = Violations::new();
    if let Some(name) = &req.name {
        v.not_blank("name", name);
    }
    v.into_result()
}
