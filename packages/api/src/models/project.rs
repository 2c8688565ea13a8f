use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::{Identifier, project};
use crate::error::AppError;
use crate::utils::iri::{ResourceKind, iri};

use super::shared::{Violations, double_option};

const DESCRIPTION_MIN: usize = 10;
const DESCRIPTION_MAX: usize = 10_000;

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    #[schema(example = "Bridge repair")]
    pub name: Option<String>,
    #[schema(example = "Replace the deck planks on the north bridge.")]
    pub description: Option<String>,
    /// IRI of the person leading the project.
    #[schema(example = "/people/1")]
    pub foreman: Option<String>,
    /// IRIs of existing photos to move onto the new project.
    #[serde(default)]
    pub photos: Vec<String>,
}

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    /// `null` unassigns the foreman, which is refused on save.
    #[serde(default, deserialize_with = "double_option")]
    pub foreman: Option<Option<String>>,
    /// Replaces the full set of photos when present.
    pub photos: Option<Vec<String>>,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectView {
    #[serde(rename = "@id")]
    #[schema(example = "/projects/1")]
    pub id: String,
    #[serde(rename = "@type")]
    #[schema(value_type = String, example = "Project")]
    pub kind: &'static str,
    pub name: String,
    pub description: String,
    #[schema(example = "/people/1")]
    pub foreman: String,
    #[schema(example = json!(["/project_photos/1"]))]
    pub photos: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectView {
    pub fn project(model: &project::Model, photo_ids: &[i32]) -> Self {
        Self {
            id: model.iri(),
            kind: ResourceKind::Project.type_name(),
            name: model.name.clone(),
            description: model.description.clone(),
            foreman: iri(ResourceKind::Person, model.foreman_id),
            photos: photo_ids
                .iter()
                .map(|id| iri(ResourceKind::ProjectPhoto, *id))
                .collect(),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

fn check_name(v: &mut Violations, name: &str) {
    v.not_blank("name", name);
}

fn check_description(v: &mut Violations, description: &str) {
    if v.not_blank("description", description) {
        v.length(
            "description",
            description,
            Some(DESCRIPTION_MIN),
            Some(DESCRIPTION_MAX),
        );
    }
}

pub fn validate_create_project(req: &CreateProjectRequest) -> Result<(), AppError> {
    let mut v = Violations::new();
    if v.not_null("name", &req.name)
        && let Some(name) = &req.name
    {
        check_name(&mut v, name);
    }
    if v.not_null("description", &req.description)
        && let Some(description) = &req.description
    {
        check_description(&mut v, description);
    }
    v.not_null("foreman", &req.foreman);
    v.into_result()
}

pub fn validate_update_project(req: &UpdateProjectRequest) -> Result<(), AppError> {
    let mut v = Violations::new();
    if let Some(name) = &req.name {
        check_name(&mut v, name);
    }
    if let Some(description) = &req.description {
        check_description(&mut v, description);
    }
    v.into_result()
}
