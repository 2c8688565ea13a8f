use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::{Identifier, image, project_photo};
use crate::error::AppError;
use crate::utils::content_url::ContentUrlResolver;
use crate::utils::iri::{ResourceKind, iri};

use super::shared::{Violations, double_option};

const SHORT_DESCRIPTION_MIN: usize = 10;
const SHORT_DESCRIPTION_MAX: usize = 255;

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectPhotoRequest {
    #[schema(example = "North side after the first week")]
    pub short_description: Option<String>,
    /// IRI of the image shown by this photo.
    #[schema(example = "/images/1")]
    pub photo: Option<String>,
    #[schema(example = "/projects/1")]
    pub project: Option<String>,
}

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectPhotoRequest {
    pub short_description: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub photo: Option<Option<String>>,
    /// Moves the photo to another project. `null` is refused on save.
    #[serde(default, deserialize_with = "double_option")]
    pub project: Option<Option<String>>,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPhotoView {
    #[serde(rename = "@id")]
    #[schema(example = "/project_photos/1")]
    pub id: String,
    #[serde(rename = "@type")]
    #[schema(value_type = String, example = "ProjectPhoto")]
    pub kind: &'static str,
    pub short_description: String,
    #[schema(example = "/images/1")]
    pub photo: String,
    #[schema(example = "/projects/1")]
    pub project: String,
    /// Alternate name of the image.
    pub name: Option<String>,
    /// Public URL of the image file.
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectPhotoView {
    pub fn project(
        model: &project_photo::Model,
        image: Option<&image::Model>,
        urls: &ContentUrlResolver,
    ) -> Self {
        Self {
            id: model.iri(),
            kind: ResourceKind::ProjectPhoto.type_name(),
            short_description: model.short_description.clone(),
            photo: iri(ResourceKind::Image, model.image_id),
            project: iri(ResourceKind::Project, model.project_id),
            name: image.map(|i| i.alternate_name.clone()),
            url: image.map(|i| urls.resolve(&i.file_name)),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

fn check_short_description(v: &mut Violations, value: &str) {
    v.length(
        "shortDescription",
        value,
        Some(SHORT_DESCRIPTION_MIN),
        Some(SHORT_DESCRIPTION_MAX),
    );
}

pub fn validate_create_project_photo(req: &CreateProjectPhotoRequest) -> Result<(), AppError> {
    let mut v = Violations::new();
    v.not_null("project", &req.project);
    v.not_null("photo", &req.photo);
    if v.not_null("shortDescription", &req.short_description)
        && let Some(value) = &req.short_description
    {
        check_short_description(&mut v, value);
    }
    v.into_result()
}

pub fn validate_update_project_photo(req: &UpdateProjectPhotoRequest) -> Result<(), AppError> {
    let mut v = Violations::new();
    if let Some(value) = &req.short_description {
        check_short_description(&mut v, value);
    }
    v.into_result()
}
