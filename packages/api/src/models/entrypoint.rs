use serde::Serialize;

use crate::utils::iri::ResourceKind;

/// The API entry point document listing every collection.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Entrypoint {
    #[serde(rename = "@context")]
    #[schema(example = "/contexts/Entrypoint")]
    pub context: String,
    #[serde(rename = "@id")]
    #[schema(example = "/")]
    pub id: String,
    #[serde(rename = "@type")]
    #[schema(example = "Entrypoint")]
    pub kind: String,
    #[schema(example = "/buildings")]
    pub building: String,
    #[schema(example = "/images")]
    pub image: String,
    #[schema(example = "/people")]
    pub person: String,
    #[schema(example = "/projects")]
    pub project: String,
    #[schema(example = "/project_photos")]
    pub project_photo: String,
}

impl Default for Entrypoint {
    fn default() -> Self {
        Self {
            context: "/contexts/Entrypoint".into(),
            id: "/".into(),
            kind: "Entrypoint".into(),
            building: ResourceKind::Building.collection().into(),
            image: ResourceKind::Image.collection().into(),
            person: ResourceKind::Person.collection().into(),
            project: ResourceKind::Project.collection().into(),
            project_photo: ResourceKind::ProjectPhoto.collection().into(),
        }
    }
}
