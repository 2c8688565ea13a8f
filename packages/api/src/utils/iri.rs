//! Resource identifiers in the `/{collection}/{id}` form used by every
//! JSON-LD document and by relation fields in request bodies.

use std::fmt;

use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Building,
    Image,
    Person,
    Project,
    ProjectPhoto,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Building,
        ResourceKind::Image,
        ResourceKind::Person,
        ResourceKind::Project,
        ResourceKind::ProjectPhoto,
    ];

    /// Collection path, which is also the IRI prefix of every item.
    pub fn collection(self) -> &'static str {
        match self {
            ResourceKind::Building => "/buildings",
            ResourceKind::Image => "/images",
            ResourceKind::Person => "/people",
            ResourceKind::Project => "/projects",
            ResourceKind::ProjectPhoto => "/project_photos",
        }
    }

    pub fn short_name(self) -> &'static str {
        match self {
            ResourceKind::Building => "Building",
            ResourceKind::Image => "Image",
            ResourceKind::Person => "Person",
            ResourceKind::Project => "Project",
            ResourceKind::ProjectPhoto => "ProjectPhoto",
        }
    }

    /// Value of `@type` on item documents.
    pub fn type_name(self) -> &'static str {
        match self {
            ResourceKind::Image => "http://schema.org/ImageObject",
            other => other.short_name(),
        }
    }

    /// Key naming this resource in the API entry point.
    pub fn entrypoint_key(self) -> &'static str {
        match self {
            ResourceKind::Building => "building",
            ResourceKind::Image => "image",
            ResourceKind::Person => "person",
            ResourceKind::Project => "project",
            ResourceKind::ProjectPhoto => "projectPhoto",
        }
    }

    pub fn context(self) -> String {
        format!("/contexts/{}", self.short_name())
    }

    pub fn from_short_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.short_name() == name)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IriError {
    #[error("Invalid IRI \"{0}\".")]
    Invalid(String),
    #[error("Item not found for \"{0}\".")]
    NotFound(String),
}

pub fn iri(kind: ResourceKind, id: i32) -> String {
    format!("{}/{}", kind.collection(), id)
}

/// Resolve an item IRI of the given kind to its numeric id.
///
/// Absolute IRIs (`http://host/people/3`) are accepted as well as the
/// relative form. Whether the item exists is left to the caller.
pub fn parse_iri(kind: ResourceKind, value: &str) -> Result<i32, IriError> {
    let path = match value.find("://") {
        Some(scheme_end) => {
            let rest = &value[scheme_end + 3..];
            rest.find('/').map_or("", |slash| &rest[slash..])
        }
        None => value,
    };

    path.strip_prefix(kind.collection())
        .and_then(|rest| rest.strip_prefix('/'))
        .and_then(|id| id.parse::<i32>().ok())
        .filter(|id| *id > 0)
        .ok_or_else(|| IriError::Invalid(value.to_string()))
}
