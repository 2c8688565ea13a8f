use axum::{
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::AppError;
use crate::utils::iri::ResourceKind;

pub const LD_JSON: &str = "application/ld+json; charset=utf-8";

/// Items per collection page.
pub const PAGE_SIZE: u64 = 30;

/// A JSON-LD response with an explicit status code.
pub struct JsonLd<T> {
    status: StatusCode,
    body: T,
}

impl<T> JsonLd<T> {
    pub fn ok(body: T) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }

    pub fn created(body: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            body,
        }
    }
}

impl<T: Serialize> IntoResponse for JsonLd<T> {
    fn into_response(self) -> Response {
        match serde_json::to_vec(&self.body) {
            Ok(bytes) => (
                self.status,
                [(header::CONTENT_TYPE, HeaderValue::from_static(LD_JSON))],
                bytes,
            )
                .into_response(),
            Err(e) => AppError::Internal(format!("Failed to serialize response: {e}")).into_response(),
        }
    }
}

/// A top-level item document: the item view plus its `@context`.
#[derive(Serialize)]
pub struct Document<T> {
    #[serde(rename = "@context")]
    pub context: String,
    #[serde(flatten)]
    pub item: T,
}

impl<T> Document<T> {
    pub fn new(kind: ResourceKind, item: T) -> Self {
        Self {
            context: kind.context(),
            item,
        }
    }
}

/// A paged `hydra:Collection` document.
#[derive(Serialize)]
pub struct HydraCollection<T> {
    #[serde(rename = "@context")]
    pub context: String,
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type")]
    pub kind: &'static str,
    #[serde(rename = "hydra:member")]
    pub member: Vec<T>,
    #[serde(rename = "hydra:totalItems")]
    pub total_items: u64,
    #[serde(rename = "hydra:view", skip_serializing_if = "Option::is_none")]
    pub view: Option<HydraView>,
}

#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct HydraView {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type")]
    pub kind: &'static str,
    #[serde(rename = "hydra:first")]
    pub first: String,
    #[serde(rename = "hydra:last")]
    pub last: String,
    #[serde(rename = "hydra:previous", skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    #[serde(rename = "hydra:next", skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

impl<T> HydraCollection<T> {
    /// `path` is the collection path the page was requested under, which
    /// differs from the resource collection for subresources.
    pub fn new(kind: ResourceKind, path: &str, member: Vec<T>, total_items: u64, page: u64) -> Self {
        Self {
            context: kind.context(),
            id: path.to_string(),
            kind: "hydra:Collection",
            member,
            total_items,
            view: HydraView::for_page(path, page, total_items),
        }
    }
}

impl HydraView {
    /// Paging links, present only when the collection spans several pages.
    pub fn for_page(path: &str, page: u64, total_items: u64) -> Option<Self> {
        let last_page = total_items.div_ceil(PAGE_SIZE).max(1);
        if last_page <= 1 {
            return None;
        }
        let link = |n: u64| format!("{path}?page={n}");
        Some(Self {
            id: link(page),
            kind: "hydra:PartialCollectionView",
            first: link(1),
            last: link(last_page),
            previous: (page > 1).then(|| link(page - 1)),
            next: (page < last_page).then(|| link(page + 1)),
        })
    }
}
