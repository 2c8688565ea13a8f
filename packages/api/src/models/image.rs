use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::IntoParams;

use crate::entity::{Identifier, image};
use crate::error::AppError;
use crate::extractors::upload::UploadedFile;
use crate::utils::content_url::ContentUrlResolver;
use crate::utils::iri::ResourceKind;

use super::shared::{Violations, checked_page};

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageView {
    #[serde(rename = "@id")]
    #[schema(example = "/images/1")]
    pub id: String,
    #[serde(rename = "@type")]
    #[schema(value_type = String, example = "http://schema.org/ImageObject")]
    pub kind: &'static str,
    #[schema(example = "http://localhost/media/images/fixture-1-3f2a9c0d1b2e.png")]
    pub content_url: String,
    #[schema(example = "fixture-1.png")]
    pub alternate_name: String,
    pub upload_date: DateTime<Utc>,
}

impl ImageView {
    pub fn project(model: &image::Model, urls: &ContentUrlResolver) -> Self {
        Self {
            id: model.iri(),
            kind: ResourceKind::Image.type_name(),
            content_url: urls.resolve(&model.file_name),
            alternate_name: model.alternate_name.clone(),
            upload_date: model.upload_date,
        }
    }
}

/// Image fields accepted next to the uploaded file.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageInput {
    alternate_name: Option<String>,
}

/// An image built from an upload request, ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDraft {
    pub alternate_name: Option<String>,
}

impl ImageDraft {
    /// Build the draft from the body fields that came with the file.
    pub fn denormalize(fields: Map<String, Value>) -> Result<Self, AppError> {
        let input: ImageInput = serde_json::from_value(Value::Object(fields)).map_err(|e| {
            tracing::debug!("Image denormalization failed: {e}");
            AppError::Denormalization("Cannot create image from given input".into())
        })?;
        Ok(Self {
            alternate_name: input.alternate_name,
        })
    }

    /// Attach the uploaded file. An unset alternate name defaults to the
    /// client's original file name.
    pub fn attach_file(mut self, file: &UploadedFile) -> Result<AttachedImage, AppError> {
        let alternate_name = match self.alternate_name.take() {
            Some(name) => name,
            None => file.original_name().to_string(),
        };

        let mut v = Violations::new();
        v.not_blank("alternateName", &alternate_name);
        v.into_result()?;

        Ok(AttachedImage {
            alternate_name,
            content_type: file.content_type().to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachedImage {
    pub alternate_name: String,
    pub content_type: String,
}

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateImageRequest {
    #[schema(example = "north-bridge.png")]
    pub alternate_name: Option<String>,
}

pub fn validate_update_image(req: &UpdateImageRequest) -> Result<(), AppError> {
    let mut v = Violations::new();
    if let Some(name) = &req.alternate_name {
        v.not_blank("alternateName", name);
    }
    v.into_result()
}

/// Collection query: paging plus an upload date filter.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ImageListQuery {
    pub page: Option<u64>,
    #[serde(rename = "uploadDate[after]")]
    pub after: Option<String>,
    #[serde(rename = "uploadDate[before]")]
    pub before: Option<String>,
    #[serde(rename = "uploadDate[strictly_after]")]
    pub strictly_after: Option<String>,
    #[serde(rename = "uploadDate[strictly_before]")]
    pub strictly_before: Option<String>,
}

/// Bounds of the upload date filter, parsed.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct UploadDateFilter {
    pub after: Option<DateTime<Utc>>,
    pub before: Option<DateTime<Utc>>,
    pub strictly_after: Option<DateTime<Utc>>,
    pub strictly_before: Option<DateTime<Utc>>,
}

impl ImageListQuery {
    pub fn page(&self) -> Result<u64, AppError> {
        checked_page(self.page)
    }

    pub fn upload_date_filter(&self) -> Result<UploadDateFilter, AppError> {
        Ok(UploadDateFilter {
            after: parse_date("uploadDate[after]", self.after.as_deref())?,
            before: parse_date("uploadDate[before]", self.before.as_deref())?,
            strictly_after: parse_date("uploadDate[strictly_after]", self.strictly_after.as_deref())?,
            strictly_before: parse_date(
                "uploadDate[strictly_before]",
                self.strictly_before.as_deref(),
            )?,
        })
    }
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates (midnight UTC).
fn parse_date(param: &str, value: Option<&str>) -> Result<Option<DateTime<Utc>>, AppError> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| Some(dt.and_utc()))
        .ok_or_else(|| AppError::ConstraintViolation(format!("{param}: This value is not a valid date.")))
}
