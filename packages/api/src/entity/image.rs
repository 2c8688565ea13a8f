use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// An uploaded image. Its public URL is derived from `file_name` at
/// serialization time and never stored.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "image")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub alternate_name: String,
    /// Generated name of the file inside the media store.
    #[sea_orm(unique)]
    pub file_name: String,
    pub content_type: String,
    pub content_hash: String,
    pub size: i64,

    pub upload_date: DateTimeUtc,

    #[sea_orm(has_many)]
    pub people: HasMany<super::person::Entity>,

    #[sea_orm(has_one)]
    pub project_photo: HasOne<super::project_photo::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
