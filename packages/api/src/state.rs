use std::sync::Arc;

use common::storage::MediaStore;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::extractors::origin::RequestOrigin;
use crate::utils::content_url::ContentUrlResolver;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    pub media: Arc<dyn MediaStore>,
}

impl AppState {
    /// Content URL resolver bound to the origin of the current request.
    pub fn content_urls(&self, origin: &RequestOrigin) -> ContentUrlResolver {
        ContentUrlResolver::new(origin, &self.config.storage.public_path)
    }
}
