pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod fixtures;
pub mod handlers;
pub mod models;
pub mod relations;
pub mod routes;
pub mod seed;
pub mod state;
pub mod utils;

use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::CorsConfig;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Hammer API",
        version = "1.0.0",
        description = "JSON-LD API for construction projects, their foremen, photos and images"
    ),
    tags(
        (name = "Entrypoint", description = "API entry point and JSON-LD contexts"),
        (name = "People", description = "People and the projects they lead"),
        (name = "Projects", description = "Projects, their foreman and photos"),
        (name = "Project Photos", description = "Images attached to projects"),
        (name = "Images", description = "Image upload and management"),
        (name = "Media", description = "Stored image files"),
        (name = "Buildings", description = "Building CRUD operations"),
    ),
)]
struct ApiDoc;

/// CORS layer for the configured origins. Origins that are not valid
/// header values are skipped.
pub fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allow_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Ignoring invalid CORS origin '{origin}': {e}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::IF_NONE_MATCH])
        .expose_headers([header::ETAG])
        .max_age(Duration::from_secs(config.max_age))
}

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(routes::api_routes())
        .split_for_parts();

    let body_limit = state.config.storage.body_limit();
    let cors = build_cors_layer(&state.config.server.cors);

    router
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/docs.json", api.clone()))
        .merge(Scalar::with_url("/scalar", api))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
