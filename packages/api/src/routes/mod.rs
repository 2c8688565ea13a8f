use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers::{buildings, entrypoint, images, media, people, project_photos, projects};
use crate::state::AppState;

pub fn api_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(entrypoint::get_entrypoint))
        .routes(routes!(entrypoint::get_context))
        .merge(people_routes())
        .merge(project_routes())
        .merge(project_photo_routes())
        .merge(image_routes())
        .merge(building_routes())
}

fn people_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(people::list_people, people::create_person))
        .routes(routes!(
            people::get_person,
            people::update_person,
            people::delete_person
        ))
}

fn project_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(projects::list_projects, projects::create_project))
        .routes(routes!(
            projects::get_project,
            projects::update_project,
            projects::delete_project
        ))
        .routes(routes!(projects::list_photos_of_project))
}

fn project_photo_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            project_photos::list_project_photos,
            project_photos::create_project_photo
        ))
        .routes(routes!(
            project_photos::get_project_photo,
            project_photos::update_project_photo,
            project_photos::delete_project_photo
        ))
}

fn image_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(images::list_images, images::create_image))
        .routes(routes!(
            images::get_image,
            images::update_image,
            images::delete_image
        ))
        .routes(routes!(media::get_media_file))
}

fn building_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(buildings::list_buildings, buildings::create_building))
        .routes(routes!(
            buildings::get_building,
            buildings::update_building,
            buildings::delete_building
        ))
}
