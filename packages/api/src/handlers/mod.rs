pub mod buildings;
pub mod entrypoint;
pub mod images;
pub mod media;
pub mod people;
pub mod project_photos;
pub mod projects;
