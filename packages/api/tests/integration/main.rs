mod buildings;
mod entrypoint;
mod images;
mod people;
mod projects;
