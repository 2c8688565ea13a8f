pub mod building;
pub mod context;
pub mod entrypoint;
pub mod hydra;
pub mod image;
pub mod person;
pub mod project;
pub mod project_photo;
pub mod shared;

pub use hydra::{Document, HydraCollection, JsonLd, LD_JSON, PAGE_SIZE};
