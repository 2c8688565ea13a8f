//! Bidirectional relation bookkeeping for people, projects and photos.
//!
//! [`RelationGraph`] keeps both sides of every link in step in memory;
//! [`UnitOfWork`] loads the affected part of the graph from the database,
//! validates it and writes the touched rows back inside the caller's
//! transaction.

mod graph;
mod unit_of_work;

use sea_orm::DbErr;
use thiserror::Error;

pub use graph::{PersonKey, PhotoKey, ProjectKey, RelationGraph};
pub use unit_of_work::{NewPhoto, NewProject, UnitOfWork};

/// Graph states that must never reach the database.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RelationError {
    #[error("Cannot save project without a foreman")]
    ProjectWithoutForeman,
    #[error("Cannot save project photos without being assigned to a project")]
    PhotoWithoutProject,
    #[error("Cannot save project photos without an image")]
    PhotoWithoutImage,
}

#[derive(Debug, Error)]
pub enum FlushError {
    #[error(transparent)]
    Invariant(#[from] RelationError),
    #[error(transparent)]
    Database(#[from] DbErr),
}
