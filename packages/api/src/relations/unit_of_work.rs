use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ActiveValue::Unchanged, ColumnTrait, ConnectionTrait,
    DbErr, EntityTrait, QueryFilter, QueryOrder,
};

use super::graph::{PersonKey, PhotoKey, ProjectKey, RelationGraph};
use super::{FlushError, RelationError};
use crate::entity::{person, project, project_photo};

/// Column values of a project created through the graph.
#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct NewPhoto {
    pub short_description: String,
}

/// Loads part of the relation graph, collects changes and writes them back.
///
/// All loads and the final [`flush`](Self::flush) should run on the same
/// transaction so that the graph reflects what gets committed.
#[derive(Debug, Default)]
pub struct UnitOfWork {
    graph: RelationGraph,
    loaded_people: HashSet<i32>,
    staged_projects: HashMap<ProjectKey, NewProject>,
    staged_photos: HashMap<PhotoKey, NewPhoto>,
}

impl UnitOfWork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn graph(&self) -> &RelationGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut RelationGraph {
        &mut self.graph
    }

    /// Load a person together with every project they lead.
    pub async fn load_person<C: ConnectionTrait>(
        &mut self,
        db: &C,
        id: i32,
    ) -> Result<Option<PersonKey>, DbErr> {
        if self.loaded_people.contains(&id) {
            return Ok(self.graph.find_person(id));
        }
        if person::Entity::find_by_id(id).one(db).await?.is_none() {
            return Ok(None);
        }

        let key = self.person_node(id);
        let led = project::Entity::find()
            .filter(project::Column::ForemanId.eq(id))
            .order_by_asc(project::Column::Id)
            .all(db)
            .await?;
        for model in led {
            self.attach_project(db, model).await?;
        }

        self.loaded_people.insert(id);
        Ok(Some(key))
    }

    /// Load a project with its foreman and photos.
    pub async fn load_project<C: ConnectionTrait>(
        &mut self,
        db: &C,
        id: i32,
    ) -> Result<Option<ProjectKey>, DbErr> {
        if let Some(key) = self.graph.find_project(id) {
            return Ok(Some(key));
        }
        match project::Entity::find_by_id(id).one(db).await? {
            Some(model) => self.attach_project(db, model).await.map(Some),
            None => Ok(None),
        }
    }

    /// Load a photo along with the project that currently owns it.
    pub async fn load_photo<C: ConnectionTrait>(
        &mut self,
        db: &C,
        id: i32,
    ) -> Result<Option<PhotoKey>, DbErr> {
        if let Some(key) = self.graph.find_photo(id) {
            return Ok(Some(key));
        }
        let Some(model) = project_photo::Entity::find_by_id(id).one(db).await? else {
            return Ok(None);
        };
        self.load_project(db, model.project_id).await?;
        Ok(self.graph.find_photo(id))
    }

    /// Add a project that does not exist yet. It is inserted on flush.
    pub fn stage_project(&mut self, new: NewProject) -> ProjectKey {
        let key = self.graph.insert_project(None);
        self.staged_projects.insert(key, new);
        key
    }

    pub fn stage_photo(&mut self, new: NewPhoto, image_id: Option<i32>) -> PhotoKey {
        let key = self.graph.insert_photo(None, image_id);
        self.staged_photos.insert(key, new);
        key
    }

    fn person_node(&mut self, id: i32) -> PersonKey {
        match self.graph.find_person(id) {
            Some(key) => key,
            None => self.graph.insert_person(Some(id)),
        }
    }

    // A project already in the graph keeps its in-memory links, which may
    // differ from what is stored.
    async fn attach_project<C: ConnectionTrait>(
        &mut self,
        db: &C,
        model: project::Model,
    ) -> Result<ProjectKey, DbErr> {
        if let Some(key) = self.graph.find_project(model.id) {
            return Ok(key);
        }

        let key = self.graph.insert_project(Some(model.id));
        let foreman = self.person_node(model.foreman_id);
        self.graph.restore_foreman(key, foreman);

        let photos = project_photo::Entity::find()
            .filter(project_photo::Column::ProjectId.eq(model.id))
            .order_by_asc(project_photo::Column::Id)
            .all(db)
            .await?;
        for photo in photos {
            if self.graph.find_photo(photo.id).is_none() {
                let photo_key = self.graph.insert_photo(Some(photo.id), Some(photo.image_id));
                self.graph.restore_photo(key, photo_key);
            }
        }
        Ok(key)
    }

    /// Validate the graph and write every touched row.
    ///
    /// Nothing is written when validation fails.
    pub async fn flush<C: ConnectionTrait>(&mut self, db: &C) -> Result<(), FlushError> {
        self.graph.validate()?;
        let now = Utc::now();

        for key in self.graph.dirty_projects() {
            if self.graph.is_project_removed(key) {
                continue;
            }
            let foreman_id = self
                .graph
                .foreman_id(key)
                .ok_or(RelationError::ProjectWithoutForeman)?;

            match self.graph.project_id(key) {
                Some(id) => {
                    project::ActiveModel {
                        id: Unchanged(id),
                        foreman_id: Set(foreman_id),
                        updated_at: Set(now),
                        ..Default::default()
                    }
                    .update(db)
                    .await?;
                }
                None => {
                    let Some(new) = self.staged_projects.remove(&key) else {
                        continue;
                    };
                    let model = project::ActiveModel {
                        name: Set(new.name),
                        description: Set(new.description),
                        foreman_id: Set(foreman_id),
                        created_at: Set(now),
                        updated_at: Set(now),
                        ..Default::default()
                    }
                    .insert(db)
                    .await?;
                    tracing::debug!(project_id = model.id, foreman_id, "Inserted project");
                    self.graph.assign_project_id(key, model.id);
                }
            }
        }

        for key in self.graph.dirty_photos() {
            if self.graph.is_photo_removed(key) {
                continue;
            }
            let project_id = self
                .graph
                .project_of(key)
                .and_then(|project| self.graph.project_id(project))
                .ok_or(RelationError::PhotoWithoutProject)?;
            let image_id = self
                .graph
                .image_of(key)
                .ok_or(RelationError::PhotoWithoutImage)?;

            match self.graph.photo_id(key) {
                Some(id) => {
                    project_photo::ActiveModel {
                        id: Unchanged(id),
                        project_id: Set(project_id),
                        image_id: Set(image_id),
                        updated_at: Set(now),
                        ..Default::default()
                    }
                    .update(db)
                    .await?;
                }
                None => {
                    let Some(new) = self.staged_photos.remove(&key) else {
                        continue;
                    };
                    let model = project_photo::ActiveModel {
                        short_description: Set(new.short_description),
                        project_id: Set(project_id),
                        image_id: Set(image_id),
                        created_at: Set(now),
                        updated_at: Set(now),
                        ..Default::default()
                    }
                    .insert(db)
                    .await?;
                    self.graph.assign_photo_id(key, model.id);
                }
            }
        }

        // Children before parents so foreign keys stay satisfied.
        for key in self.graph.dirty_photos() {
            if let (true, Some(id)) = (self.graph.is_photo_removed(key), self.graph.photo_id(key)) {
                project_photo::Entity::delete_by_id(id).exec(db).await?;
            }
        }
        for key in self.graph.dirty_projects() {
            if let (true, Some(id)) = (
                self.graph.is_project_removed(key),
                self.graph.project_id(key),
            ) {
                project::Entity::delete_by_id(id).exec(db).await?;
                tracing::debug!(project_id = id, "Deleted project");
            }
        }
        for key in self.graph.removed_people() {
            if let Some(id) = self.graph.person_id(key) {
                person::Entity::delete_by_id(id).exec(db).await?;
            }
        }

        self.graph.mark_clean();
        Ok(())
    }
}
