//! In-memory graph of people, projects and project photos with both sides
//! of every relation kept consistent.
//!
//! Nodes live in arenas and refer to each other through typed keys, so a
//! project knows its foreman and the foreman knows the project without
//! shared ownership. Every mutation marks the nodes it touched; only
//! touched nodes are validated and written back.

use std::collections::HashMap;

use super::RelationError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PersonKey(usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectKey(usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PhotoKey(usize);

#[derive(Debug, Default)]
struct PersonNode {
    id: Option<i32>,
    led_projects: Vec<ProjectKey>,
    removed: bool,
}

#[derive(Debug, Default)]
struct ProjectNode {
    id: Option<i32>,
    foreman: Option<PersonKey>,
    photos: Vec<PhotoKey>,
    removed: bool,
    dirty: bool,
}

#[derive(Debug, Default)]
struct PhotoNode {
    id: Option<i32>,
    project: Option<ProjectKey>,
    image: Option<i32>,
    removed: bool,
    dirty: bool,
}

#[derive(Debug, Default)]
pub struct RelationGraph {
    people: Vec<PersonNode>,
    projects: Vec<ProjectNode>,
    photos: Vec<PhotoNode>,
    person_index: HashMap<i32, PersonKey>,
    project_index: HashMap<i32, ProjectKey>,
    photo_index: HashMap<i32, PhotoKey>,
}

impl RelationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- node creation and lookup ----

    /// Add a person. `id` is `None` for a person not yet persisted.
    pub fn insert_person(&mut self, id: Option<i32>) -> PersonKey {
        let key = PersonKey(self.people.len());
        self.people.push(PersonNode {
            id,
            ..Default::default()
        });
        if let Some(id) = id {
            self.person_index.insert(id, key);
        }
        key
    }

    pub fn insert_project(&mut self, id: Option<i32>) -> ProjectKey {
        let key = ProjectKey(self.projects.len());
        self.projects.push(ProjectNode {
            id,
            dirty: id.is_none(),
            ..Default::default()
        });
        if let Some(id) = id {
            self.project_index.insert(id, key);
        }
        key
    }

    pub fn insert_photo(&mut self, id: Option<i32>, image: Option<i32>) -> PhotoKey {
        let key = PhotoKey(self.photos.len());
        self.photos.push(PhotoNode {
            id,
            image,
            dirty: id.is_none(),
            ..Default::default()
        });
        if let Some(id) = id {
            self.photo_index.insert(id, key);
        }
        key
    }

    pub fn find_person(&self, id: i32) -> Option<PersonKey> {
        self.person_index.get(&id).copied()
    }

    pub fn find_project(&self, id: i32) -> Option<ProjectKey> {
        self.project_index.get(&id).copied()
    }

    pub fn find_photo(&self, id: i32) -> Option<PhotoKey> {
        self.photo_index.get(&id).copied()
    }

    pub fn person_id(&self, person: PersonKey) -> Option<i32> {
        self.people[person.0].id
    }

    pub fn project_id(&self, project: ProjectKey) -> Option<i32> {
        self.projects[project.0].id
    }

    pub fn photo_id(&self, photo: PhotoKey) -> Option<i32> {
        self.photos[photo.0].id
    }

    /// Record the id a new project received when it was inserted.
    pub fn assign_project_id(&mut self, project: ProjectKey, id: i32) {
        self.projects[project.0].id = Some(id);
        self.project_index.insert(id, project);
    }

    pub fn assign_photo_id(&mut self, photo: PhotoKey, id: i32) {
        self.photos[photo.0].id = Some(id);
        self.photo_index.insert(id, photo);
    }

    // ---- reads ----

    pub fn led_projects(&self, person: PersonKey) -> &[ProjectKey] {
        &self.people[person.0].led_projects
    }

    pub fn foreman(&self, project: ProjectKey) -> Option<PersonKey> {
        self.projects[project.0].foreman
    }

    pub fn foreman_id(&self, project: ProjectKey) -> Option<i32> {
        self.foreman(project).and_then(|person| self.person_id(person))
    }

    pub fn photos(&self, project: ProjectKey) -> &[PhotoKey] {
        &self.projects[project.0].photos
    }

    pub fn project_of(&self, photo: PhotoKey) -> Option<ProjectKey> {
        self.photos[photo.0].project
    }

    pub fn image_of(&self, photo: PhotoKey) -> Option<i32> {
        self.photos[photo.0].image
    }

    pub fn is_project_removed(&self, project: ProjectKey) -> bool {
        self.projects[project.0].removed
    }

    pub fn is_photo_removed(&self, photo: PhotoKey) -> bool {
        self.photos[photo.0].removed
    }

    // ---- restoring links read from storage ----

    /// Record an existing foreman link. Nothing is marked dirty.
    pub fn restore_foreman(&mut self, project: ProjectKey, person: PersonKey) {
        self.projects[project.0].foreman = Some(person);
        let led = &mut self.people[person.0].led_projects;
        if !led.contains(&project) {
            led.push(project);
        }
    }

    /// Record an existing photo link. Nothing is marked dirty.
    pub fn restore_photo(&mut self, project: ProjectKey, photo: PhotoKey) {
        self.photos[photo.0].project = Some(project);
        let photos = &mut self.projects[project.0].photos;
        if !photos.contains(&photo) {
            photos.push(photo);
        }
    }

    // ---- person <-> project ----

    /// Make `person` the foreman of `project`, detaching the project from
    /// its previous foreman first. No-op when already linked.
    pub fn add_led_project(&mut self, person: PersonKey, project: ProjectKey) {
        if self.people[person.0].led_projects.contains(&project) {
            return;
        }
        if let Some(previous) = self.projects[project.0].foreman
            && previous != person
        {
            self.people[previous.0].led_projects.retain(|p| *p != project);
        }
        self.people[person.0].led_projects.push(project);
        self.set_foreman(project, person);
    }

    /// Detach `project` from `person`. The project is left without a
    /// foreman, which fails validation unless it gets a new one.
    pub fn remove_led_project(&mut self, person: PersonKey, project: ProjectKey) {
        let led = &mut self.people[person.0].led_projects;
        let Some(position) = led.iter().position(|p| *p == project) else {
            return;
        };
        led.remove(position);
        if self.projects[project.0].foreman == Some(person) {
            self.unassign_foreman(project);
        }
    }

    /// Replace the full set of projects led by `person`.
    pub fn set_led_projects(&mut self, person: PersonKey, projects: &[ProjectKey]) {
        let current = self.people[person.0].led_projects.clone();
        for project in current {
            if !projects.contains(&project) {
                self.remove_led_project(person, project);
            }
        }
        for project in projects {
            self.add_led_project(person, *project);
        }
    }

    // Owning-side mirrors. They only touch the project, so calling them
    // from the person side cannot recurse.
    fn set_foreman(&mut self, project: ProjectKey, person: PersonKey) {
        let node = &mut self.projects[project.0];
        node.foreman = Some(person);
        node.dirty = true;
    }

    fn unassign_foreman(&mut self, project: ProjectKey) {
        let node = &mut self.projects[project.0];
        node.foreman = None;
        node.dirty = true;
    }

    // ---- project <-> photo ----

    /// Attach `photo` to `project`, moving it away from its previous
    /// project if needed. No-op when already attached.
    pub fn add_photo(&mut self, project: ProjectKey, photo: PhotoKey) {
        if self.projects[project.0].photos.contains(&photo) {
            return;
        }
        if let Some(previous) = self.photos[photo.0].project
            && previous != project
        {
            self.projects[previous.0].photos.retain(|p| *p != photo);
        }
        self.projects[project.0].photos.push(photo);
        self.set_project(photo, project);
    }

    /// Detach `photo` from `project`. The photo is left orphaned, which
    /// fails validation unless it is attached elsewhere or removed.
    pub fn remove_photo(&mut self, project: ProjectKey, photo: PhotoKey) {
        let photos = &mut self.projects[project.0].photos;
        let Some(position) = photos.iter().position(|p| *p == photo) else {
            return;
        };
        photos.remove(position);
        if self.photos[photo.0].project == Some(project) {
            self.unassign_project(photo);
        }
    }

    pub fn set_photos(&mut self, project: ProjectKey, photos: &[PhotoKey]) {
        let current = self.projects[project.0].photos.clone();
        for photo in current {
            if !photos.contains(&photo) {
                self.remove_photo(project, photo);
            }
        }
        for photo in photos {
            self.add_photo(project, *photo);
        }
    }

    fn set_project(&mut self, photo: PhotoKey, project: ProjectKey) {
        let node = &mut self.photos[photo.0];
        node.project = Some(project);
        node.dirty = true;
    }

    fn unassign_project(&mut self, photo: PhotoKey) {
        let node = &mut self.photos[photo.0];
        node.project = None;
        node.dirty = true;
    }

    pub fn set_photo_image(&mut self, photo: PhotoKey, image: Option<i32>) {
        let node = &mut self.photos[photo.0];
        if node.image != image {
            node.image = image;
            node.dirty = true;
        }
    }

    // ---- removal ----

    /// Remove a project together with all of its photos.
    pub fn remove_project(&mut self, project: ProjectKey) {
        let photos = std::mem::take(&mut self.projects[project.0].photos);
        for photo in photos {
            let node = &mut self.photos[photo.0];
            node.project = None;
            node.removed = true;
            node.dirty = true;
        }
        if let Some(foreman) = self.projects[project.0].foreman {
            self.people[foreman.0].led_projects.retain(|p| *p != project);
        }
        let node = &mut self.projects[project.0];
        node.foreman = None;
        node.removed = true;
        node.dirty = true;
    }

    /// Remove a single photo, detaching it from its project.
    pub fn remove_photo_entity(&mut self, photo: PhotoKey) {
        if let Some(project) = self.photos[photo.0].project {
            self.remove_photo(project, photo);
        }
        let node = &mut self.photos[photo.0];
        node.removed = true;
        node.dirty = true;
    }

    /// Remove a person. Any project they still lead is left without a
    /// foreman, so this only validates for people leading nothing.
    pub fn remove_person(&mut self, person: PersonKey) {
        let led = self.people[person.0].led_projects.clone();
        for project in led {
            self.remove_led_project(person, project);
        }
        self.people[person.0].removed = true;
    }

    // ---- persistence support ----

    /// Check the invariants of every touched node.
    pub fn validate(&self) -> Result<(), RelationError> {
        for node in self.projects.iter().filter(|n| n.dirty && !n.removed) {
            if node.foreman.is_none() {
                return Err(RelationError::ProjectWithoutForeman);
            }
        }
        for node in self.photos.iter().filter(|n| n.dirty && !n.removed) {
            if node.project.is_none() {
                return Err(RelationError::PhotoWithoutProject);
            }
            if node.image.is_none() {
                return Err(RelationError::PhotoWithoutImage);
            }
        }
        Ok(())
    }

    pub fn dirty_projects(&self) -> Vec<ProjectKey> {
        self.projects
            .iter()
            .enumerate()
            .filter(|(_, n)| n.dirty)
            .map(|(i, _)| ProjectKey(i))
            .collect()
    }

    pub fn dirty_photos(&self) -> Vec<PhotoKey> {
        self.photos
            .iter()
            .enumerate()
            .filter(|(_, n)| n.dirty)
            .map(|(i, _)| PhotoKey(i))
            .collect()
    }

    pub fn removed_people(&self) -> Vec<PersonKey> {
        self.people
            .iter()
            .enumerate()
            .filter(|(_, n)| n.removed)
            .map(|(i, _)| PersonKey(i))
            .collect()
    }

    /// Forget pending changes after they were written.
    pub fn mark_clean(&mut self) {
        self.projects.iter_mut().for_each(|n| n.dirty = false);
        self.photos.iter_mut().for_each(|n| n.dirty = false);
    }
}
