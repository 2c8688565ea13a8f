use chrono::Utc;
use common::storage::MediaStore;
use sea_orm::*;
use tracing::info;

use crate::entity::{building, image, person};
use crate::error::AppError;
use crate::fixtures::{FIXTURE_PREFIX, fixture_image};
use crate::handlers::images::{ImageSource, store_image};
use crate::relations::{NewPhoto, NewProject, UnitOfWork};

const IMAGE_COUNT: usize = 6;

/// Demo people as (name, email). The first one gets the first image as
/// avatar.
const PEOPLE: &[(&str, &str)] = &[
    ("Simple worker", "daniel@fake.com"),
    ("Person1", "p1@fake.com"),
    ("Person2", "p2@fake.com"),
    ("Person3", "p3@fake.com"),
    ("Person4", "p4@fake.com"),
];

/// Demo projects as (name, index of the foreman in `PEOPLE`).
const PROJECTS: &[(&str, usize)] = &[
    ("Project1", 1),
    ("Project2", 2),
    ("Project3", 3),
    ("Project4", 0),
];

/// Demo photos as (index in `PROJECTS`, index of the image).
const PHOTOS: &[(usize, usize)] = &[(3, 1), (3, 2), (3, 3), (0, 4)];

const BUILDING_COUNT: usize = 5;
const PUBLISHED_BUILDINGS: usize = 2;

/// Populate the database with deterministic demo data.
///
/// On an empty database ids come out in declaration order: images 1 to 6
/// (`fixture-1.png` ...), people 1 to 5, projects 1 to 4, photos 1 to 4 and
/// buildings 1 to 5. Image 6 is not used by anything.
pub async fn seed_fixtures(db: &DatabaseConnection, media: &dyn MediaStore) -> Result<(), AppError> {
    let mut image_ids = Vec::with_capacity(IMAGE_COUNT);
    for n in 1..=IMAGE_COUNT {
        let file = fixture_image()
            .map_err(|e| AppError::Internal(format!("Failed to prepare fixture image: {e}")))?;
        let name = format!("{FIXTURE_PREFIX}-{n}.png");
        let stored = store_image(
            db,
            media,
            ImageSource {
                path: file.path(),
                original_name: &name,
                content_type: "image/png",
                alternate_name: &name,
            },
        )
        .await;
        file.release().await;
        image_ids.push(stored?.id);
    }

    let txn = db.begin().await?;
    let now = Utc::now();
    let mut people = Vec::with_capacity(PEOPLE.len());
    for (i, (name, email)) in PEOPLE.iter().enumerate() {
        let model = person::ActiveModel {
            name: Set((*name).to_string()),
            email: Set((*email).to_string()),
            image_id: Set((i == 0).then_some(image_ids[0])),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        people.push(model.id);
    }

    let mut uow = UnitOfWork::new();
    let mut projects = Vec::with_capacity(PROJECTS.len());
    for (name, foreman) in PROJECTS {
        let project = uow.stage_project(NewProject {
            name: (*name).to_string(),
            description: format!("Description of {name}, seeded as demo data."),
        });
        let person = uow
            .load_person(&txn, people[*foreman])
            .await?
            .ok_or_else(|| AppError::Internal("seeded person vanished".into()))?;
        uow.graph_mut().add_led_project(person, project);
        projects.push(project);
    }
    for (n, (project, image)) in PHOTOS.iter().enumerate() {
        let photo = uow.stage_photo(
            NewPhoto {
                short_description: format!("Demo photo number {}", n + 1),
            },
            Some(image_ids[*image]),
        );
        uow.graph_mut().add_photo(projects[*project], photo);
    }
    uow.flush(&txn).await?;

    for n in 1..=BUILDING_COUNT {
        let published = n <= PUBLISHED_BUILDINGS;
        building::ActiveModel {
            name: Set(format!("Building {n}")),
            description: Set(format!("Description of building {n}")),
            is_published: Set(published),
            date_published: Set(published.then_some(now)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }
    txn.commit().await?;

    info!(
        images = IMAGE_COUNT,
        people = PEOPLE.len(),
        projects = PROJECTS.len(),
        photos = PHOTOS.len(),
        buildings = BUILDING_COUNT,
        "Seeded demo data"
    );
    Ok(())
}

/// Whether the database holds no image and no person yet.
pub async fn is_empty(db: &DatabaseConnection) -> Result<bool, DbErr> {
    let images = image::Entity::find().count(db).await?;
    let people = person::Entity::find().count(db).await?;
    Ok(images == 0 && people == 0)
}
