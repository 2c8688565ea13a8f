use serde_json::json;

use crate::common::{TestApp, routes, seeded};

const UNPUBLISHED: i32 = 3;
const PUBLISHED: i32 = 1;

#[tokio::test]
async fn lists_seeded_buildings() {
    let app = TestApp::spawn().await;

    let res = app.get(routes::BUILDINGS).await;

    assert_eq!(res.status, 200);
    assert_eq!(res.body["@context"], "/contexts/Building");
    assert_eq!(res.body["hydra:totalItems"], seeded::BUILDINGS);
    let first = &res.body["hydra:member"][0];
    assert_eq!(first["name"], "Building 1");
    assert_eq!(first["isPublished"], true);
    assert!(first["datePublished"].is_string());
}

#[tokio::test]
async fn creates_unpublished_building() {
    let app = TestApp::spawn().await;

    let res = app
        .post(
            routes::BUILDINGS,
            &json!({ "name": "Town hall", "description": "Built in 1902" }),
        )
        .await;

    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.body["@type"], "Building");
    assert_eq!(res.body["name"], "Town hall");
    assert_eq!(res.body["isPublished"], false);
    assert!(res.body["datePublished"].is_null());
}

#[tokio::test]
async fn creating_published_sets_the_date() {
    let app = TestApp::spawn().await;

    let res = app
        .post(
            routes::BUILDINGS,
            &json!({ "name": "Town hall", "description": "Built in 1902", "isPublished": true }),
        )
        .await;

    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.body["isPublished"], true);
    assert!(res.body["datePublished"].is_string());
}

#[tokio::test]
async fn name_constraints_are_enforced() {
    let app = TestApp::spawn().await;

    let res = app
        .post(routes::BUILDINGS, &json!({ "name": "Hut", "description": "Small" }))
        .await;
    assert_eq!(res.status, 400);
    assert_eq!(
        res.description(),
        "name: This value is too short. It should have 5 characters or more."
    );

    let res = app
        .post(routes::BUILDINGS, &json!({ "name": "Building 2", "description": "Copy" }))
        .await;
    assert_eq!(res.status, 400);
    assert_eq!(res.description(), "name: This value is already used.");

    let res = app.post(routes::BUILDINGS, &json!({ "name": "Town hall" })).await;
    assert_eq!(res.status, 400);
    assert_eq!(res.description(), "description: This value should not be null.");
}

#[tokio::test]
async fn publishing_sets_date_once() {
    let app = TestApp::spawn().await;

    let res = app
        .put(&routes::building(UNPUBLISHED), &json!({ "isPublished": true }))
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["isPublished"], true);
    assert_eq!(res.body["name"], "Building 3");
    let date = res.body["datePublished"].as_str().unwrap().to_string();

    let res = app
        .put(
            &routes::building(UNPUBLISHED),
            &json!({ "isPublished": true, "description": "Reopened" }),
        )
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["datePublished"], date);
    assert_eq!(res.body["description"], "Reopened");
}

#[tokio::test]
async fn published_building_cannot_be_unpublished() {
    let app = TestApp::spawn().await;

    let res = app
        .put(&routes::building(PUBLISHED), &json!({ "isPublished": false }))
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.description(), "Cannot un-publish building");

    let res = app.get(&routes::building(PUBLISHED)).await;
    assert_eq!(res.body["isPublished"], true);
}

#[tokio::test]
async fn deletes_building() {
    let app = TestApp::spawn().await;

    let res = app.delete(&routes::building(PUBLISHED)).await;
    assert_eq!(res.status, 204);

    assert_eq!(app.get(&routes::building(PUBLISHED)).await.status, 404);
    assert_eq!(app.delete(&routes::building(PUBLISHED)).await.status, 404);
}
