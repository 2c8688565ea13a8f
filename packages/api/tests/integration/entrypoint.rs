use crate::common::{TestApp, routes};

#[tokio::test]
async fn entrypoint_lists_every_collection() {
    let app = TestApp::spawn().await;

    let res = app.get(routes::ENTRYPOINT).await;

    assert_eq!(res.status, 200);
    assert_eq!(
        res.header("content-type"),
        Some("application/ld+json; charset=utf-8")
    );
    assert_eq!(res.body["@context"], "/contexts/Entrypoint");
    assert_eq!(res.body["@id"], "/");
    assert_eq!(res.body["@type"], "Entrypoint");
    assert_eq!(res.body["person"], "/people");
    assert_eq!(res.body["project"], "/projects");
    assert_eq!(res.body["projectPhoto"], "/project_photos");
    assert_eq!(res.body["image"], "/images");
    assert_eq!(res.body["building"], "/buildings");
}

#[tokio::test]
async fn contexts_are_served_for_known_resources() {
    let app = TestApp::spawn().await;

    let res = app.get(&routes::context("Project")).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["@context"]["foreman"]["@type"], "@id");

    let res = app.get(&routes::context("Entrypoint")).await;
    assert_eq!(res.status, 200);

    let res = app.get(&routes::context("Unknown")).await;
    assert_eq!(res.status, 404);
    assert_eq!(res.body["@type"], "hydra:Error");
}

#[tokio::test]
async fn missing_items_yield_hydra_errors() {
    let app = TestApp::spawn().await;

    for path in [
        routes::person(999),
        routes::project(999),
        routes::project_photo(999),
        routes::image(999),
        routes::building(999),
    ] {
        let res = app.get(&path).await;
        assert_eq!(res.status, 404, "{path}");
        assert_eq!(res.body["@context"], "/contexts/Error");
        assert_eq!(res.body["@type"], "hydra:Error");
        assert_eq!(res.body["hydra:title"], "An error occurred");
        assert_eq!(res.description(), "Not Found");
    }
}

#[tokio::test]
async fn openapi_document_is_published() {
    let app = TestApp::spawn().await;

    let res = app.get("/docs.json").await;

    assert_eq!(res.status, 200);
    assert_eq!(res.body["info"]["title"], "Hammer API");
    assert!(res.body["paths"]["/people/{id}"].is_object());
    assert!(res.body["paths"]["/images"]["post"].is_object());
}
