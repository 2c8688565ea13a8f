use serde_json::json;

use crate::common::{TestApp, routes, seeded};

const DESCRIPTION: &str = "Renovate the old storage hall.";

mod create {
    use super::*;

    #[tokio::test]
    async fn creates_project_led_by_foreman() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                routes::PROJECTS,
                &json!({
                    "name": "Storage hall",
                    "description": DESCRIPTION,
                    "foreman": routes::person(seeded::PERSON4),
                }),
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["@context"], "/contexts/Project");
        assert_eq!(res.body["@type"], "Project");
        assert_eq!(res.body["foreman"], routes::person(seeded::PERSON4));
        assert_eq!(res.body["photos"], json!([]));
        assert!(res.body["createdAt"].is_string());
        let project_iri = res.body["@id"].as_str().unwrap().to_string();

        let foreman = app.get(&routes::person(seeded::PERSON4)).await;
        assert_eq!(foreman.body["ledProjects"], json!([project_iri]));
    }

    #[tokio::test]
    async fn foreman_is_required() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                routes::PROJECTS,
                &json!({ "name": "Storage hall", "description": DESCRIPTION }),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.description(), "foreman: This value should not be null.");
    }

    #[tokio::test]
    async fn unknown_foreman_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                routes::PROJECTS,
                &json!({ "name": "Storage hall", "description": DESCRIPTION, "foreman": "/people/999" }),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.description(), "Item not found for \"/people/999\".");
    }

    #[tokio::test]
    async fn short_description_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                routes::PROJECTS,
                &json!({
                    "name": "Storage hall",
                    "description": "too short",
                    "foreman": routes::person(seeded::PERSON4),
                }),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(
            res.description(),
            "description: This value is too short. It should have 10 characters or more."
        );
    }

    #[tokio::test]
    async fn duplicate_name_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                routes::PROJECTS,
                &json!({
                    "name": "Project1",
                    "description": DESCRIPTION,
                    "foreman": routes::person(seeded::PERSON4),
                }),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.description(), "name: This value is already used.");
    }

    #[tokio::test]
    async fn listed_photos_move_to_the_new_project() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                routes::PROJECTS,
                &json!({
                    "name": "Storage hall",
                    "description": DESCRIPTION,
                    "foreman": routes::person(seeded::PERSON4),
                    "photos": [routes::project_photo(1)],
                }),
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["photos"], json!([routes::project_photo(1)]));
        let project_iri = res.body["@id"].as_str().unwrap().to_string();

        let photo = app.get(&routes::project_photo(1)).await;
        assert_eq!(photo.body["project"], project_iri);

        let previous = app.get(&routes::project(seeded::PROJECT4)).await;
        assert_eq!(
            previous.body["photos"],
            json!([routes::project_photo(2), routes::project_photo(3)])
        );
    }
}

mod update {
    use super::*;

    #[tokio::test]
    async fn changing_foreman_updates_both_people() {
        let app = TestApp::spawn().await;

        let res = app
            .put(
                &routes::project(seeded::PROJECT1),
                &json!({ "foreman": routes::person(seeded::PERSON4) }),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["foreman"], routes::person(seeded::PERSON4));

        let previous = app.get(&routes::person(seeded::PERSON1)).await;
        assert_eq!(previous.body["ledProjects"], json!([]));
        let current = app.get(&routes::person(seeded::PERSON4)).await;
        assert_eq!(current.body["ledProjects"], json!([routes::project(seeded::PROJECT1)]));
    }

    #[tokio::test]
    async fn null_foreman_is_refused() {
        let app = TestApp::spawn().await;

        let res = app
            .put(&routes::project(seeded::PROJECT1), &json!({ "foreman": null }))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.description(), "Cannot save project without a foreman");

        let project = app.get(&routes::project(seeded::PROJECT1)).await;
        assert_eq!(project.body["foreman"], routes::person(seeded::PERSON1));
    }

    #[tokio::test]
    async fn dropping_photos_is_refused() {
        let app = TestApp::spawn().await;

        let res = app
            .put(
                &routes::project(seeded::PROJECT4),
                &json!({ "photos": [routes::project_photo(1)] }),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(
            res.description(),
            "Cannot save project photos without being assigned to a project"
        );
    }

    #[tokio::test]
    async fn renames_keep_names_unique() {
        let app = TestApp::spawn().await;

        let res = app
            .put(&routes::project(seeded::PROJECT1), &json!({ "name": "Project1" }))
            .await;
        assert_eq!(res.status, 200);

        let res = app
            .put(&routes::project(seeded::PROJECT1), &json!({ "name": "Project2" }))
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.description(), "name: This value is already used.");
    }
}

mod delete {
    use super::*;

    #[tokio::test]
    async fn deleting_a_project_removes_its_photos() {
        let app = TestApp::spawn().await;

        let res = app.delete(&routes::project(seeded::PROJECT4)).await;
        assert_eq!(res.status, 204);

        assert_eq!(app.get(&routes::project(seeded::PROJECT4)).await.status, 404);
        for photo in 1..=3 {
            assert_eq!(app.get(&routes::project_photo(photo)).await.status, 404);
        }
        assert_eq!(app.get(&routes::project_photo(4)).await.status, 200);

        let worker = app.get(&routes::person(seeded::WORKER)).await;
        assert_eq!(worker.status, 200);
        assert_eq!(worker.body["ledProjects"], json!([]));

        let image = app.get(&routes::image(seeded::PHOTO_IMAGE)).await;
        assert_eq!(image.status, 200);
    }

    #[tokio::test]
    async fn unknown_project_is_404() {
        let app = TestApp::spawn().await;

        let res = app.delete(&routes::project(999)).await;

        assert_eq!(res.status, 404);
    }
}

mod list {
    use super::*;

    #[tokio::test]
    async fn lists_seeded_projects() {
        let app = TestApp::spawn().await;

        let res = app.get(routes::PROJECTS).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["hydra:totalItems"], seeded::PROJECTS);
        assert_eq!(
            res.member_ids(),
            vec!["/projects/1", "/projects/2", "/projects/3", "/projects/4"]
        );
        let first = &res.body["hydra:member"][0];
        assert_eq!(first["name"], "Project1");
        assert_eq!(first["description"], "Description of Project1, seeded as demo data.");
    }

    #[tokio::test]
    async fn photos_of_a_project_form_a_subresource() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::photos_of_project(seeded::PROJECT4)).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["@context"], "/contexts/ProjectPhoto");
        assert_eq!(res.body["@id"], "/projects/4/photos");
        assert_eq!(res.body["hydra:totalItems"], 3);
        assert_eq!(
            res.member_ids(),
            vec!["/project_photos/1", "/project_photos/2", "/project_photos/3"]
        );

        let res = app.get(&routes::photos_of_project(999)).await;
        assert_eq!(res.status, 404);
    }
}
