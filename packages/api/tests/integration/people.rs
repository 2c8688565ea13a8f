use serde_json::json;

use crate::common::{TestApp, routes, seeded};

mod create {
    use super::*;

    #[tokio::test]
    async fn creates_person_without_projects() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                routes::PEOPLE,
                &json!({ "name": "Test Fred", "email": "test.fred@email.com" }),
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(
            res.header("content-type"),
            Some("application/ld+json; charset=utf-8")
        );
        assert_eq!(res.body["@context"], "/contexts/Person");
        assert_eq!(res.body["@type"], "Person");
        assert_eq!(res.body["name"], "Test Fred");
        assert_eq!(res.body["email"], "test.fred@email.com");
        assert_eq!(res.body["ledProjects"], json!([]));
        assert!(res.body.get("id").is_none());
        assert!(res.body["@id"].as_str().unwrap().starts_with("/people/"));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let app = TestApp::spawn().await;
        let body = json!({ "name": "Test Fred", "email": "test.fred@email.com" });

        let first = app.post(routes::PEOPLE, &body).await;
        assert_eq!(first.status, 201);

        let second = app.post(routes::PEOPLE, &body).await;
        assert_eq!(second.status, 400);
        assert_eq!(second.body["@type"], "hydra:Error");
        assert_eq!(second.description(), "email: This value is already used.");
    }

    #[tokio::test]
    async fn invalid_email_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post(routes::PEOPLE, &json!({ "name": "Fred", "email": "nope" }))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.description(), "email: This value is not a valid email address.");

        let res = app
            .post(routes::PEOPLE, &json!({ "name": "Fred", "email": "a@b@c.com" }))
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.description(), "email: This value is not a valid email address.");
    }

    #[tokio::test]
    async fn takes_over_listed_projects() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                routes::PEOPLE,
                &json!({
                    "name": "New lead",
                    "email": "lead@fake.com",
                    "ledProjects": [routes::project(seeded::PROJECT1)],
                }),
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["ledProjects"], json!([routes::project(seeded::PROJECT1)]));
        let person_iri = res.body["@id"].as_str().unwrap().to_string();

        let project = app.get(&routes::project(seeded::PROJECT1)).await;
        assert_eq!(project.body["foreman"], person_iri);

        let previous = app.get(&routes::person(seeded::PERSON1)).await;
        assert_eq!(previous.body["ledProjects"], json!([]));
    }

    #[tokio::test]
    async fn avatar_must_be_an_existing_image() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                routes::PEOPLE,
                &json!({ "name": "Fred", "email": "fred@fake.com", "image": "/images/999" }),
            )
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.description(), "Item not found for \"/images/999\".");

        let res = app
            .post(
                routes::PEOPLE,
                &json!({ "name": "Fred", "email": "fred@fake.com", "image": "/people/1" }),
            )
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.description(), "Invalid IRI \"/people/1\".");

        let res = app
            .post(
                routes::PEOPLE,
                &json!({ "name": "Fred", "email": "fred@fake.com", "image": routes::image(seeded::FREE_IMAGE) }),
            )
            .await;
        assert_eq!(res.status, 201);
        assert_eq!(res.body["image"], routes::image(seeded::FREE_IMAGE));
    }

    #[tokio::test]
    async fn body_errors_map_to_distinct_statuses() {
        let app = TestApp::spawn().await;

        let res = app
            .post_raw(routes::PEOPLE, "application/json", "{\"name\": ")
            .await;
        assert_eq!(res.status, 400);

        let res = app
            .post(routes::PEOPLE, &json!({ "name": 42, "email": "x@fake.com" }))
            .await;
        assert_eq!(res.status, 422);

        let res = app.post_raw(routes::PEOPLE, "text/plain", "name=Fred").await;
        assert_eq!(res.status, 415);
    }
}

mod update {
    use super::*;

    #[tokio::test]
    async fn adding_a_project_moves_it_from_its_foreman() {
        let app = TestApp::spawn().await;

        let res = app
            .put(
                &routes::person(seeded::PERSON4),
                &json!({ "ledProjects": [routes::project(seeded::PROJECT2)] }),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["ledProjects"], json!([routes::project(seeded::PROJECT2)]));

        let project = app.get(&routes::project(seeded::PROJECT2)).await;
        assert_eq!(project.body["foreman"], routes::person(seeded::PERSON4));

        let previous = app.get(&routes::person(seeded::PERSON2)).await;
        assert_eq!(previous.body["ledProjects"], json!([]));
    }

    #[tokio::test]
    async fn dropping_a_project_is_refused_and_changes_nothing() {
        let app = TestApp::spawn().await;

        let res = app
            .put(
                &routes::person(seeded::PERSON1),
                &json!({ "name": "Renamed", "ledProjects": [] }),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.description(), "Cannot save project without a foreman");

        let person = app.get(&routes::person(seeded::PERSON1)).await;
        assert_eq!(person.body["name"], "Person1");
        assert_eq!(person.body["ledProjects"], json!([routes::project(seeded::PROJECT1)]));
    }

    #[tokio::test]
    async fn email_is_not_writable() {
        let app = TestApp::spawn().await;

        let res = app
            .put(
                &routes::person(seeded::PERSON4),
                &json!({ "name": "Person Four", "email": "changed@fake.com" }),
            )
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["name"], "Person Four");
        assert_eq!(res.body["email"], "p4@fake.com");
    }

    #[tokio::test]
    async fn avatar_can_be_cleared() {
        let app = TestApp::spawn().await;

        let res = app
            .put(&routes::person(seeded::WORKER), &json!({ "image": null }))
            .await;

        assert_eq!(res.status, 200);
        assert!(res.body["image"].is_null());
    }

    #[tokio::test]
    async fn unknown_person_is_404() {
        let app = TestApp::spawn().await;

        let res = app.put(&routes::person(999), &json!({ "name": "Ghost" })).await;

        assert_eq!(res.status, 404);
    }
}

mod delete {
    use super::*;

    #[tokio::test]
    async fn person_leading_nothing_is_deleted() {
        let app = TestApp::spawn().await;

        let res = app.delete(&routes::person(seeded::PERSON4)).await;
        assert_eq!(res.status, 204);

        let res = app.get(&routes::person(seeded::PERSON4)).await;
        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn person_leading_projects_cannot_be_deleted() {
        let app = TestApp::spawn().await;

        let res = app.delete(&routes::person(seeded::PERSON1)).await;
        assert_eq!(res.status, 400);
        assert_eq!(res.description(), "Cannot save project without a foreman");

        let res = app.get(&routes::person(seeded::PERSON1)).await;
        assert_eq!(res.status, 200);
    }
}

mod list {
    use super::*;

    #[tokio::test]
    async fn lists_seeded_people_as_hydra_collection() {
        let app = TestApp::spawn().await;

        let res = app.get(routes::PEOPLE).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["@context"], "/contexts/Person");
        assert_eq!(res.body["@id"], "/people");
        assert_eq!(res.body["@type"], "hydra:Collection");
        assert_eq!(res.body["hydra:totalItems"], seeded::PEOPLE);
        assert!(res.body.get("hydra:view").is_none());

        let worker = &res.body["hydra:member"][0];
        assert_eq!(worker["name"], "Simple worker");
        assert_eq!(worker["email"], "daniel@fake.com");
        assert_eq!(worker["ledProjects"], json!([routes::project(seeded::PROJECT4)]));
        assert_eq!(worker["image"], routes::image(seeded::AVATAR_IMAGE));
    }

    #[tokio::test]
    async fn pages_hold_thirty_members() {
        let app = TestApp::spawn().await;
        for n in 0..30 {
            let res = app
                .post(
                    routes::PEOPLE,
                    &json!({ "name": format!("Extra {n}"), "email": format!("extra{n}@fake.com") }),
                )
                .await;
            assert_eq!(res.status, 201);
        }

        let first = app.get(routes::PEOPLE).await;
        assert_eq!(first.body["hydra:totalItems"], seeded::PEOPLE + 30);
        assert_eq!(first.member_ids().len(), 30);
        assert_eq!(first.body["hydra:view"]["hydra:next"], "/people?page=2");
        assert_eq!(first.body["hydra:view"]["hydra:last"], "/people?page=2");

        let second = app.get("/people?page=2").await;
        assert_eq!(second.member_ids().len(), 5);
        assert_eq!(second.body["hydra:view"]["hydra:previous"], "/people?page=1");
        assert!(second.body["hydra:view"].get("hydra:next").is_none());
    }

    #[tokio::test]
    async fn pages_past_the_last_one_are_empty() {
        let app = TestApp::spawn().await;

        let res = app.get("/people?page=1000").await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["hydra:totalItems"], seeded::PEOPLE);
        assert!(res.member_ids().is_empty());
    }

    #[tokio::test]
    async fn oversized_page_numbers_are_rejected() {
        let app = TestApp::spawn().await;

        for page in [u64::MAX, 1 << 60] {
            let res = app.get(&format!("/people?page={page}")).await;
            assert_eq!(res.status, 400, "page={page}: {}", res.text);
            assert_eq!(res.description(), "page: This value is not valid.");
        }
    }
}
