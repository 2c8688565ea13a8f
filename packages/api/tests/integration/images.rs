use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::json;

use crate::common::{TestApp, png_bytes, routes, seeded};

fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// File name part of a content URL.
fn stored_name(content_url: &str) -> &str {
    content_url.rsplit('/').next().unwrap_or_default()
}

mod upload {
    use super::*;

    #[tokio::test]
    async fn multipart_upload_defaults_alternate_name_to_file_name() {
        let app = TestApp::spawn().await;

        let res = app
            .upload(routes::IMAGES, Some(("site.png", png_bytes(), "image/png")), &[])
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["@context"], "/contexts/Image");
        assert_eq!(res.body["@type"], "http://schema.org/ImageObject");
        assert_eq!(res.body["alternateName"], "site.png");
        assert!(res.body["uploadDate"].is_string());

        let url = res.body["contentUrl"].as_str().unwrap();
        assert!(
            url.starts_with(&format!("http://{}/media/images/site-", app.addr)),
            "{url}"
        );
        assert!(url.ends_with(".png"));
        assert!(app.stored_files().contains(&stored_name(url).to_string()));
    }

    #[tokio::test]
    async fn multipart_upload_keeps_explicit_alternate_name() {
        let app = TestApp::spawn().await;

        let res = app
            .upload(
                routes::IMAGES,
                Some(("site.png", png_bytes(), "image/png")),
                &[("alternateName", "Front of the site")],
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["alternateName"], "Front of the site");
    }

    #[tokio::test]
    async fn multipart_upload_without_file_is_rejected() {
        let app = TestApp::spawn().await;
        let before = app.stored_files().len();

        let res = app
            .upload(routes::IMAGES, None, &[("alternateName", "Nothing")])
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.description(), "\"file\" is required");
        assert_eq!(app.stored_files().len(), before);
    }

    #[tokio::test]
    async fn json_png_upload_is_stored_as_png() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                routes::IMAGES,
                &json!({ "file": data_uri("image/png", &png_bytes()), "alternateName": "Logo" }),
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["alternateName"], "Logo");
        let url = res.body["contentUrl"].as_str().unwrap();
        assert!(url.ends_with(".png"), "{url}");

        let (status, bytes) = app.get_bytes(&format!("/media/images/{}", stored_name(url))).await;
        assert_eq!(status, 200);
        assert_eq!(bytes, png_bytes());
    }

    #[tokio::test]
    async fn json_jpeg_upload_is_stored_as_jpg() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                routes::IMAGES,
                &json!({ "file": data_uri("image/jpeg", b"\xFF\xD8\xFF\xE0jpeg"), "alternateName": "Photo" }),
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert!(res.body["contentUrl"].as_str().unwrap().ends_with(".jpg"));
    }

    #[tokio::test]
    async fn json_upload_accepts_content_url_member() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                routes::IMAGES,
                &json!({ "contentUrl": data_uri("image/png", &png_bytes()), "alternateName": "Via contentUrl" }),
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["alternateName"], "Via contentUrl");
    }

    #[tokio::test]
    async fn unsupported_encodings_are_415() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                routes::IMAGES,
                &json!({ "file": data_uri("image/gif", b"GIF89a"), "alternateName": "Anim" }),
            )
            .await;
        assert_eq!(res.status, 415);
        assert_eq!(res.description(), "Unsupported image encoding");

        let res = app
            .post(routes::IMAGES, &json!({ "file": "not a data uri", "alternateName": "Bad" }))
            .await;
        assert_eq!(res.status, 415);

        let res = app.post_raw(routes::IMAGES, "text/plain", "hello").await;
        assert_eq!(res.status, 415);
    }

    #[tokio::test]
    async fn json_upload_without_file_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post(routes::IMAGES, &json!({ "alternateName": "Nothing" }))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.description(), "\"file\" is required");
    }

    #[tokio::test]
    async fn non_string_alternate_name_cannot_be_denormalized() {
        let app = TestApp::spawn().await;
        let before = app.stored_files().len();

        let res = app
            .post(
                routes::IMAGES,
                &json!({ "file": data_uri("image/png", &png_bytes()), "alternateName": 12 }),
            )
            .await;

        assert_eq!(res.status, 422);
        assert_eq!(res.description(), "Cannot create image from given input");
        assert_eq!(app.stored_files().len(), before);
    }

    #[tokio::test]
    async fn duplicate_alternate_name_is_rejected() {
        let app = TestApp::spawn().await;
        let before = app.stored_files().len();

        let res = app
            .upload(
                routes::IMAGES,
                Some(("again.png", png_bytes(), "image/png")),
                &[("alternateName", "fixture-1.png")],
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.description(), "alternateName: This value is already used.");
        assert_eq!(app.stored_files().len(), before);
    }

    #[tokio::test]
    async fn oversized_upload_is_rejected() {
        let app = TestApp::spawn().await;
        let big = vec![0u8; crate::common::MAX_IMAGE_SIZE as usize + 1];

        let res = app
            .upload(routes::IMAGES, Some(("big.png", big, "image/png")), &[])
            .await;

        assert_eq!(res.status, 400);
        assert!(res.description().starts_with("file: The file is too large."));
    }
}

mod forwarded_headers {
    use super::*;

    async fn first_content_url(app: &TestApp) -> String {
        let res = app
            .get_with_header(routes::IMAGES, "X-Forwarded-Host", "attacker.example")
            .await;
        assert_eq!(res.status, 200);
        res.body["hydra:member"][0]["contentUrl"]
            .as_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn untrusted_by_default() {
        let app = TestApp::spawn().await;

        let url = first_content_url(&app).await;

        assert!(
            url.starts_with(&format!("http://{}/media/images/", app.addr)),
            "{url}"
        );
    }

    #[tokio::test]
    async fn honored_when_trusted() {
        let app = TestApp::spawn_with(|config| config.server.trust_forwarded_headers = true).await;

        let url = first_content_url(&app).await;

        assert!(url.starts_with("http://attacker.example/media/images/"), "{url}");
    }
}

mod media {
    use super::*;

    #[tokio::test]
    async fn serves_stored_file_with_etag() {
        let app = TestApp::spawn().await;
        let image = app.get(&routes::image(seeded::FREE_IMAGE)).await;
        let path = format!(
            "/media/images/{}",
            stored_name(image.body["contentUrl"].as_str().unwrap())
        );

        let res = app.get(&path).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.header("content-type"), Some("image/png"));
        assert_eq!(res.header("cache-control"), Some("public, max-age=3600"));
        let etag = res.header("etag").unwrap().to_string();

        let res = app.get_with_header(&path, "If-None-Match", &etag).await;
        assert_eq!(res.status, 304);
        assert!(res.text.is_empty());
    }

    #[tokio::test]
    async fn unknown_or_nested_names_are_404() {
        let app = TestApp::spawn().await;

        assert_eq!(app.get("/media/images/missing-000000000000.png").await.status, 404);
        assert_eq!(app.get("/media/images/..%2Fsecret.png").await.status, 404);
    }
}

mod update {
    use super::*;

    #[tokio::test]
    async fn renames_image() {
        let app = TestApp::spawn().await;

        let res = app
            .put(&routes::image(seeded::FREE_IMAGE), &json!({ "alternateName": "Renamed" }))
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["alternateName"], "Renamed");

        let res = app
            .put(&routes::image(seeded::FREE_IMAGE), &json!({ "alternateName": "fixture-1.png" }))
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.description(), "alternateName: This value is already used.");
    }
}

mod delete {
    use super::*;

    #[tokio::test]
    async fn image_shown_by_a_photo_cannot_be_deleted() {
        let app = TestApp::spawn().await;

        let res = app.delete(&routes::image(seeded::PHOTO_IMAGE)).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.description(), "Cannot delete an image used by a project photo");
        assert_eq!(app.get(&routes::image(seeded::PHOTO_IMAGE)).await.status, 200);
    }

    #[tokio::test]
    async fn deleting_removes_row_and_file() {
        let app = TestApp::spawn().await;
        let image = app.get(&routes::image(seeded::FREE_IMAGE)).await;
        let file_name = stored_name(image.body["contentUrl"].as_str().unwrap()).to_string();
        assert!(app.stored_files().contains(&file_name));

        let res = app.delete(&routes::image(seeded::FREE_IMAGE)).await;
        assert_eq!(res.status, 204);

        assert_eq!(app.get(&routes::image(seeded::FREE_IMAGE)).await.status, 404);
        assert_eq!(app.get(&format!("/media/images/{file_name}")).await.status, 404);
        assert!(!app.stored_files().contains(&file_name));
    }

    #[tokio::test]
    async fn deleting_an_avatar_clears_it() {
        let app = TestApp::spawn().await;

        let res = app.delete(&routes::image(seeded::AVATAR_IMAGE)).await;
        assert_eq!(res.status, 204);

        let worker = app.get(&routes::person(seeded::WORKER)).await;
        assert_eq!(worker.status, 200);
        assert!(worker.body["image"].is_null());
    }
}

mod list {
    use super::*;

    #[tokio::test]
    async fn lists_seeded_images() {
        let app = TestApp::spawn().await;

        let res = app.get(routes::IMAGES).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["hydra:totalItems"], seeded::IMAGES);
        assert_eq!(res.body["hydra:member"][0]["alternateName"], "fixture-1.png");
    }

    #[tokio::test]
    async fn filters_on_upload_date() {
        let app = TestApp::spawn().await;

        let res = app.get("/images?uploadDate[after]=2000-01-01").await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["hydra:totalItems"], seeded::IMAGES);

        let res = app.get("/images?uploadDate[before]=2000-01-01").await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["hydra:totalItems"], 0);

        let res = app
            .get("/images?uploadDate[strictly_after]=2000-01-01T00:00:00Z")
            .await;
        assert_eq!(res.body["hydra:totalItems"], seeded::IMAGES);

        let res = app.get("/images?uploadDate[after]=yesterday").await;
        assert_eq!(res.status, 400);
        assert_eq!(res.description(), "uploadDate[after]: This value is not a valid date.");
    }

    #[tokio::test]
    async fn oversized_page_number_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.get(&format!("/images?page={}", u64::MAX)).await;

        assert_eq!(res.status, 400, "{}", res.text);
        assert_eq!(res.description(), "page: This value is not valid.");
    }
}

mod fixture_source {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use hammer_api::fixtures::{reset_image_source, set_image_source};

    use super::*;

    #[tokio::test]
    async fn seeder_uses_overridden_source_and_keeps_its_files() {
        let dir = tempfile::tempdir().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));

        let target = dir.path().to_path_buf();
        let counter = calls.clone();
        set_image_source(move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            let path = target.join(format!("source-{n}.png"));
            std::fs::write(&path, png_bytes())?;
            Ok(path)
        });
        let app = TestApp::spawn().await;
        reset_image_source();

        assert!(calls.load(Ordering::SeqCst) >= seeded::IMAGES as usize);
        assert!(dir.path().join("source-0.png").exists());

        let res = app.get(routes::IMAGES).await;
        assert_eq!(res.body["hydra:totalItems"], seeded::IMAGES);
    }
}
