use crate::common::{MAX_BLOB_SIZE, TestApp, file_part, routes, text_form};

const JPEG: &[u8] = b"\xff\xd8\xff\xe0fake-jpeg-bytes";
const MP4: &[u8] = b"\x00\x00\x00\x18ftypmp42fake-video";

async fn get_asset(app: &TestApp, path: &str) -> reqwest::Response {
    app.client
        .get(app.url(path))
        .send()
        .await
        .expect("Failed to send GET request")
}

mod streaming {
    use super::*;

    #[tokio::test]
    async fn uploaded_thumbnail_streams_back_with_fixed_media_type() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "securepass").await;
        let form = text_form("Heat").part("thumbnail", file_part("poster.png", JPEG.to_vec(), "image/png"));
        let id = app
            .multipart_with_token(&routes::content_list("movie"), form, &token)
            .await
            .id();

        let res = get_asset(&app, &routes::asset("movie", id, "thumbnail")).await;

        assert_eq!(res.status(), 200);
        assert_eq!(res.headers()["content-type"], "image/jpeg");
        assert_eq!(res.headers()["content-length"], JPEG.len().to_string());
        assert!(res.headers().contains_key("etag"));
        assert_eq!(res.bytes().await.unwrap().as_ref(), JPEG);
    }

    #[tokio::test]
    async fn episode_video_streams_as_mp4() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "securepass").await;
        let series = app.submit(&token, "series", "Cosmos").await;
        let form = text_form("Pilot").part("video", file_part("pilot.mp4", MP4.to_vec(), "video/mp4"));
        let res = app
            .multipart_with_token(&routes::episodes(series), form, &token)
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["has_video"], true);
        let id = res.id();

        let res = get_asset(&app, &routes::asset("episode", id, "video")).await;

        assert_eq!(res.status(), 200);
        assert_eq!(res.headers()["content-type"], "video/mp4");
        assert_eq!(res.bytes().await.unwrap().as_ref(), MP4);
    }

    #[tokio::test]
    async fn absent_thumbnail_is_an_empty_success() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "securepass").await;
        let id = app.submit(&token, "series", "Cosmos").await;

        let res = get_asset(&app, &routes::asset("series", id, "thumbnail")).await;

        assert_eq!(res.status(), 200);
        assert!(res.bytes().await.unwrap().is_empty());

        let item = app.get_without_token(&routes::content("series", id)).await;
        assert_eq!(item.body["title"], "Cosmos");
        assert_eq!(item.body["has_thumbnail"], false);
    }

    #[tokio::test]
    async fn empty_file_part_counts_as_no_file() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "securepass").await;
        let form = text_form("Heat").part("thumbnail", file_part("", Vec::new(), "application/octet-stream"));
        let res = app
            .multipart_with_token(&routes::content_list("movie"), form, &token)
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["has_thumbnail"], false);
    }

    #[tokio::test]
    async fn missing_item_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app
            .get_without_token(&routes::asset("movie", 31337, "thumbnail"))
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn series_has_no_video_field() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "securepass").await;
        let id = app.submit(&token, "series", "Cosmos").await;

        let res = app.get_without_token(&routes::asset("series", id, "video")).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn matching_etag_is_not_modified() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "securepass").await;
        let form = text_form("Heat").part("thumbnail", file_part("p.jpg", JPEG.to_vec(), "image/jpeg"));
        let id = app
            .multipart_with_token(&routes::content_list("movie"), form, &token)
            .await
            .id();
        let path = routes::asset("movie", id, "thumbnail");
        let etag = get_asset(&app, &path).await.headers()["etag"].clone();

        let res = app
            .client
            .get(app.url(&path))
            .header("If-None-Match", etag)
            .send()
            .await
            .expect("Failed to send GET request");

        assert_eq!(res.status(), 304);
    }
}

mod uploads {
    use super::*;

    #[tokio::test]
    async fn identical_payloads_share_one_blob() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "securepass").await;
        let mut ids = Vec::new();
        for title in ["Heat", "Heat (Director's Cut)"] {
            let form = text_form(title).part("thumbnail", file_part("p.jpg", JPEG.to_vec(), "image/jpeg"));
            ids.push(
                app.multipart_with_token(&routes::content_list("movie"), form, &token)
                    .await
                    .id(),
            );
        }

        let first = get_asset(&app, &routes::asset("movie", ids[0], "thumbnail")).await;
        let second = get_asset(&app, &routes::asset("movie", ids[1], "thumbnail")).await;

        assert_eq!(first.headers()["etag"], second.headers()["etag"]);
    }

    #[tokio::test]
    async fn video_on_a_series_submission_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "securepass").await;
        let form = text_form("Cosmos").part("video", file_part("v.mp4", MP4.to_vec(), "video/mp4"));

        let res = app
            .multipart_with_token(&routes::content_list("series"), form, &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn oversized_upload_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "securepass").await;
        let big = vec![0u8; MAX_BLOB_SIZE as usize + 1];
        let form = text_form("Heat").part("thumbnail", file_part("big.jpg", big, "image/jpeg"));

        let res = app
            .multipart_with_token(&routes::content_list("movie"), form, &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn unknown_form_fields_are_rejected() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "securepass").await;
        let form = text_form("Heat").text("rating", "5");

        let res = app
            .multipart_with_token(&routes::content_list("movie"), form, &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod rejected_uploads {
    use reqwest::multipart::Form;

    use super::*;

    #[tokio::test]
    async fn episode_refused_by_policy_stores_nothing() {
        let app = TestApp::spawn().await;
        let alice = app.create_authenticated_user("alice", "securepass").await;
        let bob = app.create_authenticated_user("bob", "securepass").await;
        let series_id = app.submit(&alice, "series", "Cosmos").await;
        let form = text_form("Pilot").part("video", file_part("v.mp4", MP4.to_vec(), "video/mp4"));

        let res = app
            .multipart_with_token(&routes::episodes(series_id), form, &bob)
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(app.blob_count(), 0);
    }

    #[tokio::test]
    async fn episode_under_missing_series_stores_nothing() {
        let app = TestApp::spawn().await;
        let alice = app.create_authenticated_user("alice", "securepass").await;
        let form = text_form("Pilot")
            .part("thumbnail", file_part("p.jpg", JPEG.to_vec(), "image/jpeg"))
            .part("video", file_part("v.mp4", MP4.to_vec(), "video/mp4"));

        let res = app
            .multipart_with_token(&routes::episodes(999), form, &alice)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(app.blob_count(), 0);
    }

    #[tokio::test]
    async fn invalid_submission_discards_its_files() {
        let app = TestApp::spawn().await;
        let alice = app.create_authenticated_user("alice", "securepass").await;
        let form = Form::new()
            .text("title", "Heat")
            .part("thumbnail", file_part("p.jpg", JPEG.to_vec(), "image/jpeg"))
            .part("video", file_part("v.mp4", MP4.to_vec(), "video/mp4"));

        let res = app
            .multipart_with_token(&routes::content_list("movie"), form, &alice)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(app.blob_count(), 0);
    }

    #[tokio::test]
    async fn repeated_file_field_is_rejected_and_discarded() {
        let app = TestApp::spawn().await;
        let alice = app.create_authenticated_user("alice", "securepass").await;
        let form = text_form("Heat")
            .part("thumbnail", file_part("a.jpg", JPEG.to_vec(), "image/jpeg"))
            .part("thumbnail", file_part("b.jpg", b"another".to_vec(), "image/jpeg"));

        let res = app
            .multipart_with_token(&routes::content_list("movie"), form, &alice)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert_eq!(app.blob_count(), 0);
    }

    #[tokio::test]
    async fn rejected_submission_keeps_blobs_shared_with_stored_items() {
        let app = TestApp::spawn().await;
        let alice = app.create_authenticated_user("alice", "securepass").await;
        let form = text_form("Heat").part("thumbnail", file_part("p.jpg", JPEG.to_vec(), "image/jpeg"));
        let movie_id = app
            .multipart_with_token(&routes::content_list("movie"), form, &alice)
            .await
            .id();
        assert_eq!(app.blob_count(), 1);

        let form = text_form("Cosmos")
            .part("thumbnail", file_part("p.jpg", JPEG.to_vec(), "image/jpeg"))
            .part("video", file_part("v.mp4", MP4.to_vec(), "video/mp4"));
        let res = app
            .multipart_with_token(&routes::content_list("series"), form, &alice)
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(app.blob_count(), 1);

        let res = get_asset(&app, &routes::asset("movie", movie_id, "thumbnail")).await;
        assert_eq!(res.status(), 200);
        assert_eq!(res.bytes().await.unwrap().as_ref(), JPEG);
    }
}
