use reqwest::multipart::Form;

use crate::common::{TestApp, routes, text_form};

mod submission {
    use super::*;

    #[tokio::test]
    async fn submitted_series_is_pending_and_owned_by_the_caller() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "securepass").await;

        let form = text_form("Cosmos").text("private_description", "budget notes");
        let res = app
            .multipart_with_token(&routes::content_list("series"), form, &token)
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["kind"], "series");
        assert_eq!(res.body["title"], "Cosmos");
        assert_eq!(res.body["season"], "Season 1");
        assert_eq!(res.body["approved"], false);
        assert_eq!(res.body["private_description"], "budget notes");
    }

    #[tokio::test]
    async fn custom_season_label_is_kept_trimmed() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "securepass").await;

        let form = text_form("Cosmos").text("season", "  Season 2 ");
        let res = app
            .multipart_with_token(&routes::content_list("series"), form, &token)
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["season"], "Season 2");
    }

    #[tokio::test]
    async fn missing_title_is_a_validation_error() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "securepass").await;

        let form = Form::new().text("description", "No title here");
        let res = app
            .multipart_with_token(&routes::content_list("movie"), form, &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn missing_description_is_a_validation_error() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "securepass").await;

        let form = Form::new().text("title", "Heat");
        let res = app
            .multipart_with_token(&routes::content_list("movie"), form, &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn anonymous_submission_requires_authentication() {
        let app = TestApp::spawn().await;

        let res = app
            .multipart_without_token(&routes::content_list("movie"), text_form("Heat"))
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "AUTHENTICATION_REQUIRED");
    }

    #[tokio::test]
    async fn episodes_cannot_be_submitted_without_a_series() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "securepass").await;

        let res = app
            .multipart_with_token(&routes::content_list("episode"), text_form("Pilot"), &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod episodes {
    use super::*;

    #[tokio::test]
    async fn series_creator_can_add_episodes() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "securepass").await;
        let series_id = app.submit(&token, "series", "Cosmos").await;

        let res = app
            .multipart_with_token(&routes::episodes(series_id), text_form("Pilot"), &token)
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["kind"], "episode");
        assert_eq!(res.body["series_id"], series_id);
        assert_eq!(res.body["approved"], false);
    }

    #[tokio::test]
    async fn other_users_cannot_add_episodes_by_default() {
        let app = TestApp::spawn().await;
        let owner = app.create_authenticated_user("alice", "securepass").await;
        let other = app.create_authenticated_user("bob", "securepass").await;
        let series_id = app.submit(&owner, "series", "Cosmos").await;

        let res = app
            .multipart_with_token(&routes::episodes(series_id), text_form("Pilot"), &other)
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn any_user_policy_lets_others_add_episodes() {
        let app = TestApp::spawn_with(|config| {
            config.moderation.episode_policy =
                catalog_server::services::moderation::EpisodePolicy::AnyUser;
        })
        .await;
        let owner = app.create_authenticated_user("alice", "securepass").await;
        let other = app.create_authenticated_user("bob", "securepass").await;
        let series_id = app.submit(&owner, "series", "Cosmos").await;

        let res = app
            .multipart_with_token(&routes::episodes(series_id), text_form("Pilot"), &other)
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
    }

    #[tokio::test]
    async fn unknown_series_is_not_found_and_creates_nothing() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "securepass").await;
        let admin = app.create_admin("root", "securepass").await;

        let res = app
            .multipart_with_token(&routes::episodes(999), text_form("Pilot"), &token)
            .await;
        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");

        let pending = app.get_with_token(routes::PENDING, &admin).await;
        assert_eq!(pending.body["episodes"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn a_movie_id_is_not_a_series() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "securepass").await;
        let movie_id = app.submit(&token, "movie", "Heat").await;

        let res = app
            .multipart_with_token(&routes::episodes(movie_id), text_form("Pilot"), &token)
            .await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn series_page_lists_only_approved_episodes_in_order() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "securepass").await;
        let admin = app.create_admin("root", "securepass").await;
        let series_id = app.submit(&token, "series", "Cosmos").await;
        let first = app.submit_episode(&token, series_id, "Pilot").await;
        let hidden = app.submit_episode(&token, series_id, "Unaired").await;
        let second = app.submit_episode(&token, series_id, "Finale").await;
        app.approve(&admin, "episode", second).await;
        app.approve(&admin, "episode", first).await;

        let res = app.get_without_token(&routes::episodes(series_id)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.data_ids(), vec![first, second]);
        assert!(!res.data_ids().contains(&hidden));
    }
}

mod reading {
    use super::*;

    #[tokio::test]
    async fn public_view_omits_private_description_even_before_approval() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "securepass").await;
        let form = text_form("Heat").text("private_description", "secret");
        let id = app
            .multipart_with_token(&routes::content_list("movie"), form, &token)
            .await
            .id();

        let res = app.get_without_token(&routes::content("movie", id)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["title"], "Heat");
        assert_eq!(res.body["approved"], false);
        assert_eq!(res.body["like_count"], 0);
        assert!(res.body.get("private_description").is_none());
        assert!(res.body.get("liked").is_none());
    }

    #[tokio::test]
    async fn lookup_with_the_wrong_kind_is_not_found() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "securepass").await;
        let id = app.submit(&token, "movie", "Heat").await;

        let res = app.get_without_token(&routes::content("series", id)).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn private_view_is_for_owner_and_admin_only() {
        let app = TestApp::spawn().await;
        let owner = app.create_authenticated_user("alice", "securepass").await;
        let other = app.create_authenticated_user("bob", "securepass").await;
        let admin = app.create_admin("root", "securepass").await;
        let form = text_form("Heat").text("private_description", "secret");
        let id = app
            .multipart_with_token(&routes::content_list("movie"), form, &owner)
            .await
            .id();

        let own = app.get_with_token(&routes::content_private("movie", id), &owner).await;
        assert_eq!(own.status, 200);
        assert_eq!(own.body["private_description"], "secret");

        let by_admin = app.get_with_token(&routes::content_private("movie", id), &admin).await;
        assert_eq!(by_admin.status, 200);

        let denied = app.get_with_token(&routes::content_private("movie", id), &other).await;
        assert_eq!(denied.status, 403);
        assert_eq!(denied.body["code"], "PERMISSION_DENIED");
    }
}

mod listing {
    use super::*;

    #[tokio::test]
    async fn only_approved_items_are_listed_in_creation_order() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "securepass").await;
        let admin = app.create_admin("root", "securepass").await;
        let first = app.submit(&token, "movie", "Alien").await;
        let pending = app.submit(&token, "movie", "Aliens").await;
        let third = app.submit(&token, "movie", "Alien 3").await;
        app.approve(&admin, "movie", third).await;
        app.approve(&admin, "movie", first).await;

        let res = app.get_without_token(&routes::content_list("movie")).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.data_ids(), vec![first, third]);
        assert!(!res.data_ids().contains(&pending));
    }

    #[tokio::test]
    async fn listing_is_per_kind() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "securepass").await;
        let admin = app.create_admin("root", "securepass").await;
        let movie = app.submit(&token, "movie", "Heat").await;
        let series = app.submit(&token, "series", "Cosmos").await;
        app.approve(&admin, "movie", movie).await;
        app.approve(&admin, "series", series).await;

        let res = app.get_without_token(&routes::content_list("series")).await;

        assert_eq!(res.data_ids(), vec![series]);
    }
}

mod search {
    use super::*;

    #[tokio::test]
    async fn search_is_case_insensitive_over_approved_series_and_movies() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "securepass").await;
        let admin = app.create_admin("root", "securepass").await;
        let series = app.submit(&token, "series", "Star Trek").await;
        let movie = app.submit(&token, "movie", "STAR WARS").await;
        let unapproved = app.submit(&token, "movie", "Starman").await;
        let episode = app.submit_episode(&token, series, "Star Date").await;
        let other = app.submit(&token, "movie", "Heat").await;
        for (kind, id) in [
            ("series", series),
            ("movie", movie),
            ("episode", episode),
            ("movie", other),
        ] {
            app.approve(&admin, kind, id).await;
        }

        let res = app.get_without_token(&routes::search("star")).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.data_ids(), vec![series, movie]);
        assert!(!res.data_ids().contains(&unapproved));
        assert!(!res.data_ids().contains(&episode));
    }

    #[tokio::test]
    async fn wildcards_in_the_query_are_literal() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "securepass").await;
        let admin = app.create_admin("root", "securepass").await;
        let id = app.submit(&token, "movie", "Heat").await;
        app.approve(&admin, "movie", id).await;

        let res = app.get_without_token(&routes::search("%25")).await;

        assert_eq!(res.status, 200);
        assert!(res.data_ids().is_empty());
    }
}
