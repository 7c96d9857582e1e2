use serde_json::json;

use crate::common::{TestApp, routes};

mod approval {
    use super::*;

    #[tokio::test]
    async fn admin_approval_makes_an_item_public() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "securepass").await;
        let admin = app.create_admin("root", "securepass").await;
        let id = app.submit(&token, "movie", "Heat").await;

        let res = app
            .post_with_token(&routes::approve("movie", id), &json!({}), &admin)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["approved"], true);

        let listed = app.get_without_token(&routes::content_list("movie")).await;
        assert_eq!(listed.data_ids(), vec![id]);
    }

    #[tokio::test]
    async fn cosmos_appears_once_only_after_approval() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "securepass").await;
        let admin = app.create_admin("root", "securepass").await;
        let id = app.submit(&token, "series", "Cosmos").await;

        let before = app.get_without_token(&routes::content_list("series")).await;
        assert!(before.data_ids().is_empty());

        app.approve(&admin, "series", id).await;

        let after = app.get_without_token(&routes::content_list("series")).await;
        let listed = after.body["data"].as_array().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["id"], id);
        assert_eq!(listed[0]["title"], "Cosmos");
    }

    #[tokio::test]
    async fn approving_twice_is_a_no_op() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "securepass").await;
        let admin = app.create_admin("root", "securepass").await;
        let id = app.submit(&token, "series", "Cosmos").await;

        app.approve(&admin, "series", id).await;
        let again = app
            .post_with_token(&routes::approve("series", id), &json!({}), &admin)
            .await;

        assert_eq!(again.status, 200);
        assert_eq!(again.body["approved"], true);
        let listed = app.get_without_token(&routes::content_list("series")).await;
        assert_eq!(listed.data_ids(), vec![id]);
    }

    #[tokio::test]
    async fn non_admin_cannot_approve_and_nothing_changes() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "securepass").await;
        let id = app.submit(&token, "movie", "Heat").await;

        let res = app
            .post_with_token(&routes::approve("movie", id), &json!({}), &token)
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
        let item = app.get_without_token(&routes::content("movie", id)).await;
        assert_eq!(item.body["approved"], false);
    }

    #[tokio::test]
    async fn approving_a_missing_item_is_not_found() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("root", "securepass").await;

        let res = app
            .post_with_token(&routes::approve("movie", 404), &json!({}), &admin)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn anonymous_approval_requires_authentication() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "securepass").await;
        let id = app.submit(&token, "movie", "Heat").await;

        let res = app
            .post_without_token(&routes::approve("movie", id), &json!({}))
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "AUTHENTICATION_REQUIRED");
    }

    #[tokio::test]
    async fn concurrent_approvals_converge() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "securepass").await;
        let admin = app.create_admin("root", "securepass").await;
        let id = app.submit(&token, "movie", "Heat").await;

        let path = routes::approve("movie", id);
        let empty = json!({});
        let (a, b) = tokio::join!(
            app.post_with_token(&path, &empty, &admin),
            app.post_with_token(&path, &empty, &admin),
        );

        assert_eq!(a.status, 200);
        assert_eq!(b.status, 200);
        let listed = app.get_without_token(&routes::content_list("movie")).await;
        assert_eq!(listed.data_ids(), vec![id]);
    }
}

mod queue {
    use super::*;

    #[tokio::test]
    async fn pending_queue_groups_unapproved_items_by_kind() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "securepass").await;
        let admin = app.create_admin("root", "securepass").await;
        let series = app.submit(&token, "series", "Cosmos").await;
        let episode = app.submit_episode(&token, series, "Pilot").await;
        let movie = app.submit(&token, "movie", "Heat").await;
        let approved = app.submit(&token, "movie", "Alien").await;
        app.approve(&admin, "movie", approved).await;

        let res = app.get_with_token(routes::PENDING, &admin).await;

        assert_eq!(res.status, 200);
        let ids = |key: &str| -> Vec<i64> {
            res.body[key]
                .as_array()
                .unwrap()
                .iter()
                .map(|item| item["id"].as_i64().unwrap())
                .collect()
        };
        assert_eq!(ids("series"), vec![series as i64]);
        assert_eq!(ids("episodes"), vec![episode as i64]);
        assert_eq!(ids("movies"), vec![movie as i64]);
    }

    #[tokio::test]
    async fn pending_queue_is_admin_only() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "securepass").await;

        let res = app.get_with_token(routes::PENDING, &token).await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }
}
