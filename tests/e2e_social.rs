//! E2E tests for the social graph (follow/unfollow, user stats,
//! search, avatar updates)

mod common;

use common::TestServer;
use serde_json::Value;

#[tokio::test]
async fn test_follow_unfollow_and_stats() {
    let server = TestServer::new().await;
    let (a, a_token) = server.login_as("Ada").await;
    let (b, _b_token) = server.login_as("Grace").await;

    // Following twice is a success both times
    for _ in 0..2 {
        let response = server
            .client
            .post(server.url(&format!("/api/users/{}/follow", b.id)))
            .header("Authorization", format!("Bearer {}", a_token))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }

    let stats: Value = server
        .client
        .get(server.url(&format!("/api/users/{}", b.id)))
        .header("Authorization", format!("Bearer {}", a_token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats["_count"]["followers"], 1);
    assert_eq!(stats["isFollowing"], true);

    // Viewing your own profile never reports isFollowing
    let own: Value = server
        .client
        .get(server.url(&format!("/api/users/{}", a.id)))
        .header("Authorization", format!("Bearer {}", a_token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(own["isFollowing"], false);
    assert_eq!(own["_count"]["following"], 1);

    // Unfollowing twice is a success both times
    for _ in 0..2 {
        let response = server
            .client
            .delete(server.url(&format!("/api/users/{}/follow", b.id)))
            .header("Authorization", format!("Bearer {}", a_token))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }

    let stats: Value = server
        .client
        .get(server.url(&format!("/api/users/{}", b.id)))
        .header("Authorization", format!("Bearer {}", a_token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats["_count"]["followers"], 0);
    assert_eq!(stats["isFollowing"], false);
}

#[tokio::test]
async fn test_self_follow_is_rejected() {
    let server = TestServer::new().await;
    let (user, token) = server.login_as("Ada").await;

    let response = server
        .client
        .post(server.url(&format!("/api/users/{}/follow", user.id)))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_unknown_user_is_not_found() {
    let server = TestServer::new().await;
    let (_user, token) = server.login_as("Ada").await;

    let response = server
        .client
        .get(server.url("/api/users/testprov:ghost"))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    let follow = server
        .client
        .post(server.url("/api/users/testprov:ghost/follow"))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(follow.status(), 404);
}

#[tokio::test]
async fn test_search_users_requires_two_chars() {
    let server = TestServer::new().await;
    let (_ada, token) = server.login_as("Ada").await;
    server.create_test_user("Grace").await;

    let short: Value = server
        .client
        .get(server.url("/api/search/users?q=g"))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(short.as_array().unwrap().is_empty());

    let found: Value = server
        .client
        .get(server.url("/api/search/users?q=grace"))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(found.as_array().unwrap().len(), 1);
    assert_eq!(found[0]["firstName"], "Grace");
}

#[tokio::test]
async fn test_search_posts_matches_content() {
    let server = TestServer::new().await;
    let (_user, token) = server.login_as("Ada").await;

    for content in ["a novella worth reading", "something else"] {
        server
            .client
            .post(server.url("/api/posts"))
            .header("Authorization", format!("Bearer {}", token))
            .json(&serde_json::json!({ "content": content }))
            .send()
            .await
            .unwrap();
    }

    let found: Value = server
        .client
        .get(server.url("/api/search/posts?q=novella"))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let found = found.as_array().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["content"], "a novella worth reading");
}

#[tokio::test]
async fn test_avatar_update_roundtrip() {
    let server = TestServer::new().await;
    let (_user, token) = server.login_as("Ada").await;

    let updated: Value = server
        .client
        .put(server.url("/api/avatar"))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "avatarUrl": "/objects/avatars/ada.png" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(updated["profileImageUrl"], "/objects/avatars/ada.png");

    let me: Value = server
        .client
        .get(server.url("/api/auth/user"))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me["profileImageUrl"], "/objects/avatars/ada.png");
}
