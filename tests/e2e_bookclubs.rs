//! E2E tests for bookclub lifecycle and membership

mod common;

use common::TestServer;
use serde_json::Value;

async fn create_bookclub(server: &TestServer, token: &str, name: &str) -> Value {
    let response = server
        .client
        .post(server.url("/api/bookclubs"))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({
            "name": name,
            "description": "Small-press fiction",
            "currentBook": "The Long Way",
            "currentAuthor": "B. Chambers",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    response.json().await.unwrap()
}

#[tokio::test]
async fn test_membership_lifecycle_scenario() {
    let server = TestServer::new().await;
    let (_u, u_token) = server.login_as("Ursula").await;
    let (_v, v_token) = server.login_as("Vera").await;

    // U creates bookclub B
    let bookclub = create_bookclub(&server, &u_token, "Indie Reads").await;
    let bookclub_id = bookclub["id"].as_str().unwrap();

    // B has exactly one member: U with role creator
    let view: Value = server
        .client
        .get(server.url(&format!("/api/bookclubs/{}", bookclub_id)))
        .header("Authorization", format!("Bearer {}", u_token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view["_count"]["members"], 1);
    assert_eq!(view["isMember"], true);
    assert_eq!(view["isCreator"], true);

    // V joins B
    let join = server
        .client
        .post(server.url(&format!("/api/bookclubs/{}/join", bookclub_id)))
        .header("Authorization", format!("Bearer {}", v_token))
        .send()
        .await
        .unwrap();
    assert_eq!(join.status(), 200);

    let view: Value = server
        .client
        .get(server.url(&format!("/api/bookclubs/{}", bookclub_id)))
        .header("Authorization", format!("Bearer {}", v_token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view["_count"]["members"], 2);
    assert_eq!(view["isMember"], true);
    assert_eq!(view["isCreator"], false);

    // U attempts to leave: rejected
    let rejected = server
        .client
        .delete(server.url(&format!("/api/bookclubs/{}/join", bookclub_id)))
        .header("Authorization", format!("Bearer {}", u_token))
        .send()
        .await
        .unwrap();
    assert_eq!(rejected.status(), 403);

    // V leaves: member count back to 1
    let left = server
        .client
        .delete(server.url(&format!("/api/bookclubs/{}/join", bookclub_id)))
        .header("Authorization", format!("Bearer {}", v_token))
        .send()
        .await
        .unwrap();
    assert_eq!(left.status(), 200);

    let view: Value = server
        .client
        .get(server.url(&format!("/api/bookclubs/{}", bookclub_id)))
        .header("Authorization", format!("Bearer {}", u_token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view["_count"]["members"], 1);
}

#[tokio::test]
async fn test_create_bookclub_validation() {
    let server = TestServer::new().await;
    let (_user, token) = server.login_as("Ada").await;

    let missing_name = server
        .client
        .post(server.url("/api/bookclubs"))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({
            "name": "",
            "description": "d",
            "currentBook": "b",
            "currentAuthor": "a",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(missing_name.status(), 400);

    let bad_website = server
        .client
        .post(server.url("/api/bookclubs"))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({
            "name": "n",
            "description": "d",
            "currentBook": "b",
            "currentAuthor": "a",
            "authorWebsite": "not a url",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_website.status(), 400);

    // Empty-string URLs are treated as absent
    let empty_website: Value = server
        .client
        .post(server.url("/api/bookclubs"))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({
            "name": "n",
            "description": "d",
            "currentBook": "b",
            "currentAuthor": "a",
            "authorWebsite": "",
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(empty_website["authorWebsite"].is_null());
}

#[tokio::test]
async fn test_delete_bookclub_is_creator_only() {
    let server = TestServer::new().await;
    let (_creator, creator_token) = server.login_as("Ursula").await;
    let (_member, member_token) = server.login_as("Vera").await;

    let bookclub = create_bookclub(&server, &creator_token, "Indie Reads").await;
    let bookclub_id = bookclub["id"].as_str().unwrap();

    server
        .client
        .post(server.url(&format!("/api/bookclubs/{}/join", bookclub_id)))
        .header("Authorization", format!("Bearer {}", member_token))
        .send()
        .await
        .unwrap();

    let forbidden = server
        .client
        .delete(server.url(&format!("/api/bookclubs/{}", bookclub_id)))
        .header("Authorization", format!("Bearer {}", member_token))
        .send()
        .await
        .unwrap();
    assert_eq!(forbidden.status(), 403);

    let deleted = server
        .client
        .delete(server.url(&format!("/api/bookclubs/{}", bookclub_id)))
        .header("Authorization", format!("Bearer {}", creator_token))
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status(), 200);

    let missing = server
        .client
        .get(server.url(&format!("/api/bookclubs/{}", bookclub_id)))
        .header("Authorization", format!("Bearer {}", creator_token))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), 404);
}

#[tokio::test]
async fn test_user_bookclub_listing() {
    let server = TestServer::new().await;
    let (u, u_token) = server.login_as("Ursula").await;
    let (_v, v_token) = server.login_as("Vera").await;

    let own = create_bookclub(&server, &u_token, "First Club").await;
    let other = create_bookclub(&server, &v_token, "Second Club").await;

    server
        .client
        .post(server.url(&format!(
            "/api/bookclubs/{}/join",
            other["id"].as_str().unwrap()
        )))
        .header("Authorization", format!("Bearer {}", u_token))
        .send()
        .await
        .unwrap();

    let clubs: Value = server
        .client
        .get(server.url(&format!("/api/users/{}/bookclubs", u.id)))
        .header("Authorization", format!("Bearer {}", u_token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let clubs = clubs.as_array().unwrap();
    assert_eq!(clubs.len(), 2);
    let ids: Vec<&str> = clubs.iter().map(|c| c["id"].as_str().unwrap()).collect();
    assert!(ids.contains(&own["id"].as_str().unwrap()));

    // The full list shows membership flags for the caller
    let all: Value = server
        .client
        .get(server.url("/api/bookclubs"))
        .header("Authorization", format!("Bearer {}", v_token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    for club in all.as_array().unwrap() {
        if club["id"] == other["id"] {
            assert_eq!(club["isCreator"], true);
        } else {
            assert_eq!(club["isCreator"], false);
            assert_eq!(club["isMember"], false);
        }
    }
}
