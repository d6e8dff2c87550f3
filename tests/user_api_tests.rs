mod common;

use axum::http::StatusCode;
use common::{PASSWORD, request, spawn_app};
use recipebox::entities::users;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde_json::json;

#[tokio::test]
async fn test_create_user_success() {
    let app = spawn_app().await;

    let (status, body) = app.create_user("test@example.com", PASSWORD).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["email"], "test@example.com");
    assert_eq!(body["data"]["name"], "Test name");
    assert!(body["data"].get("password").is_none());

    let user = app
        .state
        .store()
        .verify_user_password("test@example.com", PASSWORD)
        .await
        .unwrap();
    assert!(user.is_some());
}

#[tokio::test]
async fn test_create_user_normalizes_email_domain() {
    let app = spawn_app().await;

    let (status, body) = app.create_user("Test2@EXAMPLE.com", PASSWORD).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["email"], "Test2@example.com");
}

#[tokio::test]
async fn test_create_user_rejects_duplicate_email() {
    let app = spawn_app().await;

    let (status, _) = app.create_user("test@example.com", PASSWORD).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.create_user("test@EXAMPLE.COM", PASSWORD).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_create_user_rejects_short_password() {
    let app = spawn_app().await;

    let (status, _) = app.create_user("test@example.com", "pw").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let exists = app
        .state
        .store()
        .get_user_by_email("test@example.com")
        .await
        .unwrap();
    assert!(exists.is_none());
}

#[tokio::test]
async fn test_create_user_rejects_empty_and_malformed_email() {
    let app = spawn_app().await;

    let (status, body) = app.create_user("", PASSWORD).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("email"));

    let (status, _) = app.create_user("not-an-email", PASSWORD).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_user_missing_field_is_bad_request() {
    let app = spawn_app().await;

    let (status, body) = app
        .post("/api/user/create", None, json!({ "email": "a@example.com" }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_create_token_for_user() {
    let app = spawn_app().await;
    app.create_user("test@example.com", PASSWORD).await;

    let (status, body) = app
        .post(
            "/api/user/token",
            None,
            json!({ "email": "test@example.com", "password": PASSWORD }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    let token = body["data"]["token"].as_str().unwrap();
    assert_eq!(token.len(), 64);

    // Same token on every login
    let (_, again) = app
        .post(
            "/api/user/token",
            None,
            json!({ "email": "test@example.com", "password": PASSWORD }),
        )
        .await;
    assert_eq!(again["data"]["token"], token);
}

#[tokio::test]
async fn test_create_token_bad_credentials() {
    let app = spawn_app().await;
    app.create_user("test@example.com", PASSWORD).await;

    let (status, body) = app
        .post(
            "/api/user/token",
            None,
            json!({ "email": "test@example.com", "password": "wrong" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["data"].get("token").is_none());

    let (status, _) = app
        .post(
            "/api/user/token",
            None,
            json!({ "email": "nobody@example.com", "password": PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_token_blank_password() {
    let app = spawn_app().await;
    app.create_user("test@example.com", PASSWORD).await;

    let (status, _) = app
        .post(
            "/api/user/token",
            None,
            json!({ "email": "test@example.com", "password": "" }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_retrieve_me_unauthorized() {
    let app = spawn_app().await;

    let (status, body) = app.get("/api/user/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = app.get("/api/user/me", Some("not-a-real-token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_retrieve_me_with_bearer_scheme() {
    let app = spawn_app().await;
    let token = app.login_as("test@example.com").await;

    let request = axum::http::Request::builder()
        .uri("/api/user/me")
        .header("Authorization", format!("Bearer {token}"))
        .body(axum::body::Body::empty())
        .unwrap();
    let (status, body) = app.send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({ "email": "test@example.com", "name": "Test name" }));
}

#[tokio::test]
async fn test_post_me_not_allowed() {
    let app = spawn_app().await;
    let token = app.login_as("test@example.com").await;

    let (status, _) = app
        .send(request("POST", "/api/user/me", Some(&token), Some(json!({}))))
        .await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_update_user_profile() {
    let app = spawn_app().await;
    let token = app.login_as("test@example.com").await;

    let (status, body) = app
        .patch(
            "/api/user/me",
            &token,
            json!({ "name": "Updated name", "password": "newpassword123" }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Updated name");

    let store = app.state.store();
    assert!(
        store
            .verify_user_password("test@example.com", "newpassword123")
            .await
            .unwrap()
            .is_some()
    );
    assert!(
        store
            .verify_user_password("test@example.com", PASSWORD)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_update_profile_rejects_short_password() {
    let app = spawn_app().await;
    let token = app.login_as("test@example.com").await;

    let (status, _) = app
        .put(
            "/api/user/me",
            &token,
            json!({ "email": "test@example.com", "password": "abc", "name": "Test name" }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_full_profile_update_requires_all_fields() {
    let app = spawn_app().await;
    let token = app.login_as("test@example.com").await;

    let (status, body) = app.put("/api/user/me", &token, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "email: This field is required");

    let (status, body) = app
        .put(
            "/api/user/me",
            &token,
            json!({ "email": "test@example.com", "password": "newpassword123" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "name: This field is required");

    let (status, body) = app
        .put(
            "/api/user/me",
            &token,
            json!({
                "email": "renamed@example.com",
                "password": "newpassword123",
                "name": "Renamed",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({ "email": "renamed@example.com", "name": "Renamed" }));
}

#[tokio::test]
async fn test_create_superuser_sets_flags() {
    let app = spawn_app().await;
    let users = app.state.user_service();

    let admin = users
        .create_superuser("admin@EXAMPLE.com", PASSWORD)
        .await
        .unwrap();
    assert_eq!(admin.email, "admin@example.com");
    assert!(admin.is_staff);
    assert!(admin.is_superuser);
    assert!(admin.is_active);

    let regular = users
        .create_user("regular@example.com", PASSWORD, "Regular")
        .await
        .unwrap();
    assert!(!regular.is_staff);
    assert!(!regular.is_superuser);

    let stored = app.state.store().get_user(admin.id).await.unwrap().unwrap();
    assert!(stored.is_staff && stored.is_superuser);
}

#[tokio::test]
async fn test_inactive_user_is_forbidden() {
    let app = spawn_app().await;
    let token = app.login_as("test@example.com").await;

    let store = app.state.store();
    let user = store
        .get_user_by_email("test@example.com")
        .await
        .unwrap()
        .unwrap();

    let model = users::Entity::find_by_id(user.id)
        .one(&store.conn)
        .await
        .unwrap()
        .unwrap();
    let mut active: users::ActiveModel = model.into();
    active.is_active = Set(false);
    active.update(&store.conn).await.unwrap();

    let (status, _) = app.get("/api/user/me", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .post(
            "/api/user/token",
            None,
            json!({ "email": "test@example.com", "password": PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_is_public() {
    let app = spawn_app().await;

    let (status, body) = app.get("/api/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["database"], true);
}

#[tokio::test]
async fn test_metrics_requires_auth() {
    let app = spawn_app().await;

    let (status, _) = app.get("/api/metrics", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
