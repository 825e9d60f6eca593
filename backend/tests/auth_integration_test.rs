//! Integration tests for authentication against Postgres

mod common;

use axum::http::StatusCode;
use mini_blog_backend::auth::AuthError;
use serde_json::json;

async fn login(app: &common::TestApp, username: &str, password: &str) -> (StatusCode, String) {
    app.post_form(
        "/api/users/token",
        &format!("username={}&password={}", username, password),
    )
    .await
}

async fn access_token(app: &common::TestApp, username: &str, password: &str) -> String {
    let (status, body) = login(app, username, password).await;
    assert_eq!(status, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    body["access_token"].as_str().unwrap().to_string()
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_register_and_me() {
    let app = common::TestApp::new().await;
    let username = app.create_test_user("Secret1!").await;

    let token = access_token(&app, &username, "Secret1!").await;
    let (status, body) = app.get_auth("/api/users", &token).await;

    assert_eq!(status, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["username"], username.as_str());
    assert!(body["profile_img"].as_str().unwrap().ends_with(&format!("{}.svg", username)));
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_register_duplicate_username() {
    let app = common::TestApp::new().await;
    let username = app.create_test_user("Secret1!").await;

    let body = json!({ "username": username, "password": "x", "password2": "x" });
    let (status, _) = app.post("/api/users/create", &body.to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_login_wrong_password() {
    let app = common::TestApp::new().await;
    let username = app.create_test_user("Secret1!").await;

    let (status, _) = login(&app, &username, "WrongPassword").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_protected_endpoint_with_expired_token() {
    let app = common::TestApp::new().await;

    // exp = 1 (1970), signature invalid as well
    let fake_token = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.eyJzdWIiOiIxMjM0NTY3ODkwIiwiZXhwIjoxfQ.invalid";

    let (status, _) = app.get_auth("/api/users", fake_token).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_reset_consumes_all_tokens_for_user() {
    let app = common::TestApp::new().await;
    let username = app.create_test_user("Secret1!").await;
    let auth = app.state.auth();

    let first = auth.request_reset(&username).await.unwrap();
    let second = auth.request_reset(&username).await.unwrap();
    assert_eq!(app.reset_token_count(&username).await, 2);

    auth.complete_reset(&first, "Reset3!").await.unwrap();

    assert_eq!(app.reset_token_count(&username).await, 0);
    assert!(auth.authenticate(&username, "Reset3!").await.unwrap().is_some());
    assert!(matches!(
        auth.complete_reset(&second, "Again4!").await,
        Err(AuthError::TokenNotFound)
    ));
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_expired_reset_token_burns_outstanding_tokens() {
    let app = common::TestApp::new().await;
    let username = app.create_test_user("Secret1!").await;
    let auth = app.state.auth();

    auth.request_reset(&username).await.unwrap();
    sqlx::query(
        r#"
        INSERT INTO reset_password (token, user_id, token_expiry)
        SELECT 'expired-' || id, id, NOW() - INTERVAL '1 hour' FROM users WHERE username = $1
        "#,
    )
    .bind(&username)
    .execute(&app.pool)
    .await
    .unwrap();
    assert_eq!(app.reset_token_count(&username).await, 2);

    let user = auth.current_user(&auth.jwt().issue(&username).unwrap()).await.unwrap();
    let expired = format!("expired-{}", user.id);

    let (status, _) = app
        .post(
            "/api/users/password-reset/confirm",
            &json!({ "token": expired, "new_password": "Reset3!" }).to_string(),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.reset_token_count(&username).await, 0);
    assert!(auth.authenticate(&username, "Secret1!").await.unwrap().is_some());
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_concurrent_consumption_succeeds_once() {
    let app = common::TestApp::new().await;
    let username = app.create_test_user("Secret1!").await;
    let auth = app.state.auth().clone();

    let first = auth.request_reset(&username).await.unwrap();
    let second = auth.request_reset(&username).await.unwrap();

    let (a, b) = tokio::join!(
        auth.complete_reset(&first, "RaceA1!"),
        auth.complete_reset(&second, "RaceB2!"),
    );

    assert!(a.is_ok() ^ b.is_ok(), "exactly one consumption must win");
    assert_eq!(app.reset_token_count(&username).await, 0);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_deleting_user_cascades_to_reset_tokens() {
    let app = common::TestApp::new().await;
    let username = app.create_test_user("Secret1!").await;
    let token = app.state.auth().request_reset(&username).await.unwrap();

    sqlx::query("DELETE FROM users WHERE username = $1")
        .bind(&username)
        .execute(&app.pool)
        .await
        .unwrap();

    let remaining: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM reset_password WHERE token = $1")
            .bind(&token)
            .fetch_one(&app.pool)
            .await
            .unwrap();
    assert_eq!(remaining, 0);
}
