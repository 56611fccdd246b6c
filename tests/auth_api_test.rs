mod common;

use axum::http::{Method, StatusCode};
use common::{send, signup, test_app, MockAssistant};
use serde_json::json;

#[tokio::test]
async fn signup_login_logout_flow() {
    let (_, app) = test_app(MockAssistant::new());

    let token = signup(&app, "educator@example.com").await;
    let (status, profile) = send(&app, Method::GET, "/api/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["email"], "educator@example.com");
    assert!(profile.get("passwordHash").is_none());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({"email": "educator@example.com", "password": "secret123"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let second = body["token"].as_str().unwrap().to_string();

    let (status, _) = send(&app, Method::POST, "/api/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, Method::GET, "/api/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");

    // Other login sessions are unaffected.
    let (status, _) = send(&app, Method::GET, "/api/profile", Some(&second), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn duplicate_signup_is_a_conflict() {
    let (_, app) = test_app(MockAssistant::new());
    signup(&app, "dup@example.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/signup",
        None,
        Some(json!({"email": "dup@example.com", "name": "Again", "password": "secret123"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "duplicate_account");
}

#[tokio::test]
async fn wrong_password_and_unknown_email_look_the_same() {
    let (_, app) = test_app(MockAssistant::new());
    signup(&app, "t@example.com").await;

    for (email, password) in [("t@example.com", "wrong-pass"), ("nobody@example.com", "secret123")] {
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": email, "password": password})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "invalid_credential");
    }
}

#[tokio::test]
async fn reset_password_replaces_the_credential_and_closes_sessions() {
    let (_, app) = test_app(MockAssistant::new());
    let old_token = signup(&app, "r@example.com").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/reset-password",
        Some(&old_token),
        Some(json!({"email": "r@example.com", "newPassword": "brand-new-pass"})),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, Method::GET, "/api/profile", Some(&old_token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({"email": "r@example.com", "password": "secret123"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({"email": "r@example.com", "password": "brand-new-pass"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let new_token = body["token"].as_str().expect("token").to_string();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/reset-password",
        Some(&new_token),
        Some(json!({"email": "ghost@example.com", "newPassword": "brand-new-pass"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn reset_password_requires_the_account_owner() {
    let (_, app) = test_app(MockAssistant::new());
    signup(&app, "victim@example.com").await;
    let intruder = signup(&app, "intruder@example.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/reset-password",
        None,
        Some(json!({"email": "victim@example.com", "newPassword": "taken-over"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/reset-password",
        Some(&intruder),
        Some(json!({"email": "victim@example.com", "newPassword": "taken-over"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({"email": "victim@example.com", "password": "secret123"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn profile_edits_keep_emails_unique() {
    let (_, app) = test_app(MockAssistant::new());
    signup(&app, "first@example.com").await;
    let token = signup(&app, "second@example.com").await;

    let (status, body) = send(
        &app,
        Method::PATCH,
        "/api/profile",
        Some(&token),
        Some(json!({"email": "first@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "duplicate_account");

    let (status, body) = send(
        &app,
        Method::PATCH,
        "/api/profile",
        Some(&token),
        Some(json!({"name": "Renamed", "avatar": "https://img.example.com/a.png"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Renamed");
    assert_eq!(body["avatar"], "https://img.example.com/a.png");
    assert_eq!(body["email"], "second@example.com");
}

#[tokio::test]
async fn protected_routes_need_a_bearer_token() {
    let (_, app) = test_app(MockAssistant::new());

    let (status, _) = send(&app, Method::GET, "/api/quizzes", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, Method::GET, "/api/quizzes", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");

    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
