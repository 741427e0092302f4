//! Integration tests for login, registration and the login gate.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;

use speakerlab_core::Tier;
use speakerlab_integration_tests::{
    PASSWORD, ScriptedClient, TestApp, body_text, location, session_cookie,
};

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoints_need_no_session() {
    let app = TestApp::new(ScriptedClient::replying("")).await;

    let response = app.get("/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");

    let response = app.get("/health/ready", None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let app = TestApp::new(ScriptedClient::replying("")).await;

    let response = app.get("/health", None).await;
    assert!(response.headers().contains_key("x-request-id"));
}

// =============================================================================
// Login gate
// =============================================================================

#[tokio::test]
async fn test_protected_pages_redirect_to_login() {
    let app = TestApp::new(ScriptedClient::replying("")).await;

    for uri in ["/", "/upgrade", "/admin", "/download/scorecard_20250101120000000.pdf"] {
        let response = app.get(uri, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&response), Some("/login"), "{uri}");
    }
}

#[tokio::test]
async fn test_analysis_post_requires_login() {
    let client = ScriptedClient::replying("not json");
    let app = TestApp::new(client.clone()).await;

    let response = app.post_form("/", &[("speech_text", "Hello")], None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(client.requests().is_empty());
}

#[tokio::test]
async fn test_login_and_register_pages_render() {
    let app = TestApp::new(ScriptedClient::replying("")).await;

    let body = body_text(app.get("/login", None).await).await;
    assert!(body.contains("name=\"password\""));

    let body = body_text(app.get("/register", None).await).await;
    assert!(body.contains("name=\"name\""));
}

// =============================================================================
// Registration
// =============================================================================

#[tokio::test]
async fn test_register_logs_in_on_free_tier() {
    let app = TestApp::new(ScriptedClient::replying("")).await;

    let response = app
        .post_form(
            "/register",
            &[("email", "Maria@Example.com"), ("password", "secret1"), ("name", "Maria")],
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/"));
    let cookie = session_cookie(&response).expect("session cookie");

    let response = app.get("/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Maria"));
    assert!(body.contains("Explorer"));
    assert!(body.contains("0 / 3 analize azi"));
}

#[tokio::test]
async fn test_register_rejects_short_password() {
    let app = TestApp::new(ScriptedClient::replying("")).await;

    let response = app
        .post_form(
            "/register",
            &[("email", "maria@example.com"), ("password", "12345"), ("name", "Maria")],
            None,
        )
        .await;
    assert_eq!(location(&response), Some("/register?error=password"));
    assert!(session_cookie(&response).is_none());

    let body = body_text(app.get("/register?error=password", None).await).await;
    assert!(body.contains("cel puțin 6 caractere"));
}

#[tokio::test]
async fn test_register_rejects_existing_email() {
    let app = TestApp::new(ScriptedClient::replying("")).await;
    app.signup("maria@example.com", Tier::Free).await;

    let response = app
        .post_form(
            "/register",
            &[("email", "maria@example.com"), ("password", "another1"), ("name", "X")],
            None,
        )
        .await;
    assert_eq!(location(&response), Some("/register?error=exists"));
}

// =============================================================================
// Login / logout
// =============================================================================

#[tokio::test]
async fn test_login_with_wrong_password() {
    let app = TestApp::new(ScriptedClient::replying("")).await;
    app.signup("ana@example.com", Tier::Free).await;

    let response = app
        .post_form(
            "/login",
            &[("email", "ana@example.com"), ("password", "wrong-password")],
            None,
        )
        .await;
    assert_eq!(location(&response), Some("/login?error=credentials"));
    assert!(session_cookie(&response).is_none());

    let body = body_text(app.get("/login?error=credentials", None).await).await;
    assert!(body.contains("Email sau parolă incorectă."));
}

#[tokio::test]
async fn test_login_is_case_insensitive_on_email() {
    let app = TestApp::new(ScriptedClient::replying("")).await;
    app.signup("ana@example.com", Tier::Free).await;

    assert!(app.login("  ANA@example.com ", PASSWORD).await.is_some());
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app = TestApp::new(ScriptedClient::replying("")).await;
    let cookie = app.signup("ana@example.com", Tier::Free).await;

    let response = app.get("/logout", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));

    let response = app.get("/", Some(&cookie)).await;
    assert_eq!(location(&response), Some("/login"));
}

#[tokio::test]
async fn test_session_for_removed_account_is_cleared() {
    let app = TestApp::new(ScriptedClient::replying("")).await;
    let cookie = app.signup("ana@example.com", Tier::Free).await;

    let users = app.state.db().root().join("users.json");
    tokio::fs::write(&users, "{}").await.unwrap();

    let response = app.get("/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));

    // Re-creating the account does not revive the old session.
    app.signup("ana@example.com", Tier::Free).await;
    let response = app.get("/", Some(&cookie)).await;
    assert_eq!(location(&response), Some("/login"));
}
