mod common;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use reqwest::StatusCode;
use serde_json::{json, Value};
use uuid::Uuid;

use common::{cookie_value, set_cookie, TestApp, PASSWORD};
use notebook_api::auth::{TokenKind, TokenService};

#[tokio::test]
async fn health_and_root_respond() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.client.get(app.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["status"], "ok");

    let res = app.client.get(app.url("/")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["success"], true);
    Ok(())
}

#[tokio::test]
async fn register_then_login_yields_token_for_same_identity() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.register("alice", PASSWORD).await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["username"], "alice");
    assert!(body["data"].get("password_hash").is_none());
    let user_id: Uuid = body["data"]["id"].as_str().context("id")?.parse()?;

    let res = app.login("alice", PASSWORD).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let access_cookie = set_cookie(&res, "access_token").context("access cookie")?;
    let refresh_cookie = set_cookie(&res, "refresh_token").context("refresh cookie")?;
    for cookie in [&access_cookie, &refresh_cookie] {
        assert!(cookie.contains("HttpOnly"), "{}", cookie);
        assert!(cookie.contains("Path=/"), "{}", cookie);
    }

    let body: Value = res.json().await?;
    let access = body["data"]["access_token"].as_str().context("access_token")?;
    assert_eq!(cookie_value(&access_cookie), access);
    assert_eq!(body["data"]["user"]["id"], user_id.to_string());

    let claims = app.state.tokens.validate(access, TokenKind::Access)?;
    assert_eq!(claims.user_id, user_id);

    let res = app.get(access, "/me").await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["id"], user_id.to_string());
    assert_eq!(body["data"]["username"], "alice");
    Ok(())
}

#[tokio::test]
async fn duplicate_username_conflicts_regardless_of_password() -> Result<()> {
    let app = TestApp::spawn().await?;

    assert_eq!(app.register("alice", PASSWORD).await?.status(), StatusCode::CREATED);

    let res = app.register("alice", "a different password").await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = res.json().await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Username already exists");
    assert_eq!(body["code"], "CONFLICT");
    Ok(())
}

#[tokio::test]
async fn register_rejects_bad_input() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.register("bob", "short").await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["password"].is_string());

    let res = app
        .client
        .post(app.url("/register"))
        .header("content-type", "application/json")
        .body("{\"username\": ")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], "INVALID_JSON");

    let res = app
        .client
        .post(app.url("/register"))
        .json(&json!({ "username": "bob" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn bad_credentials_are_indistinguishable() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.register("alice", PASSWORD).await?;

    let wrong_password = app.login("alice", "not the password").await?;
    let unknown_user = app.login("nobody", PASSWORD).await?;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookie(&wrong_password, "access_token").is_none());

    let a: Value = wrong_password.json().await?;
    let b: Value = unknown_user.json().await?;
    assert_eq!(a, b);
    assert_eq!(a["error"], "Invalid credentials");
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_a_valid_bearer_token() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.client.get(app.url("/notebooks")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], "Authorization header is required");

    let res = app
        .client
        .get(app.url("/notebooks"))
        .header("authorization", "Token abc")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], "Invalid token format");

    let res = app.get("not-a-jwt", "/notebooks").await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], "Invalid token");
    Ok(())
}

#[tokio::test]
async fn expired_access_token_is_rejected_as_invalid() -> Result<()> {
    let app = TestApp::spawn().await?;
    let (user_id, _) = app.signup("alice").await?;
    let user_id: Uuid = user_id.parse()?;

    // Issued 16 minutes ago with a 15 minute lifetime.
    let stale = app
        .state
        .tokens
        .issue_at(user_id, TokenKind::Access, Utc::now() - Duration::minutes(16))?;

    let res = app.get(&stale, "/me").await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], "Invalid token");
    Ok(())
}

#[tokio::test]
async fn token_signed_with_another_secret_is_rejected() -> Result<()> {
    let app = TestApp::spawn().await?;
    let (user_id, _) = app.signup("alice").await?;

    let config = notebook_api::config::AppConfig::development().with_jwt_secret("someone-else");
    let foreign = TokenService::new(&config.security)?.issue_access(user_id.parse()?)?;

    let res = app.get(&foreign, "/me").await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn refresh_token_cannot_be_used_as_bearer() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.register("alice", PASSWORD).await?;
    let body: Value = app.login("alice", PASSWORD).await?.json().await?;
    let refresh = body["data"]["refresh_token"].as_str().context("refresh_token")?;

    let res = app.get(refresh, "/me").await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn refresh_mints_access_token_and_is_reusable() -> Result<()> {
    let app = TestApp::spawn().await?;
    let res = app.register("alice", PASSWORD).await?;
    let body: Value = res.json().await?;
    let user_id = body["data"]["id"].as_str().context("id")?.to_string();

    let res = app.login("alice", PASSWORD).await?;
    let refresh_cookie = set_cookie(&res, "refresh_token").context("refresh cookie")?;
    let refresh = cookie_value(&refresh_cookie).to_string();

    for _ in 0..2 {
        let res = app
            .client
            .post(app.url("/refresh-token"))
            .header("cookie", format!("refresh_token={}", refresh))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(set_cookie(&res, "access_token").is_some());

        let body: Value = res.json().await?;
        assert_eq!(body["success"], true);
        let access = body["data"]["access_token"].as_str().context("access_token")?;
        let claims = app.state.tokens.validate(access, TokenKind::Access)?;
        assert_eq!(claims.user_id.to_string(), user_id);
    }
    Ok(())
}

#[tokio::test]
async fn refresh_without_cookie_or_with_access_token_fails() -> Result<()> {
    let app = TestApp::spawn().await?;
    let (_, access) = app.signup("alice").await?;

    let res = app.client.post(app.url("/refresh-token")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], "Refresh token is required");

    let res = app
        .client
        .post(app.url("/refresh-token"))
        .header("cookie", format!("refresh_token={}", access))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], "Invalid token");
    Ok(())
}

#[tokio::test]
async fn logout_expires_both_cookies() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.client.post(app.url("/logout")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    for name in ["access_token", "refresh_token"] {
        let cookie = set_cookie(&res, name).context("removal cookie")?;
        assert_eq!(cookie_value(&cookie), "");
        assert!(cookie.contains("Max-Age=0"), "{}", cookie);
    }
    Ok(())
}

#[tokio::test]
async fn change_username_and_conflict() -> Result<()> {
    let app = TestApp::spawn().await?;
    let (_, alice) = app.signup("alice").await?;
    app.signup("bob").await?;

    let res = app.put(&alice, "/me/username", json!({ "new_username": "bob" })).await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = app.put(&alice, "/me/username", json!({ "new_username": "alicia" })).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["username"], "alicia");

    assert_eq!(app.login("alicia", PASSWORD).await?.status(), StatusCode::OK);
    assert_eq!(app.login("alice", PASSWORD).await?.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}
