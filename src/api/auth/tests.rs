use axum::http::{header, Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::services::session_store::SESSION_COOKIE;
use crate::test_support;

fn extract_session_cookie(response: &axum::response::Response<axum::body::Body>) -> String {
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .expect("set-cookie header");

    assert!(cookie.starts_with(&format!("{SESSION_COOKIE}=")), "cookie: {cookie}");
    assert!(cookie.contains("HttpOnly"), "cookie must be http-only: {cookie}");

    cookie
        .split(';')
        .next()
        .and_then(|pair| pair.splitn(2, '=').nth(1))
        .expect("cookie value")
        .to_string()
}

#[tokio::test]
async fn signup_sets_session_cookie_and_me_resolves_it() {
    let ctx = test_support::setup_test_context().await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/signup",
            None,
            Some(json!({
                "email": "new@example.com",
                "fullName": "New User",
                "password": "long-enough-pass",
                "company": "Acme Corp"
            })),
        ))
        .await
        .expect("signup");

    assert_eq!(response.status(), StatusCode::CREATED);
    let token = extract_session_cookie(&response);
    let body = test_support::read_json(response).await;
    assert_eq!(body["email"], "new@example.com");
    assert!(body["company_id"].is_string(), "company should be attached: {body}");

    let me = ctx
        .app
        .clone()
        .oneshot(test_support::cookie_request(Method::GET, "/api/v1/auth/me", &token, None))
        .await
        .expect("me");

    let status = me.status();
    let me_body = test_support::read_json(me).await;
    assert_eq!(status, StatusCode::OK, "response: {me_body}");
    assert_eq!(me_body["email"], "new@example.com");
}

#[tokio::test]
async fn signup_duplicate_email_conflicts() {
    let ctx = test_support::setup_test_context().await;

    test_support::insert_user(ctx.state.db(), "taken@example.com", "Taken", "some-pass-123")
        .await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/signup",
            None,
            Some(json!({
                "email": "taken@example.com",
                "fullName": "Other",
                "password": "long-enough-pass"
            })),
        ))
        .await
        .expect("signup");

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn login_rejects_wrong_password_uniformly() {
    let ctx = test_support::setup_test_context().await;

    test_support::insert_user(ctx.state.db(), "login@example.com", "Login", "right-password")
        .await;

    let wrong = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({"email": "login@example.com", "password": "wrong-password"})),
        ))
        .await
        .expect("login wrong");
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    let unknown = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({"email": "nobody@example.com", "password": "whatever-pass"})),
        ))
        .await
        .expect("login unknown");
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);

    let ok = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({"email": "login@example.com", "password": "right-password"})),
        ))
        .await
        .expect("login ok");
    assert_eq!(ok.status(), StatusCode::OK);
    extract_session_cookie(&ok);
}

#[tokio::test]
async fn logout_revokes_the_session() {
    let ctx = test_support::setup_test_context().await;

    let user =
        test_support::insert_user(ctx.state.db(), "bye@example.com", "Bye", "bye-password")
            .await;
    let token = test_support::session_token(&ctx.state, &user.id).await;

    let me = ctx
        .app
        .clone()
        .oneshot(test_support::cookie_request(Method::GET, "/api/v1/auth/me", &token, None))
        .await
        .expect("me before logout");
    assert_eq!(me.status(), StatusCode::OK);

    let logout = ctx
        .app
        .clone()
        .oneshot(test_support::cookie_request(Method::POST, "/api/v1/auth/logout", &token, None))
        .await
        .expect("logout");
    assert_eq!(logout.status(), StatusCode::OK);

    let me_after = ctx
        .app
        .clone()
        .oneshot(test_support::cookie_request(Method::GET, "/api/v1/auth/me", &token, None))
        .await
        .expect("me after logout");
    assert_eq!(me_after.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_without_session_is_unauthorized() {
    let ctx = test_support::setup_test_context().await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::GET, "/api/v1/auth/me", None, None))
        .await
        .expect("me");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn signup_rate_limit_kicks_in() {
    let ctx = test_support::setup_test_context().await;

    let payload = json!({
        "email": "burst@example.com",
        "fullName": "Burst",
        "password": "long-enough-pass"
    });

    // First attempt signs up, the rest conflict, the eleventh trips the
    // limiter before the duplicate check runs.
    let mut last_status = StatusCode::OK;
    for _ in 0..11 {
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                "/api/v1/auth/signup",
                None,
                Some(payload.clone()),
            ))
            .await
            .expect("signup attempt");
        last_status = response.status();
    }

    assert_eq!(last_status, StatusCode::TOO_MANY_REQUESTS);
}
