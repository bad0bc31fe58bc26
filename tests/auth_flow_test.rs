//! Router-level authentication tests on mock providers. No live database or
//! Redis is required; every request here is decided before a collection is
//! touched.

mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use common::{admin_user, member_user, open_session, test_state};
use learnhub::build_router;

async fn test_router() -> (Router, learnhub::AppState) {
    let state = test_state().await;
    let router = build_router(state.clone()).expect("Failed to build router");
    (router, state)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("Body is not JSON")
}

fn cookie_header(access_token: &str) -> String {
    format!("access_token={}", access_token)
}

#[tokio::test]
async fn unknown_route_returns_json_404() {
    let (router, _) = test_router().await;

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/no-such-route")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn protected_route_without_cookie_is_rejected() {
    let (router, _) = test_router().await;

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/me")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Please login to access this resource");
}

#[tokio::test]
async fn me_returns_principal_from_session() {
    let (router, state) = test_router().await;
    let user = member_user();
    let pair = open_session(&state, &user).await;

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/me")
                .header(header::COOKIE, cookie_header(&pair.access_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["id"], Value::String(user.id.clone()));
    assert_eq!(body["user"]["email"], Value::String(user.email.clone()));
}

#[tokio::test]
async fn logout_revokes_session_for_valid_token() {
    let (router, state) = test_router().await;
    let user = member_user();
    let pair = open_session(&state, &user).await;

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/logout")
                .header(header::COOKIE, cookie_header(&pair.access_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Token is still signature-valid; the missing snapshot rejects it.
    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/me")
                .header(header::COOKIE, cookie_header(&pair.access_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Session expired, please login again");
}

#[tokio::test]
async fn refresh_rotates_tokens_and_sets_cookies() {
    let (router, state) = test_router().await;
    let user = member_user();
    let pair = open_session(&state, &user).await;

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/refreshtoken")
                .header(
                    header::COOKIE,
                    format!("refresh_token={}", pair.refresh_token),
                )
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let set_cookies: Vec<String> = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    assert!(set_cookies.iter().any(|c| c.starts_with("access_token=")));
    assert!(set_cookies.iter().any(|c| c.starts_with("refresh_token=")));

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert!(body["access_token"].as_str().is_some());
}

#[tokio::test]
async fn refresh_without_cookie_is_rejected() {
    let (router, _) = test_router().await;

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/refreshtoken")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn member_cannot_reach_admin_routes() {
    let (router, state) = test_router().await;
    let user = member_user();
    let pair = open_session(&state, &user).await;

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/get-all-users")
                .header(header::COOKIE, cookie_header(&pair.access_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn admin_passes_role_gate() {
    let (router, state) = test_router().await;
    let user = admin_user();
    let pair = open_session(&state, &user).await;

    // Reaches the handler, which then fails on the absent database; the role
    // gate itself must not be what rejects this request.
    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/get-all-users")
                .header(header::COOKIE, cookie_header(&pair.access_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_ne!(response.status(), StatusCode::FORBIDDEN);
    assert_ne!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn registration_rejects_invalid_email() {
    let (router, _) = test_router().await;

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/registration")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"name":"Ada","email":"not-an-email","password":"secret123"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn registration_rejects_short_password() {
    let (router, _) = test_router().await;

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/registration")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"name":"Ada","email":"ada@example.com","password":"abc"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn garbage_access_token_is_rejected() {
    let (router, _) = test_router().await;

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/me")
                .header(header::COOKIE, "access_token=garbage")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Invalid or expired credential");
}
