mod common;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use questline::{names, router, services::tokens::TokenIssuer};
use tower::ServiceExt;

async fn app() -> axum::Router {
    let db = common::create_test_db().await;
    router(common::app_state(db))
}

fn protected_routes() -> Vec<(Method, String)> {
    vec![
        (Method::GET, names::PROFILE_URL.to_string()),
        (Method::GET, names::USER_PROGRESS_URL.to_string()),
        (Method::GET, names::USER_LEVELS_URL.to_string()),
        (Method::POST, names::submit_answers_url(1)),
        (Method::POST, names::LOGOUT_URL.to_string()),
        (Method::POST, names::CHANGE_PASSWORD_URL.to_string()),
    ]
}

#[tokio::test]
async fn protected_routes_reject_requests_without_bearer_token() {
    let app = app().await;

    for (method, uri) in protected_routes() {
        let req = Request::builder()
            .method(method)
            .uri(&uri)
            .header("content-type", "application/json")
            .body(Body::from("{}"))
            .expect("request build should succeed");
        let resp = app.clone().oneshot(req).await.expect("router should respond");

        assert_eq!(
            resp.status(),
            StatusCode::UNAUTHORIZED,
            "expected UNAUTHORIZED for {uri}",
        );
    }
}

#[tokio::test]
async fn protected_routes_reject_foreign_refresh_and_expired_tokens() {
    let db = common::create_test_db().await;
    let user_id = common::create_user(&db, "a@example.com").await;
    let app = router(common::app_state(db));

    let foreign = TokenIssuer::new("another-secret").issue_pair(user_id).unwrap();
    let own = TokenIssuer::new(common::TEST_SECRET).issue_pair(user_id).unwrap();
    let expired = TokenIssuer::with_lifetimes(
        common::TEST_SECRET,
        chrono::TimeDelta::seconds(-10),
        chrono::TimeDelta::seconds(-10),
    )
    .issue_pair(user_id)
    .unwrap();

    for token in [
        foreign.access_token,
        own.refresh_token,
        expired.access_token,
        "garbage".to_string(),
    ] {
        let req = Request::builder()
            .method(Method::GET)
            .uri(names::PROFILE_URL)
            .header("authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .expect("request build should succeed");
        let resp = app.clone().oneshot(req).await.expect("router should respond");

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn protected_routes_accept_valid_access_token() {
    let db = common::create_test_db().await;
    let user_id = common::create_user(&db, "a@example.com").await;
    let app = router(common::app_state(db));

    let tokens = TokenIssuer::new(common::TEST_SECRET)
        .issue_pair(user_id)
        .unwrap();

    let req = Request::builder()
        .method(Method::GET)
        .uri(names::PROFILE_URL)
        .header("authorization", format!("Bearer {}", tokens.access_token))
        .body(Body::empty())
        .expect("request build should succeed");

    let resp = app.oneshot(req).await.expect("router should respond");

    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn public_catalog_routes_need_no_token() {
    let app = app().await;

    for uri in [
        names::LEVELS_URL,
        names::CODING_TOPICS_URL,
        names::JOBS_URL,
        names::HEALTH_URL,
    ] {
        let req = Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request build should succeed");
        let resp = app.clone().oneshot(req).await.expect("router should respond");

        assert_eq!(resp.status(), StatusCode::OK, "expected OK for {uri}");
    }
}
