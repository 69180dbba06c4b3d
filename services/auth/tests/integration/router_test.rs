//! Requests through the full router. The state holds a disconnected database, so these
//! cover everything decided before the first query.

use axum::http::{HeaderName, StatusCode, header};
use axum_test::TestServer;
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};

use parcelbox_auth::router::build_router;
use parcelbox_auth::state::AppState;
use parcelbox_domain::id::{IdentityId, SessionId};
use parcelbox_testing::auth::{MockAuth, TEST_SECRET};

use crate::helpers::TEST_TTL_SECS;

fn server() -> TestServer {
    let state = AppState::new(
        DatabaseConnection::Disconnected,
        TEST_SECRET,
        "example.com",
        TEST_TTL_SECS,
    );
    TestServer::new(build_router(state)).unwrap()
}

#[tokio::test]
async fn should_answer_liveness_probe() {
    server().get("/healthz").await.assert_status_ok();
}

#[tokio::test]
async fn should_report_unready_without_database() {
    let response = server().get("/readyz").await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.json::<Value>()["kind"], "UNAVAILABLE");
}

#[tokio::test]
async fn should_attach_request_id() {
    let response = server().get("/healthz").await;
    let id = response.header(HeaderName::from_static("x-request-id"));
    assert!(!id.is_empty());
}

#[tokio::test]
async fn should_require_token_for_current_session() {
    server()
        .get("/auth/session")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_reject_expired_token() {
    let auth = MockAuth::expired(IdentityId::new(), SessionId::new());
    server()
        .get("/auth/session")
        .add_header(header::AUTHORIZATION, auth.bearer())
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_require_token_for_sign_out() {
    server()
        .delete("/auth/session")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_require_token_for_profiles() {
    let id = IdentityId::new();
    let server = server();
    server
        .get(&format!("/profiles/{id}"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    server
        .patch(&format!("/profiles/{id}"))
        .json(&json!({ "first_name": "Ana" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    server
        .get(&format!("/profiles/{id}/events"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_reject_invalid_sign_up_before_touching_storage() {
    let response = server()
        .post("/auth/accounts")
        .json(&json!({ "email": "ana@example.com", "password": "123" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["kind"], "INVALID_INPUT");
}

#[tokio::test]
async fn should_forbid_anonymous_admin_sign_up() {
    let response = server()
        .post("/auth/accounts")
        .json(&json!({ "email": "ana@example.com", "password": "secret1", "role": "admin" }))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(response.json::<Value>()["kind"], "FORBIDDEN");
}

#[tokio::test]
async fn should_hide_storage_failure_behind_internal_error() {
    let auth = MockAuth::new(IdentityId::new(), SessionId::new());
    let response = server()
        .get("/auth/session")
        .add_header(header::COOKIE, auth.cookie())
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body = response.json::<Value>();
    assert_eq!(body["kind"], "INTERNAL");
    assert_eq!(body["message"], "internal error");
}

#[tokio::test]
async fn should_reject_unknown_role_in_sign_up() {
    server()
        .post("/auth/accounts")
        .json(&json!({ "email": "ana@example.com", "password": "secret1", "role": "owner" }))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn should_ignore_expired_token_during_customer_sign_up() {
    let auth = MockAuth::expired(IdentityId::new(), SessionId::new());
    let server = server();

    let invalid = server
        .post("/auth/accounts")
        .add_header(header::AUTHORIZATION, auth.bearer())
        .json(&json!({ "email": "ana@example.com", "password": "123" }))
        .await;
    invalid.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(invalid.json::<Value>()["kind"], "INVALID_INPUT");

    // A valid body gets past the token and fails only at the disconnected database.
    let valid = server
        .post("/auth/accounts")
        .add_header(header::COOKIE, auth.cookie())
        .json(&json!({ "email": "ana@example.com", "password": "secret1", "role": "customer" }))
        .await;
    valid.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn should_forbid_staff_sign_up_with_expired_token() {
    let auth = MockAuth::expired(IdentityId::new(), SessionId::new());
    let response = server()
        .post("/auth/accounts")
        .add_header(header::AUTHORIZATION, auth.bearer())
        .json(&json!({ "email": "ana@example.com", "password": "secret1", "role": "location_staff" }))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
}
