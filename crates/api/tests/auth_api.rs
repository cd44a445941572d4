//! HTTP-level integration tests for staff login and staff access checks.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, post_json, staff_token, STAFF_USER_ID, TEST_PASSWORD};
use ventanilla_core::roles::{ROLE_ADMIN, ROLE_EDITOR};
use ventanilla_api::auth::jwt::validate_token;

fn credentials(username: &str, password: &str) -> serde_json::Value {
    serde_json::json!({ "username": username, "password": password })
}

#[tokio::test]
async fn login_success_returns_token_and_user() {
    let app = common::build_test_app();

    let response = post_json(
        app.app(),
        "/api/v1/auth/login",
        credentials("staff", TEST_PASSWORD),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["access_token"].is_string());
    assert_eq!(json["expires_in"], 3600);
    assert_eq!(json["user"]["id"], STAFF_USER_ID);
    assert_eq!(json["user"]["username"], "staff");
    assert_eq!(json["user"]["role"], "admin");
    assert!(json["user"].get("password_hash").is_none());

    let claims = validate_token(
        json["access_token"].as_str().unwrap(),
        &common::test_config().jwt,
    )
    .unwrap();
    assert_eq!(claims.sub, STAFF_USER_ID);
    assert_eq!(app.accounts.recorded_logins(), vec![STAFF_USER_ID]);
}

#[tokio::test]
async fn issued_token_opens_staff_endpoints() {
    let app = common::build_test_app();
    let json = body_json(
        post_json(
            app.app(),
            "/api/v1/auth/login",
            credentials("staff", TEST_PASSWORD),
        )
        .await,
    )
    .await;
    let token = json["access_token"].as_str().unwrap();

    let response = get_auth(app.app(), "/api/v1/pqrsd", token).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn wrong_password_and_unknown_user_look_the_same() {
    let app = common::build_test_app();

    let wrong = post_json(
        app.app(),
        "/api/v1/auth/login",
        credentials("staff", "incorrect_password"),
    )
    .await;
    let unknown = post_json(
        app.app(),
        "/api/v1/auth/login",
        credentials("nobody", TEST_PASSWORD),
    )
    .await;

    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(wrong).await, body_json(unknown).await);
    assert!(app.accounts.recorded_logins().is_empty());
}

#[tokio::test]
async fn deactivated_account_is_forbidden() {
    let app = common::build_test_app();

    let response = post_json(
        app.app(),
        "/api/v1/auth/login",
        credentials("former", TEST_PASSWORD),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["error"], "Account is deactivated");
}

#[tokio::test]
async fn login_without_password_is_a_json_400() {
    let app = common::build_test_app();

    let response = post_json(
        app.app(),
        "/api/v1/auth/login",
        serde_json::json!({ "username": "staff" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
    assert!(app.accounts.recorded_logins().is_empty());
}

#[tokio::test]
async fn editor_token_is_not_staff() {
    let app = common::build_test_app();
    let json = body_json(
        post_json(
            app.app(),
            "/api/v1/auth/login",
            credentials("editor", TEST_PASSWORD),
        )
        .await,
    )
    .await;
    let token = json["access_token"].as_str().unwrap();

    let response = get_auth(app.app(), "/api/v1/pqrsd", token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn deactivated_staff_loses_access_before_token_expiry() {
    let app = common::build_test_app();
    let token = staff_token();
    assert_eq!(
        get_auth(app.app(), "/api/v1/pqrsd", &token).await.status(),
        StatusCode::OK
    );

    app.accounts.update_user(STAFF_USER_ID, ROLE_ADMIN, false);

    let response = get_auth(app.app(), "/api/v1/pqrsd", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["error"], "Account is deactivated");
}

#[tokio::test]
async fn demoted_staff_loses_access_before_token_expiry() {
    let app = common::build_test_app();
    app.accounts.update_user(STAFF_USER_ID, ROLE_EDITOR, true);

    let response = get_auth(app.app(), "/api/v1/pqrsd", &staff_token()).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "FORBIDDEN");
}

#[tokio::test]
async fn deleted_staff_account_is_unauthorized() {
    let app = common::build_test_app();
    app.accounts.remove_user(STAFF_USER_ID);

    let response = get_auth(app.app(), "/api/v1/pqrsd", &staff_token()).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
}
