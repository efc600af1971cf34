//! Integration tests for admin login and token-protected routes.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, get_auth, post_json, seed_admin};
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_with_correct_credentials_returns_token(pool: PgPool) {
    seed_admin(&pool, "warden", "a-long-enough-password").await;
    let app = common::build_test_app(pool.clone());

    let response = post_json(
        app.clone(),
        "/api/v1/auth/login",
        serde_json::json!({ "username": "warden", "password": "a-long-enough-password" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let token = json["data"]["access_token"].as_str().unwrap().to_string();
    assert!(!token.is_empty());
    assert_eq!(json["data"]["admin"]["username"], "warden");
    // The password hash never leaves the server.
    assert!(json["data"]["admin"].get("password_hash").is_none());

    // The token opens admin routes.
    let lockers = get_auth(app, "/api/v1/admin/lockers", &token).await;
    assert_eq!(lockers.status(), StatusCode::OK);

    // last_login_at was stamped.
    let last_login: Option<chrono::DateTime<chrono::Utc>> =
        sqlx::query_scalar("SELECT last_login_at FROM admin_users WHERE username = 'warden'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(last_login.is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_with_wrong_password_is_rejected_and_audited(pool: PgPool) {
    seed_admin(&pool, "warden", "a-long-enough-password").await;
    let app = common::build_test_app(pool.clone());

    let response = post_json(
        app,
        "/api/v1/auth/login",
        serde_json::json!({ "username": "warden", "password": "wrong-password-here" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let failed: i64 = sqlx::query_scalar(
        "SELECT COUNT(*)::BIGINT FROM audit_events WHERE action_code = 'ADMIN_LOGIN_FAILED'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(failed, 1);

    let count: i32 =
        sqlx::query_scalar("SELECT failed_login_count FROM admin_users WHERE username = 'warden'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(count, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn account_locks_after_repeated_failures(pool: PgPool) {
    seed_admin(&pool, "warden", "a-long-enough-password").await;
    let app = common::build_test_app(pool.clone());

    for _ in 0..5 {
        let response = post_json(
            app.clone(),
            "/api/v1/auth/login",
            serde_json::json!({ "username": "warden", "password": "wrong-password-here" }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    // Even the correct password is rejected while locked.
    let locked = post_json(
        app,
        "/api/v1/auth/login",
        serde_json::json!({ "username": "warden", "password": "a-long-enough-password" }),
    )
    .await;
    assert_eq!(locked.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_username_gets_the_same_error_as_wrong_password(pool: PgPool) {
    seed_admin(&pool, "warden", "a-long-enough-password").await;
    let app = common::build_test_app(pool.clone());

    let unknown = post_json(
        app.clone(),
        "/api/v1/auth/login",
        serde_json::json!({ "username": "nobody", "password": "a-long-enough-password" }),
    )
    .await;
    let unknown_status = unknown.status();
    let unknown_body = body_json(unknown).await;

    let wrong = post_json(
        app,
        "/api/v1/auth/login",
        serde_json::json!({ "username": "warden", "password": "wrong-password-here" }),
    )
    .await;
    assert_eq!(unknown_status, wrong.status());
    assert_eq!(unknown_body, body_json(wrong).await);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_routes_reject_missing_and_invalid_tokens(pool: PgPool) {
    let app = common::build_test_app(pool);

    let missing = get(app.clone(), "/api/v1/admin/lockers").await;
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let invalid = get_auth(app.clone(), "/api/v1/admin/lockers", "not-a-real-token").await;
    assert_eq!(invalid.status(), StatusCode::UNAUTHORIZED);

    let audit = get(app, "/api/v1/admin/audit-events").await;
    assert_eq!(audit.status(), StatusCode::UNAUTHORIZED);
}
