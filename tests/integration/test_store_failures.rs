//! Behavior while the session and rate-limit store is unreachable.

use actix_web::cookie::Cookie;
use actix_web::http::Method;
use serde_json::Value;

use super::test_helpers::*;

fn stale_cookie() -> Cookie<'static> {
    Cookie::new("session", "c29tZS1zZXNzaW9uLXRva2Vu")
}

#[actix_rt::test]
async fn test_optional_policy_proceeds_anonymously() {
    let context = create_unreachable_context(&test_config()).await;
    let app = create_test_app(&context).await;

    let reply = send(
        &app,
        request(Method::GET, "/auth/session", Some(&stale_cookie()), None),
    )
    .await;

    assert_eq!(reply.status, 200);
    assert_eq!(reply.body["user"], Value::Null);
    assert!(reply.cookie("session").is_none());
}

#[actix_rt::test]
async fn test_api_policy_fails_with_server_error() {
    let context = create_unreachable_context(&test_config()).await;
    let app = create_test_app(&context).await;

    let reply = send(
        &app,
        request(Method::GET, "/api/v1/me", Some(&stale_cookie()), None),
    )
    .await;

    assert_eq!(reply.status, 500);
    assert_eq!(reply.body["error"], "CACHE_ERROR");
    assert!(reply.cookie("session").is_none());
}

#[actix_rt::test]
async fn test_page_policy_fails_with_server_error() {
    let context = create_unreachable_context(&test_config()).await;
    let app = create_test_app(&context).await;

    let reply = send(
        &app,
        request(Method::GET, "/account", Some(&stale_cookie()), None),
    )
    .await;

    assert_eq!(reply.status, 500);
    assert!(reply.headers.get("location").is_none());
}

#[actix_rt::test]
async fn test_health_does_not_depend_on_sessions() {
    let context = create_unreachable_context(&test_config()).await;
    let app = create_test_app(&context).await;

    let reply = send(
        &app,
        request(Method::GET, "/api/v1/health", Some(&stale_cookie()), None),
    )
    .await;
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body["status"], "healthy");

    let reply = send(
        &app,
        request(Method::GET, "/api/v1/ready", Some(&stale_cookie()), None),
    )
    .await;
    assert_eq!(reply.status, 503);
    assert_eq!(reply.body["database"], "connected");
    assert_ne!(reply.body["cache"], "connected");
}

#[actix_rt::test]
async fn test_limiter_failure_is_server_error() {
    let mut config = test_config();
    config.rate_limit.enforce = true;
    let context = create_unreachable_context(&config).await;
    let app = create_test_app(&context).await;

    for _ in 0..3 {
        let reply = send(&app, request(Method::GET, "/api/v1/movies", None, None)).await;
        assert_eq!(reply.status, 500);
        assert_eq!(reply.body["error"], "CACHE_ERROR");
    }
}
