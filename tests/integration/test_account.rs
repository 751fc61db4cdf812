//! Profile endpoints and readiness.

use actix_web::http::Method;
use serde_json::json;

use reelscore_lib::models::Provider;

use super::test_helpers::*;

#[actix_rt::test]
async fn test_get_me_returns_profile() {
    let (context, _) = create_context(&test_config()).await;
    let app = create_test_app(&context).await;
    let user = create_user(&context.pool, "Neo").await;
    let cookie = login(&context, &user).await;

    let reply = send(&app, request(Method::GET, "/api/v1/me", Some(&cookie), None)).await;

    assert_eq!(reply.status, 200);
    assert_eq!(reply.body["email"], "neo@example.com");
    assert_eq!(reply.body["providerId"], user.provider_id);
}

#[actix_rt::test]
async fn test_patch_me_updates_only_given_fields() {
    let (context, _) = create_context(&test_config()).await;
    let app = create_test_app(&context).await;
    let user = create_user(&context.pool, "Neo").await;
    let cookie = login(&context, &user).await;

    let reply = send(
        &app,
        request(
            Method::PATCH,
            "/api/v1/me",
            Some(&cookie),
            Some(json!({ "name": "Thomas Anderson" })),
        ),
    )
    .await;

    assert_eq!(reply.status, 200);
    assert_eq!(reply.body["name"], "Thomas Anderson");
    assert_eq!(reply.body["email"], "neo@example.com");

    let reply = send(
        &app,
        request(
            Method::PATCH,
            "/api/v1/me",
            Some(&cookie),
            Some(json!({ "email": "" })),
        ),
    )
    .await;
    assert_eq!(reply.status, 400);
}

#[actix_rt::test]
async fn test_delete_me_removes_user_library_and_session() {
    let (context, _) = create_context(&test_config()).await;
    let app = create_test_app(&context).await;
    let user = create_user(&context.pool, "Neo").await;
    let cookie = login(&context, &user).await;

    let created = send(
        &app,
        request(
            Method::POST,
            "/api/v1/movies",
            Some(&cookie),
            Some(movie_json(603, "The Matrix", 8.7, false)),
        ),
    )
    .await;
    assert_eq!(created.status, 201);

    let reply = send(&app, request(Method::DELETE, "/api/v1/me", Some(&cookie), None)).await;
    assert_eq!(reply.status, 204);
    assert_eq!(reply.cookie("session").unwrap().value(), "");

    assert!(context.pool.get_user(user.id).await.unwrap().is_none());
    assert!(!context.sessions.store().exists(cookie.value()).await.unwrap());
}

#[actix_rt::test]
async fn test_find_or_create_is_idempotent() {
    let pool = create_test_pool().await;

    let first = pool
        .find_or_create_user("42", Provider::Google, "neo@example.com", "Neo")
        .await
        .unwrap();
    let second = pool
        .find_or_create_user("42", Provider::Google, "other@example.com", "Other")
        .await
        .unwrap();
    let github = pool
        .find_or_create_user("42", Provider::Github, "neo@example.com", "Neo")
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.email, "neo@example.com");
    assert_ne!(first.id, github.id);
    assert_eq!(pool.list_users().await.unwrap().len(), 2);
}

#[actix_rt::test]
async fn test_list_users_oldest_first() {
    let pool = create_test_pool().await;
    assert!(pool.list_users().await.unwrap().is_empty());

    let neo = create_user(&pool, "Neo").await;
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    let trinity = create_user(&pool, "Trinity").await;

    let ids: Vec<_> = pool.list_users().await.unwrap().iter().map(|u| u.id).collect();
    assert_eq!(ids, vec![neo.id, trinity.id]);
}

#[actix_rt::test]
async fn test_ready_reports_connected_backends() {
    let (context, _) = create_context(&test_config()).await;
    let app = create_test_app(&context).await;

    let reply = send(&app, request(Method::GET, "/api/v1/ready", None, None)).await;

    assert_eq!(reply.status, 200);
    assert_eq!(reply.body["database"], "connected");
    assert_eq!(reply.body["cache"], "connected");
}

#[actix_rt::test]
async fn test_openapi_document_is_served() {
    let (context, _) = create_context(&test_config()).await;
    let app = create_test_app(&context).await;

    let reply = send(&app, request(Method::GET, "/api/v1/openapi.json", None, None)).await;

    assert_eq!(reply.status, 200);
    assert!(reply.body["paths"]["/api/v1/movies"].is_object());
}
