//! Library endpoints over HTTP.

use actix_web::http::Method;
use serde_json::json;
use uuid::Uuid;

use super::test_helpers::*;

#[actix_rt::test]
async fn test_list_without_session_is_401() {
    let (context, _) = create_context(&test_config()).await;
    let app = create_test_app(&context).await;

    let reply = send(&app, request(Method::GET, "/api/v1/movies", None, None)).await;

    assert_eq!(reply.status, 401);
    assert_eq!(reply.body["error"], "UNAUTHORIZED");
    assert!(reply.cookie("session").is_none());
}

#[actix_rt::test]
async fn test_create_movie_returns_201_with_message() {
    let (context, _) = create_context(&test_config()).await;
    let app = create_test_app(&context).await;
    let user = create_user(&context.pool, "Neo").await;
    let cookie = login(&context, &user).await;

    let reply = send(
        &app,
        request(
            Method::POST,
            "/api/v1/movies",
            Some(&cookie),
            Some(movie_json(603, "The Matrix", 8.7, false)),
        ),
    )
    .await;

    assert_eq!(reply.status, 201, "{}", reply.body);
    assert_eq!(reply.body["message"], "Movie added to your library!");
    assert_eq!(reply.body["movie"]["tmdbId"], 603);
    assert_eq!(reply.body["movie"]["releaseDate"], "1999-03-31");
    assert_eq!(reply.body["movie"]["score"], 0.0);
    assert_eq!(reply.body["movie"]["userId"], user.id.to_string());
    assert!(Uuid::parse_str(reply.body["movie"]["id"].as_str().unwrap()).is_ok());

    let again = send(
        &app,
        request(
            Method::POST,
            "/api/v1/movies",
            Some(&cookie),
            Some(movie_json(603, "The Matrix", 8.7, false)),
        ),
    )
    .await;
    assert_eq!(again.status, 409);
    assert_eq!(again.body["message"], "Movie already in your library");
}

#[actix_rt::test]
async fn test_list_movies_matrix_scenario() {
    let (context, _) = create_context(&test_config()).await;
    let app = create_test_app(&context).await;
    let user = create_user(&context.pool, "Neo").await;
    let cookie = login(&context, &user).await;

    for body in [
        movie_json(603, "The Matrix", 8.7, false),
        movie_json(604, "Matrix Reloaded", 7.0, true),
    ] {
        let reply = send(
            &app,
            request(Method::POST, "/api/v1/movies", Some(&cookie), Some(body)),
        )
        .await;
        assert_eq!(reply.status, 201);
    }

    let reply = send(
        &app,
        request(
            Method::GET,
            "/api/v1/movies?watched=false&query=matrix&page=1&limit=27",
            Some(&cookie),
            None,
        ),
    )
    .await;

    assert_eq!(reply.status, 200);
    assert_eq!(reply.body["count"], 1);
    assert_eq!(reply.body["totalPages"], 1);
    assert_eq!(reply.body["page"], 1);
    assert_eq!(reply.body["results"][0]["title"], "The Matrix");
}

#[actix_rt::test]
async fn test_malformed_paging_falls_back_to_defaults() {
    let (context, _) = create_context(&test_config()).await;
    let app = create_test_app(&context).await;
    let user = create_user(&context.pool, "Neo").await;
    let cookie = login(&context, &user).await;

    let reply = send(
        &app,
        request(
            Method::GET,
            "/api/v1/series?page=abc&limit=-3",
            Some(&cookie),
            None,
        ),
    )
    .await;

    assert_eq!(reply.status, 200);
    assert_eq!(reply.body["page"], 1);
    assert_eq!(reply.body["count"], 0);
    assert_eq!(reply.body["totalPages"], 0);
    assert_eq!(reply.body["results"], json!([]));
}

#[actix_rt::test]
async fn test_huge_page_returns_empty_results() {
    let (context, _) = create_context(&test_config()).await;
    let app = create_test_app(&context).await;
    let user = create_user(&context.pool, "Neo").await;
    let cookie = login(&context, &user).await;

    let reply = send(
        &app,
        request(
            Method::GET,
            "/api/v1/movies?page=1000000000000000000",
            Some(&cookie),
            None,
        ),
    )
    .await;

    assert_eq!(reply.status, 200);
    assert_eq!(reply.body["results"], json!([]));
    assert_eq!(reply.body["count"], 0);
}

#[actix_rt::test]
async fn test_get_patch_delete_serie() {
    let (context, _) = create_context(&test_config()).await;
    let app = create_test_app(&context).await;
    let user = create_user(&context.pool, "Neo").await;
    let cookie = login(&context, &user).await;

    let created = send(
        &app,
        request(
            Method::POST,
            "/api/v1/series",
            Some(&cookie),
            Some(json!({
                "tmdbId": 1399,
                "title": "Game of Thrones",
                "firstAired": "2011-04-17",
                "tmdbScore": 8.4,
                "score": 6.0,
            })),
        ),
    )
    .await;
    assert_eq!(created.status, 201, "{}", created.body);
    assert_eq!(created.body["message"], "Serie added to your library!");
    let id = created.body["serie"]["id"].as_str().unwrap().to_string();
    let uri = format!("/api/v1/series/{}", id);

    let fetched = send(&app, request(Method::GET, &uri, Some(&cookie), None)).await;
    assert_eq!(fetched.status, 200);
    assert_eq!(fetched.body["firstAired"], "2011-04-17");
    assert_eq!(fetched.body["watched"], false);

    let patched = send(
        &app,
        request(Method::PATCH, &uri, Some(&cookie), Some(json!({ "watched": true }))),
    )
    .await;
    assert_eq!(patched.status, 200);
    assert_eq!(patched.body["watched"], true);
    assert_eq!(patched.body["score"], 6.0);

    let deleted = send(&app, request(Method::DELETE, &uri, Some(&cookie), None)).await;
    assert_eq!(deleted.status, 204);

    let again = send(&app, request(Method::DELETE, &uri, Some(&cookie), None)).await;
    assert_eq!(again.status, 404);
    assert_eq!(again.body["message"], "Serie not found");
}

#[actix_rt::test]
async fn test_other_users_item_is_not_found() {
    let (context, _) = create_context(&test_config()).await;
    let app = create_test_app(&context).await;
    let neo = create_user(&context.pool, "Neo").await;
    let smith = create_user(&context.pool, "Smith").await;
    let neo_cookie = login(&context, &neo).await;
    let smith_cookie = login(&context, &smith).await;

    let created = send(
        &app,
        request(
            Method::POST,
            "/api/v1/movies",
            Some(&neo_cookie),
            Some(movie_json(603, "The Matrix", 8.7, false)),
        ),
    )
    .await;
    let uri = format!(
        "/api/v1/movies/{}",
        created.body["movie"]["id"].as_str().unwrap()
    );

    let reply = send(&app, request(Method::GET, &uri, Some(&smith_cookie), None)).await;
    assert_eq!(reply.status, 404);

    let reply = send(&app, request(Method::DELETE, &uri, Some(&smith_cookie), None)).await;
    assert_eq!(reply.status, 404);

    let reply = send(&app, request(Method::GET, &uri, Some(&neo_cookie), None)).await;
    assert_eq!(reply.status, 200);
}

#[actix_rt::test]
async fn test_malformed_id_is_400() {
    let (context, _) = create_context(&test_config()).await;
    let app = create_test_app(&context).await;
    let user = create_user(&context.pool, "Neo").await;
    let cookie = login(&context, &user).await;

    let reply = send(
        &app,
        request(Method::GET, "/api/v1/movies/not-a-uuid", Some(&cookie), None),
    )
    .await;

    assert_eq!(reply.status, 400);
    assert_eq!(reply.body["error"], "INVALID_INPUT");
}

#[actix_rt::test]
async fn test_invalid_bodies_are_400() {
    let (context, _) = create_context(&test_config()).await;
    let app = create_test_app(&context).await;
    let user = create_user(&context.pool, "Neo").await;
    let cookie = login(&context, &user).await;

    let reply = send(
        &app,
        request(
            Method::POST,
            "/api/v1/movies",
            Some(&cookie),
            Some(json!({ "title": "No id" })),
        ),
    )
    .await;
    assert_eq!(reply.status, 400);
    assert_eq!(reply.body["error"], "INVALID_INPUT");

    let reply = send(
        &app,
        request(
            Method::POST,
            "/api/v1/movies",
            Some(&cookie),
            Some(movie_json(603, "  ", 8.7, false)),
        ),
    )
    .await;
    assert_eq!(reply.status, 400);
}
