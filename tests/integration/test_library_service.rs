//! Library service behavior against a real database.

use reelscore_lib::error::AppError;
use reelscore_lib::models::{LibraryItemPatch, ListQuery, NewLibraryItem};
use reelscore_lib::services::LibraryService;
use uuid::Uuid;

use super::test_helpers::*;

fn new_item(tmdb_id: i32, title: &str, tmdb_score: f64, watched: bool) -> NewLibraryItem {
    NewLibraryItem {
        tmdb_id,
        title: title.to_string(),
        poster_path: None,
        date: Some("1999-03-31".to_string()),
        watched,
        tmdb_score,
        score: None,
    }
}

fn list_query(watched: bool, query: Option<&str>, page: i64, limit: i64) -> ListQuery {
    ListQuery {
        watched,
        query: query.map(str::to_string),
        page,
        limit,
    }
}

/// Creating tmdbId=603 succeeds once; the identical second call conflicts.
#[actix_rt::test]
async fn test_create_then_duplicate_is_conflict() {
    let pool = create_test_pool().await;
    let user = create_user(&pool, "Neo").await;
    let movies = LibraryService::movies(pool);

    let created = movies
        .create(user.id, new_item(603, "The Matrix", 8.7, false))
        .await
        .unwrap();
    assert_ne!(created.id, Uuid::nil());
    assert_eq!(created.score, 0.0);
    assert_eq!(created.date.unwrap().to_string(), "1999-03-31");

    let err = movies
        .create(user.id, new_item(603, "The Matrix", 8.7, false))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(ref label) if label == "Movie"));
}

/// The same catalog id may be in two users' libraries.
#[actix_rt::test]
async fn test_duplicate_is_per_user() {
    let pool = create_test_pool().await;
    let neo = create_user(&pool, "Neo").await;
    let trinity = create_user(&pool, "Trinity").await;
    let movies = LibraryService::movies(pool);

    movies.create(neo.id, new_item(603, "The Matrix", 8.7, false)).await.unwrap();
    movies
        .create(trinity.id, new_item(603, "The Matrix", 8.7, false))
        .await
        .unwrap();
}

/// Searching the watchlist for "matrix" skips the watched sequel.
#[actix_rt::test]
async fn test_list_matrix_watchlist() {
    let pool = create_test_pool().await;
    let user = create_user(&pool, "Neo").await;
    let movies = LibraryService::movies(pool);

    movies.create(user.id, new_item(603, "The Matrix", 8.7, false)).await.unwrap();
    movies
        .create(user.id, new_item(604, "Matrix Reloaded", 7.0, true))
        .await
        .unwrap();

    let page = movies
        .list(user.id, &list_query(false, Some("matrix"), 1, 27))
        .await
        .unwrap();

    assert_eq!(page.count, 1);
    assert_eq!(page.total_pages, 1);
    assert_eq!(page.page, 1);
    assert_eq!(page.results.len(), 1);
    assert_eq!(page.results[0].title, "The Matrix");
}

#[actix_rt::test]
async fn test_list_never_shows_other_users_items() {
    let pool = create_test_pool().await;
    let neo = create_user(&pool, "Neo").await;
    let smith = create_user(&pool, "Smith").await;
    let movies = LibraryService::movies(pool);

    movies.create(smith.id, new_item(603, "The Matrix", 8.7, false)).await.unwrap();

    let page = movies.list(neo.id, &list_query(false, None, 1, 27)).await.unwrap();
    assert_eq!(page.count, 0);
    assert_eq!(page.total_pages, 0);
    assert!(page.results.is_empty());
}

#[actix_rt::test]
async fn test_list_orders_by_catalog_score_and_paginates() {
    let pool = create_test_pool().await;
    let user = create_user(&pool, "Neo").await;
    let movies = LibraryService::movies(pool);

    for (i, score) in [6.0, 9.0, 7.5, 8.0, 5.5].iter().enumerate() {
        movies
            .create(user.id, new_item(100 + i as i32, &format!("Film {}", i), *score, false))
            .await
            .unwrap();
    }

    let first = movies.list(user.id, &list_query(false, None, 1, 2)).await.unwrap();
    assert_eq!(first.count, 5);
    assert_eq!(first.total_pages, 3);
    let scores: Vec<f64> = first.results.iter().map(|m| m.tmdb_score).collect();
    assert_eq!(scores, vec![9.0, 8.0]);

    let last = movies.list(user.id, &list_query(false, None, 3, 2)).await.unwrap();
    assert_eq!(last.page, 3);
    assert_eq!(last.results.len(), 1);
    assert_eq!(last.results[0].tmdb_score, 5.5);
}

#[actix_rt::test]
async fn test_list_clamps_page_and_limit() {
    let pool = create_test_pool().await;
    let user = create_user(&pool, "Neo").await;
    let movies = LibraryService::movies(pool);

    for i in 0..30 {
        movies
            .create(user.id, new_item(1000 + i, &format!("Film {}", i), 5.0, false))
            .await
            .unwrap();
    }

    let page = movies.list(user.id, &list_query(false, None, 0, 0)).await.unwrap();
    assert_eq!(page.page, 1);
    assert_eq!(page.results.len(), 27);
    assert_eq!(page.total_pages, 2);

    let page = movies.list(user.id, &list_query(false, None, -4, 101)).await.unwrap();
    assert_eq!(page.page, 1);
    assert_eq!(page.results.len(), 27);

    let page = movies.list(user.id, &list_query(false, None, 1, 100)).await.unwrap();
    assert_eq!(page.results.len(), 30);
}

#[actix_rt::test]
async fn test_search_treats_wildcards_literally() {
    let pool = create_test_pool().await;
    let user = create_user(&pool, "Neo").await;
    let movies = LibraryService::movies(pool);

    movies.create(user.id, new_item(1, "100% Wolf", 6.0, false)).await.unwrap();
    movies.create(user.id, new_item(2, "1000 Wolves", 6.0, false)).await.unwrap();

    let page = movies
        .list(user.id, &list_query(false, Some("0%"), 1, 27))
        .await
        .unwrap();
    assert_eq!(page.count, 1);
    assert_eq!(page.results[0].title, "100% Wolf");
}

#[actix_rt::test]
async fn test_get_round_trip_and_owner_check() {
    let pool = create_test_pool().await;
    let neo = create_user(&pool, "Neo").await;
    let smith = create_user(&pool, "Smith").await;
    let movies = LibraryService::movies(pool);

    let created = movies.create(neo.id, new_item(603, "The Matrix", 8.7, false)).await.unwrap();

    let fetched = movies.get(created.id, neo.id).await.unwrap();
    assert_eq!(fetched, created);

    let err = movies.get(created.id, smith.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[actix_rt::test]
async fn test_partial_update_keeps_other_fields() {
    let pool = create_test_pool().await;
    let user = create_user(&pool, "Neo").await;
    let movies = LibraryService::movies(pool);

    let mut input = new_item(603, "The Matrix", 8.7, false);
    input.score = Some(7.0);
    let created = movies.create(user.id, input).await.unwrap();

    let patch = LibraryItemPatch {
        score: None,
        watched: Some(true),
    };
    let updated = movies.update(user.id, created.id, &patch).await.unwrap();

    assert!(updated.watched);
    assert_eq!(updated.score, 7.0);
    assert_eq!(updated.tmdb_score, 8.7);
    assert!(updated.updated_at >= created.updated_at);
}

#[actix_rt::test]
async fn test_update_of_missing_item_is_not_found() {
    let pool = create_test_pool().await;
    let user = create_user(&pool, "Neo").await;
    let series = LibraryService::series(pool);

    let patch = LibraryItemPatch {
        score: Some(5.0),
        watched: None,
    };
    let err = series.update(user.id, Uuid::new_v4(), &patch).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(ref label) if label == "Serie"));
}

#[actix_rt::test]
async fn test_delete_twice_is_not_found() {
    let pool = create_test_pool().await;
    let user = create_user(&pool, "Neo").await;
    let series = LibraryService::series(pool);

    let created = series
        .create(user.id, new_item(1399, "Game of Thrones", 8.4, true))
        .await
        .unwrap();

    series.delete(created.id, user.id).await.unwrap();
    let err = series.delete(created.id, user.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[actix_rt::test]
async fn test_invalid_date_is_stored_as_none() {
    let pool = create_test_pool().await;
    let user = create_user(&pool, "Neo").await;
    let series = LibraryService::series(pool);

    let mut input = new_item(1399, "Game of Thrones", 8.4, false);
    input.date = Some("April 2011".to_string());
    let created = series.create(user.id, input).await.unwrap();

    assert!(created.date.is_none());
}

#[actix_rt::test]
async fn test_create_rejects_out_of_range_score() {
    let pool = create_test_pool().await;
    let user = create_user(&pool, "Neo").await;
    let movies = LibraryService::movies(pool);

    let err = movies
        .create(user.id, new_item(603, "The Matrix", 11.0, false))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));
}

#[actix_rt::test]
async fn test_deleting_user_removes_library() {
    let pool = create_test_pool().await;
    let user = create_user(&pool, "Neo").await;
    let movies = LibraryService::movies(pool.clone());

    let created = movies.create(user.id, new_item(603, "The Matrix", 8.7, false)).await.unwrap();

    pool.delete_user(user.id).await.unwrap();

    assert!(pool.get_user(user.id).await.unwrap().is_none());
    assert!(matches!(
        movies.get(created.id, user.id).await,
        Err(AppError::NotFound(_))
    ));
}

/// Pages far past the end come back empty instead of failing.
#[actix_rt::test]
async fn test_huge_page_is_empty() {
    let pool = create_test_pool().await;
    let user = create_user(&pool, "Neo").await;
    let movies = LibraryService::movies(pool);

    movies.create(user.id, new_item(603, "The Matrix", 8.7, false)).await.unwrap();

    let page = movies
        .list(user.id, &list_query(false, None, 1_000_000_000_000_000_000, 27))
        .await
        .unwrap();
    assert!(page.results.is_empty());
    assert_eq!(page.count, 1);
    assert_eq!(page.page, 1_000_000_000_000_000_000);

    let page = movies
        .list(user.id, &list_query(false, None, i64::MAX, 100))
        .await
        .unwrap();
    assert!(page.results.is_empty());
}
