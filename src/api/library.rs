//! Library API handlers for movies and series.
//!
//! Both resources share one set of generic handlers; each scope carries its
//! own [`LibraryService`] as app data and the per-kind functions only pick
//! the response shape and the creation message.

use actix_web::{HttpResponse, web};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::ApiUser;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::library::{
    CreateMovieRequest, CreateSerieRequest, ListParams, MovieCreatedResponse, MovieResponse,
    PageResponse, SerieCreatedResponse, SerieResponse,
};
use crate::models::{LibraryItem, LibraryItemPatch, ListQuery, NewLibraryItem};
use crate::services::LibraryService;

fn parse_id(raw: &str) -> AppResult<Uuid> {
    Ok(Uuid::parse_str(raw)?)
}

async fn list_items<T>(
    service: &LibraryService,
    user: &ApiUser,
    params: ListParams,
) -> AppResult<HttpResponse>
where
    T: From<LibraryItem> + Serialize,
{
    let query = ListQuery::from(params);
    let page = service.list(user.0.id, &query).await?;
    Ok(HttpResponse::Ok().json(PageResponse::<T>::from(page)))
}

async fn create_item(
    service: &LibraryService,
    user: &ApiUser,
    input: NewLibraryItem,
) -> AppResult<LibraryItem> {
    service.create(user.0.id, input).await
}

async fn get_item<T>(service: &LibraryService, user: &ApiUser, id: &str) -> AppResult<HttpResponse>
where
    T: From<LibraryItem> + Serialize,
{
    let item = service.get(parse_id(id)?, user.0.id).await?;
    Ok(HttpResponse::Ok().json(T::from(item)))
}

async fn update_item<T>(
    service: &LibraryService,
    user: &ApiUser,
    id: &str,
    patch: &LibraryItemPatch,
) -> AppResult<HttpResponse>
where
    T: From<LibraryItem> + Serialize,
{
    let item = service.update(user.0.id, parse_id(id)?, patch).await?;
    Ok(HttpResponse::Ok().json(T::from(item)))
}

async fn delete_item(service: &LibraryService, user: &ApiUser, id: &str) -> AppResult<HttpResponse> {
    service.delete(parse_id(id)?, user.0.id).await?;
    Ok(HttpResponse::NoContent().finish())
}

// Movies

/// List the signed-in user's movies.
///
/// `watched=true` lists the watched movies, anything else the watchlist.
/// Sorted by catalog rating, highest first.
#[utoipa::path(
    get,
    path = "/api/v1/movies",
    tag = "Movies",
    params(ListParams),
    responses(
        (status = 200, description = "One page of movies", body = PageResponse<MovieResponse>),
        (status = 401, description = "Not signed in", body = crate::error::ErrorResponse),
    )
)]
pub async fn list_movies(
    user: ApiUser,
    service: web::Data<LibraryService>,
    params: web::Query<ListParams>,
) -> AppResult<HttpResponse> {
    list_items::<MovieResponse>(&service, &user, params.into_inner()).await
}

/// Add a movie to the signed-in user's library.
#[utoipa::path(
    post,
    path = "/api/v1/movies",
    tag = "Movies",
    request_body = CreateMovieRequest,
    responses(
        (status = 201, description = "Movie added", body = MovieCreatedResponse),
        (status = 400, description = "Invalid movie", body = crate::error::ErrorResponse),
        (status = 401, description = "Not signed in", body = crate::error::ErrorResponse),
        (status = 409, description = "Movie already in the library", body = crate::error::ErrorResponse),
    )
)]
pub async fn create_movie(
    user: ApiUser,
    service: web::Data<LibraryService>,
    body: web::Json<CreateMovieRequest>,
) -> AppResult<HttpResponse> {
    let item = create_item(&service, &user, body.into_inner().into()).await?;
    Ok(HttpResponse::Created().json(MovieCreatedResponse {
        movie: item.into(),
        message: "Movie added to your library!".to_string(),
    }))
}

/// Get one of the signed-in user's movies.
#[utoipa::path(
    get,
    path = "/api/v1/movies/{id}",
    tag = "Movies",
    params(("id" = Uuid, Path, description = "Library item ID")),
    responses(
        (status = 200, description = "Movie", body = MovieResponse),
        (status = 400, description = "Malformed ID", body = crate::error::ErrorResponse),
        (status = 404, description = "Movie not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_movie(
    user: ApiUser,
    service: web::Data<LibraryService>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    get_item::<MovieResponse>(&service, &user, &path).await
}

/// Change a movie's score or watched flag.
#[utoipa::path(
    patch,
    path = "/api/v1/movies/{id}",
    tag = "Movies",
    params(("id" = Uuid, Path, description = "Library item ID")),
    request_body = LibraryItemPatch,
    responses(
        (status = 200, description = "Updated movie", body = MovieResponse),
        (status = 400, description = "Invalid update", body = crate::error::ErrorResponse),
        (status = 404, description = "Movie not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn update_movie(
    user: ApiUser,
    service: web::Data<LibraryService>,
    path: web::Path<String>,
    body: web::Json<LibraryItemPatch>,
) -> AppResult<HttpResponse> {
    update_item::<MovieResponse>(&service, &user, &path, &body).await
}

/// Remove a movie from the library.
#[utoipa::path(
    delete,
    path = "/api/v1/movies/{id}",
    tag = "Movies",
    params(("id" = Uuid, Path, description = "Library item ID")),
    responses(
        (status = 204, description = "Movie removed"),
        (status = 404, description = "Movie not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn delete_movie(
    user: ApiUser,
    service: web::Data<LibraryService>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    delete_item(&service, &user, &path).await
}

// Series

/// List the signed-in user's series.
#[utoipa::path(
    get,
    path = "/api/v1/series",
    tag = "Series",
    params(ListParams),
    responses(
        (status = 200, description = "One page of series", body = PageResponse<SerieResponse>),
        (status = 401, description = "Not signed in", body = crate::error::ErrorResponse),
    )
)]
pub async fn list_series(
    user: ApiUser,
    service: web::Data<LibraryService>,
    params: web::Query<ListParams>,
) -> AppResult<HttpResponse> {
    list_items::<SerieResponse>(&service, &user, params.into_inner()).await
}

/// Add a series to the signed-in user's library.
#[utoipa::path(
    post,
    path = "/api/v1/series",
    tag = "Series",
    request_body = CreateSerieRequest,
    responses(
        (status = 201, description = "Series added", body = SerieCreatedResponse),
        (status = 400, description = "Invalid series", body = crate::error::ErrorResponse),
        (status = 401, description = "Not signed in", body = crate::error::ErrorResponse),
        (status = 409, description = "Series already in the library", body = crate::error::ErrorResponse),
    )
)]
pub async fn create_serie(
    user: ApiUser,
    service: web::Data<LibraryService>,
    body: web::Json<CreateSerieRequest>,
) -> AppResult<HttpResponse> {
    let item = create_item(&service, &user, body.into_inner().into()).await?;
    Ok(HttpResponse::Created().json(SerieCreatedResponse {
        serie: item.into(),
        message: "Serie added to your library!".to_string(),
    }))
}

/// Get one of the signed-in user's series.
#[utoipa::path(
    get,
    path = "/api/v1/series/{id}",
    tag = "Series",
    params(("id" = Uuid, Path, description = "Library item ID")),
    responses(
        (status = 200, description = "Series", body = SerieResponse),
        (status = 400, description = "Malformed ID", body = crate::error::ErrorResponse),
        (status = 404, description = "Series not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_serie(
    user: ApiUser,
    service: web::Data<LibraryService>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    get_item::<SerieResponse>(&service, &user, &path).await
}

/// Change a series' score or watched flag.
#[utoipa::path(
    patch,
    path = "/api/v1/series/{id}",
    tag = "Series",
    params(("id" = Uuid, Path, description = "Library item ID")),
    request_body = LibraryItemPatch,
    responses(
        (status = 200, description = "Updated series", body = SerieResponse),
        (status = 400, description = "Invalid update", body = crate::error::ErrorResponse),
        (status = 404, description = "Series not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn update_serie(
    user: ApiUser,
    service: web::Data<LibraryService>,
    path: web::Path<String>,
    body: web::Json<LibraryItemPatch>,
) -> AppResult<HttpResponse> {
    update_item::<SerieResponse>(&service, &user, &path, &body).await
}

/// Remove a series from the library.
#[utoipa::path(
    delete,
    path = "/api/v1/series/{id}",
    tag = "Series",
    params(("id" = Uuid, Path, description = "Library item ID")),
    responses(
        (status = 204, description = "Series removed"),
        (status = 404, description = "Series not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn delete_serie(
    user: ApiUser,
    service: web::Data<LibraryService>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    delete_item(&service, &user, &path).await
}

/// Configure library routes. Each scope gets the service for its media kind.
pub fn configure_routes(cfg: &mut web::ServiceConfig, pool: &DbPool) {
    cfg.service(
        web::scope("/movies")
            .app_data(web::Data::new(LibraryService::movies(pool.clone())))
            .service(
                web::resource("")
                    .route(web::get().to(list_movies))
                    .route(web::post().to(create_movie)),
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(get_movie))
                    .route(web::patch().to(update_movie))
                    .route(web::delete().to(delete_movie)),
            ),
    )
    .service(
        web::scope("/series")
            .app_data(web::Data::new(LibraryService::series(pool.clone())))
            .service(
                web::resource("")
                    .route(web::get().to(list_series))
                    .route(web::post().to(create_serie)),
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(get_serie))
                    .route(web::patch().to(update_serie))
                    .route(web::delete().to(delete_serie)),
            ),
    );
}
