//! Catalog pass-through endpoints under `/tmdb`.

use actix_web::{HttpResponse, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::auth::ApiUser;
use crate::error::{AppError, AppResult};
use crate::services::{DiscoverScope, SearchScope, TmdbClient};

/// Query string of the search endpoints.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    pub query: Option<String>,
    pub page: Option<u32>,
}

/// Query string of the discover endpoints.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DiscoverParams {
    pub page: Option<u32>,
}

/// Movie details from the catalog.
#[utoipa::path(
    get,
    path = "/api/v1/tmdb/movie/{id}",
    tag = "Catalog",
    params(("id" = u64, Path, description = "Catalog movie ID")),
    responses(
        (status = 200, description = "Catalog movie as returned by TMDB"),
        (status = 404, description = "Unknown movie", body = crate::error::ErrorResponse),
        (status = 502, description = "Catalog unavailable", body = crate::error::ErrorResponse),
    )
)]
pub async fn movie_details(
    _user: ApiUser,
    tmdb: web::Data<TmdbClient>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    let body = tmdb.movie(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(body))
}

/// TV show details from the catalog.
#[utoipa::path(
    get,
    path = "/api/v1/tmdb/tv/{id}",
    tag = "Catalog",
    params(("id" = u64, Path, description = "Catalog TV show ID")),
    responses(
        (status = 200, description = "Catalog TV show as returned by TMDB"),
        (status = 404, description = "Unknown TV show", body = crate::error::ErrorResponse),
        (status = 502, description = "Catalog unavailable", body = crate::error::ErrorResponse),
    )
)]
pub async fn tv_details(
    _user: ApiUser,
    tmdb: web::Data<TmdbClient>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    let body = tmdb.tv(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(body))
}

/// Search the catalog. `scope` is `multi`, `movie` or `tv`.
#[utoipa::path(
    get,
    path = "/api/v1/tmdb/search/{scope}",
    tag = "Catalog",
    params(("scope" = String, Path, description = "multi, movie or tv"), SearchParams),
    responses(
        (status = 200, description = "Search results as returned by TMDB"),
        (status = 400, description = "Missing query or unknown scope", body = crate::error::ErrorResponse),
        (status = 502, description = "Catalog unavailable", body = crate::error::ErrorResponse),
    )
)]
pub async fn search(
    _user: ApiUser,
    tmdb: web::Data<TmdbClient>,
    path: web::Path<String>,
    params: web::Query<SearchParams>,
) -> AppResult<HttpResponse> {
    let scope = SearchScope::parse(&path)
        .ok_or_else(|| AppError::InvalidInput(format!("unknown search scope '{}'", path)))?;
    let params = params.into_inner();
    let query = params
        .query
        .ok_or_else(|| AppError::InvalidInput("query is required".to_string()))?;

    let body = tmdb.search(scope, &query, params.page.unwrap_or(1)).await?;
    Ok(HttpResponse::Ok().json(body))
}

/// Popular titles. `scope` is `movie` or `tv`.
#[utoipa::path(
    get,
    path = "/api/v1/tmdb/discover/{scope}",
    tag = "Catalog",
    params(("scope" = String, Path, description = "movie or tv"), DiscoverParams),
    responses(
        (status = 200, description = "Discover results as returned by TMDB"),
        (status = 400, description = "Unknown scope", body = crate::error::ErrorResponse),
        (status = 502, description = "Catalog unavailable", body = crate::error::ErrorResponse),
    )
)]
pub async fn discover(
    _user: ApiUser,
    tmdb: web::Data<TmdbClient>,
    path: web::Path<String>,
    params: web::Query<DiscoverParams>,
) -> AppResult<HttpResponse> {
    let scope = DiscoverScope::parse(&path)
        .ok_or_else(|| AppError::InvalidInput(format!("unknown discover scope '{}'", path)))?;

    let body = tmdb.discover(scope, params.page.unwrap_or(1)).await?;
    Ok(HttpResponse::Ok().json(body))
}

/// Configure catalog routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/tmdb")
            .route("/movie/{id}", web::get().to(movie_details))
            .route("/tv/{id}", web::get().to(tv_details))
            .route("/search/{scope}", web::get().to(search))
            .route("/discover/{scope}", web::get().to(discover)),
    );
}
