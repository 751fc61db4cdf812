//! OpenAPI documentation configuration.

use actix_web::{HttpResponse, get};
use utoipa::OpenApi;

use crate::{api, error, models};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Reelscore Server",
        version = "0.4.0",
        description = "API server for keeping a personal library of watched and planned movies and series"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        // Movie endpoints
        api::library::list_movies,
        api::library::create_movie,
        api::library::get_movie,
        api::library::update_movie,
        api::library::delete_movie,
        // Series endpoints
        api::library::list_series,
        api::library::create_serie,
        api::library::get_serie,
        api::library::update_serie,
        api::library::delete_serie,
        // Catalog endpoints
        api::catalog::movie_details,
        api::catalog::tv_details,
        api::catalog::search,
        api::catalog::discover,
        // Account endpoints
        api::account::get_me,
        api::account::update_me,
        api::account::delete_me,
        api::account::current_session,
        api::account::logout,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            // Health
            api::health::HealthResponse,
            api::health::ReadyResponse,
            // Library
            models::library::MovieResponse,
            models::library::SerieResponse,
            models::library::CreateMovieRequest,
            models::library::CreateSerieRequest,
            models::library::MovieCreatedResponse,
            models::library::SerieCreatedResponse,
            models::LibraryItemPatch,
            // Account
            models::Provider,
            models::User,
            models::UpdateProfileRequest,
            api::account::SessionResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Movies", description = "The signed-in user's movie library"),
        (name = "Series", description = "The signed-in user's series library"),
        (name = "Catalog", description = "TMDB pass-through"),
        (name = "Account", description = "Profile and session management")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add the session cookie security scheme.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                utoipa::openapi::security::SecurityScheme::ApiKey(
                    utoipa::openapi::security::ApiKey::Cookie(
                        utoipa::openapi::security::ApiKeyValue::new("session"),
                    ),
                ),
            );
        }
    }
}

/// Serve the OpenAPI document.
#[get("/openapi.json")]
pub async fn openapi_json() -> HttpResponse {
    HttpResponse::Ok().json(ApiDoc::openapi())
}
