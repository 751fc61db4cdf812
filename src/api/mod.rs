//! API endpoint modules.

pub mod account;
pub mod catalog;
pub mod health;
pub mod library;
pub mod openapi;

use actix_web::web;

use crate::db::DbPool;
use crate::error::AppError;
use crate::middleware::RateLimit;

pub use account::{
    configure_api_routes as configure_account_routes,
    configure_session_routes,
};
pub use catalog::configure_routes as configure_catalog_routes;
pub use health::configure_health_routes;
pub use library::configure_routes as configure_library_routes;
pub use openapi::ApiDoc;

/// JSON body settings: malformed bodies answer with the usual error shape.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err, _req| AppError::InvalidInput(err.to_string()).into())
}

/// Everything mounted under `/api/v1`.
///
/// Health checks and the OpenAPI document are not rate limited; every other
/// route is.
pub fn configure_v1(cfg: &mut web::ServiceConfig, pool: &DbPool) {
    cfg.configure(configure_health_routes)
        .service(openapi::openapi_json)
        .service(
            web::scope("")
                .wrap(RateLimit)
                .configure(|cfg| configure_library_routes(cfg, pool))
                .configure(configure_catalog_routes)
                .configure(configure_account_routes),
        );
}
