//! Shared application services and route wiring.

use actix_web::web;
use std::sync::Arc;

use crate::api;
use crate::auth::{SessionManager, SessionStore};
use crate::cache::KeyValueStore;
use crate::config::Config;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::middleware::RateLimiter;
use crate::services::TmdbClient;

/// Everything the handlers and middleware receive as app data.
///
/// Build it once at startup; every worker registers clones through
/// [`AppContext::configure`]. The [`crate::auth::SessionResolver`] and
/// [`crate::middleware::RequestLogger`] middleware still have to be wrapped
/// around the `App`.
#[derive(Clone)]
pub struct AppContext {
    pub pool: DbPool,
    pub store: Arc<dyn KeyValueStore>,
    pub sessions: SessionManager,
    pub limiter: RateLimiter,
    pub tmdb: TmdbClient,
}

impl AppContext {
    pub fn new(config: &Config, pool: DbPool, store: Arc<dyn KeyValueStore>) -> AppResult<Self> {
        let sessions = SessionManager::new(
            SessionStore::new(Arc::clone(&store), config.session.ttl),
            &config.session,
        );
        let limiter = RateLimiter::new(Arc::clone(&store), &config.rate_limit);
        let tmdb = TmdbClient::new(&config.tmdb)?;

        Ok(Self {
            pool,
            store,
            sessions,
            limiter,
            tmdb,
        })
    }

    /// Register app data and all routes.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.pool.clone()))
            .app_data(web::Data::from(Arc::clone(&self.store)))
            .app_data(web::Data::new(self.sessions.clone()))
            .app_data(web::Data::new(self.limiter.clone()))
            .app_data(web::Data::new(self.tmdb.clone()))
            .app_data(api::json_config())
            .service(web::scope("/api/v1").configure(|cfg| api::configure_v1(cfg, &self.pool)))
            .configure(api::configure_session_routes);
    }
}
