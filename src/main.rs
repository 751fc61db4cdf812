//! Reelscore Server - Main entry point.
//!
//! Starts the Actix-web server with configured routes and middleware.

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, http::header};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use reelscore_lib::auth::SessionResolver;
use reelscore_lib::cache::{KeyValueStore, RedisStore};
use reelscore_lib::config::Config;
use reelscore_lib::db::DbPool;
use reelscore_lib::middleware::RequestLogger;
use reelscore_lib::AppContext;

/// Log a startup failure and exit.
fn fail(message: &str, err: impl std::fmt::Display) -> ! {
    error!("{}: {}", message, err);
    std::process::exit(1);
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let migrate_only = args.iter().any(|arg| arg == "--migrate");

    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        std::process::exit(1);
    }

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("");
            error!("Please check your environment variables:");
            error!("  - RUST_ENV must be set to 'development' or 'production'");
            error!("  - In production, DATABASE_URL and TMDB_API_KEY must be set");
            error!("  - In production, values must not match development defaults");
            std::process::exit(1);
        }
    };

    info!("========================================");
    info!("  Reelscore Server");
    info!("  Environment: {}", config.environment);
    info!("========================================");

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode - do not use in production!");
        info!("Rate limiting is disabled and session cookies are not Secure");
    }

    let pool = match DbPool::new(&config).await {
        Ok(pool) => pool,
        Err(e) => fail("Failed to initialize database", e),
    };
    info!("Database connection established");

    if let Err(e) = pool.run_migrations().await {
        fail("Failed to run migrations", e);
    }

    if migrate_only {
        info!("Migrations applied, exiting (--migrate)");
        return Ok(());
    }

    let store: Arc<dyn KeyValueStore> = match RedisStore::new(&config.redis_url) {
        Ok(store) => Arc::new(store),
        Err(e) => fail("Failed to configure Redis", e),
    };
    if let Err(e) = store.ping().await {
        // Sessions and rate limiting fail per request until Redis is reachable.
        warn!("Redis is not reachable yet: {}", e);
    } else {
        info!("Redis connection established");
    }

    let context = match AppContext::new(&config, pool, store) {
        Ok(context) => context,
        Err(e) => fail("Failed to initialize services", e),
    };

    let bind_address = config.bind_address();
    let cors_origin = config.cors_origin.clone();

    let worker_count = if config.is_development() {
        info!(
            "Starting server at http://{} (4 workers - development mode)",
            bind_address
        );
        4
    } else {
        let cpus = num_cpus::get();
        info!(
            "Starting server at http://{} ({} workers)",
            bind_address, cpus
        );
        cpus
    };

    // Start HTTP server
    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&cors_origin)
            .allowed_methods(vec!["GET", "POST", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(SessionResolver)
            .wrap(RequestLogger)
            // CORS must wrap every other middleware
            .wrap(cors)
            .configure(|cfg| context.configure(cfg))
    });

    server
        .workers(worker_count)
        .bind(&bind_address)?
        .run()
        .await
}
