//! Shared test helpers.

use actix_web::body::MessageBody;
use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::Method;
use actix_web::http::header::HeaderMap;
use actix_web::{App, test};
use async_trait::async_trait;
use secrecy::SecretString;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use reelscore_lib::AppContext;
use reelscore_lib::auth::SessionResolver;
use reelscore_lib::cache::{CacheError, CacheResult, KeyValueStore, MemoryStore};
use reelscore_lib::config::{
    Config, DatabaseConfig, Environment, RateLimitConfig, SessionConfig, TmdbConfig,
};
use reelscore_lib::db::DbPool;
use reelscore_lib::middleware::RequestLogger;
use reelscore_lib::models::{Provider, User};

/// Configuration for tests: development mode, limiter off, unreachable catalog.
pub fn test_config() -> Config {
    Config {
        environment: Environment::Development,
        host: "127.0.0.1".to_string(),
        port: 0,
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            // One connection: every new in-memory connection is a new database
            max_connections: 1,
            min_connections: 1,
        },
        redis_url: "redis://127.0.0.1:1".to_string(),
        session: SessionConfig {
            cookie_name: "session".to_string(),
            ttl: Duration::from_secs(3600),
            secure_cookies: false,
        },
        rate_limit: RateLimitConfig {
            max_requests: 100,
            window: Duration::from_secs(60),
            enforce: false,
        },
        tmdb: TmdbConfig {
            base_url: "http://127.0.0.1:1/3".to_string(),
            api_key: SecretString::from("test-key"),
        },
        cors_origin: "http://localhost:5173".to_string(),
    }
}

/// Fresh migrated database, private to the caller.
pub async fn create_test_pool() -> DbPool {
    let pool = DbPool::connect(&test_config().database)
        .await
        .expect("Failed to open in-memory database");
    pool.run_migrations()
        .await
        .expect("Failed to run migrations");
    pool
}

/// Services over a fresh database and memory store.
pub async fn create_context(config: &Config) -> (AppContext, MemoryStore) {
    let pool = create_test_pool().await;
    let store = MemoryStore::new();
    let context = AppContext::new(config, pool, Arc::new(store.clone()))
        .expect("Failed to build app context");
    (context, store)
}

/// Key-value store whose every call fails, as if Redis were unreachable.
pub struct UnreachableStore;

fn unreachable<T>() -> CacheResult<T> {
    Err(CacheError::Connection("connection refused".to_string()))
}

#[async_trait]
impl KeyValueStore for UnreachableStore {
    async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
        unreachable()
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> CacheResult<()> {
        unreachable()
    }

    async fn expire(&self, _key: &str, _ttl: Duration) -> CacheResult<bool> {
        unreachable()
    }

    async fn delete(&self, _key: &str) -> CacheResult<()> {
        unreachable()
    }

    async fn exists(&self, _key: &str) -> CacheResult<bool> {
        unreachable()
    }

    async fn record_in_window(&self, _key: &str, _now: f64, _window: Duration) -> CacheResult<u64> {
        unreachable()
    }

    async fn ping(&self) -> CacheResult<()> {
        unreachable()
    }
}

/// Services over a fresh database and a store that is down.
pub async fn create_unreachable_context(config: &Config) -> AppContext {
    let pool = create_test_pool().await;
    AppContext::new(config, pool, Arc::new(UnreachableStore))
        .expect("Failed to build app context")
}

/// The app as `main` assembles it, minus CORS.
pub async fn create_test_app(
    context: &AppContext,
) -> impl Service<
    actix_http::Request,
    Response = ServiceResponse<impl MessageBody>,
    Error = actix_web::Error,
> {
    let context = context.clone();
    test::init_service(
        App::new()
            .wrap(SessionResolver)
            .wrap(RequestLogger)
            .configure(move |cfg| context.configure(cfg)),
    )
    .await
}

/// Create a user with a unique provider identity.
pub async fn create_user(pool: &DbPool, name: &str) -> User {
    pool.find_or_create_user(
        &Uuid::new_v4().to_string(),
        Provider::Github,
        &format!("{}@example.com", name.to_lowercase()),
        name,
    )
    .await
    .expect("Failed to create user")
}

/// Start a session for `user` and return its cookie.
pub async fn login(context: &AppContext, user: &User) -> Cookie<'static> {
    context
        .sessions
        .login(user.id)
        .await
        .expect("Failed to start session")
}

/// Build a request, optionally with a session cookie and a JSON body.
pub fn request(
    method: Method,
    uri: &str,
    cookie: Option<&Cookie<'static>>,
    body: Option<Value>,
) -> actix_http::Request {
    let mut req = test::TestRequest::default().method(method).uri(uri);
    if let Some(cookie) = cookie {
        req = req.cookie(cookie.clone());
    }
    if let Some(body) = body {
        req = req.set_json(body);
    }
    req.to_request()
}

/// Status, headers, cookies and JSON body (`Null` when empty) of a response.
pub struct Reply {
    pub status: u16,
    pub headers: HeaderMap,
    pub cookies: Vec<Cookie<'static>>,
    pub body: Value,
}

impl Reply {
    pub fn cookie(&self, name: &str) -> Option<&Cookie<'static>> {
        self.cookies.iter().find(|c| c.name() == name)
    }
}

/// Send a request through the app.
pub async fn send<S, B>(app: &S, req: actix_http::Request) -> Reply
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let resp = test::call_service(app, req).await;
    let status = resp.status().as_u16();
    let headers = resp.headers().clone();
    let cookies = resp
        .response()
        .cookies()
        .map(|c| c.into_owned())
        .collect();

    let bytes = test::read_body(resp).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Response body is not JSON")
    };

    Reply {
        status,
        headers,
        cookies,
        body,
    }
}

/// JSON body for adding a movie.
pub fn movie_json(tmdb_id: i32, title: &str, tmdb_score: f64, watched: bool) -> Value {
    serde_json::json!({
        "tmdbId": tmdb_id,
        "title": title,
        "posterPath": format!("/poster{}.jpg", tmdb_id),
        "releaseDate": "1999-03-31",
        "tmdbScore": tmdb_score,
        "watched": watched,
    })
}
