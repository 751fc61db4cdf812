//! Session store and session cookies.
//!
//! Sessions map an opaque token to a user id in the key-value backend under
//! `session:<token>`. Every successful lookup pushes the expiry back to the
//! full time-to-live.

use actix_web::cookie::{Cookie, SameSite, time::Duration as CookieDuration};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::cache::KeyValueStore;
use crate::config::SessionConfig;
use crate::error::{AppError, AppResult};

const KEY_PREFIX: &str = "session:";

/// Max-Age of the session cookie (7 days).
pub const SESSION_COOKIE_MAX_AGE_SECS: i64 = 604_800;

/// Short SHA-256 prefix of a token, safe to put in log lines.
pub fn token_fingerprint(token: &str) -> String {
    let digest = hex::encode(Sha256::digest(token.as_bytes()));
    digest[..12].to_string()
}

/// Token to user-id mapping with sliding expiration.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Generate a new session token: 32 bytes from the thread-local CSPRNG,
    /// URL-safe base64 with padding (44 characters).
    ///
    /// # Panics
    /// If the operating system entropy source is unavailable.
    pub fn generate_id() -> String {
        let random_bytes: [u8; 32] = rand::random();
        URL_SAFE.encode(random_bytes)
    }

    fn key(token: &str) -> String {
        format!("{}{}", KEY_PREFIX, token)
    }

    /// Store a session, replacing any previous mapping for the token.
    pub async fn set(&self, token: &str, user_id: Uuid) -> AppResult<()> {
        self.store
            .set(&Self::key(token), &user_id.to_string(), self.ttl)
            .await?;
        debug!(session = %token_fingerprint(token), user_id = %user_id, "Session stored");
        Ok(())
    }

    /// Look up the user for a token and refresh the session's expiry.
    ///
    /// Fails with `NotFound` when the session is absent, expired, or holds a
    /// value that is not a user id.
    pub async fn get(&self, token: &str) -> AppResult<Uuid> {
        let key = Self::key(token);

        let raw = self
            .store
            .get(&key)
            .await?
            .ok_or_else(|| AppError::NotFound("Session".to_string()))?;

        let user_id = Uuid::parse_str(&raw).map_err(|_| {
            warn!(session = %token_fingerprint(token), "Session holds a malformed user id");
            AppError::NotFound("Session".to_string())
        })?;

        self.store.expire(&key, self.ttl).await?;

        Ok(user_id)
    }

    /// Remove a session. Removing an unknown token is not an error.
    pub async fn delete(&self, token: &str) -> AppResult<()> {
        self.store.delete(&Self::key(token)).await?;
        Ok(())
    }

    /// Check for a live session without refreshing its expiry.
    pub async fn exists(&self, token: &str) -> AppResult<bool> {
        Ok(self.store.exists(&Self::key(token)).await?)
    }
}

/// Issues and revokes sessions together with the cookies that carry them.
#[derive(Clone)]
pub struct SessionManager {
    store: SessionStore,
    cookie_name: String,
    secure: bool,
}

impl SessionManager {
    pub fn new(store: SessionStore, config: &SessionConfig) -> Self {
        Self {
            store,
            cookie_name: config.cookie_name.clone(),
            secure: config.secure_cookies,
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Start a session for a user and return the cookie to send back.
    pub async fn login(&self, user_id: Uuid) -> AppResult<Cookie<'static>> {
        let token = SessionStore::generate_id();
        self.store.set(&token, user_id).await?;
        Ok(self.session_cookie(token))
    }

    /// End the session carried by `token`, if any, and return a cookie that
    /// clears it in the browser.
    pub async fn logout(&self, token: Option<&str>) -> AppResult<Cookie<'static>> {
        if let Some(token) = token {
            self.store.delete(token).await?;
            debug!(session = %token_fingerprint(token), "Session deleted");
        }
        Ok(self.removal_cookie())
    }

    /// Session cookie: Path=/, 7-day Max-Age, HttpOnly, SameSite=Lax,
    /// Secure only in production.
    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        let mut cookie = Cookie::new(self.cookie_name.clone(), token);
        cookie.set_path("/");
        cookie.set_max_age(CookieDuration::seconds(SESSION_COOKIE_MAX_AGE_SECS));
        cookie.set_http_only(true);
        cookie.set_same_site(SameSite::Lax);
        cookie.set_secure(self.secure);
        cookie
    }

    /// Cookie that makes the browser drop the session cookie.
    pub fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = Cookie::new(self.cookie_name.clone(), "");
        cookie.set_path("/");
        cookie.set_http_only(true);
        cookie.set_same_site(SameSite::Lax);
        cookie.set_secure(self.secure);
        cookie.make_removal();
        cookie
    }
}
