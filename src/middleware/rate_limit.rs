//! Sliding-window rate limiting.
//!
//! Every request is recorded in a per-identity window of timestamps; a request
//! is allowed when fewer than `max_requests` earlier requests fall inside the
//! trailing window. Rejected requests are recorded too, so a client that keeps
//! hammering stays limited.

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::{Error, HttpMessage, web};
use chrono::Utc;
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::auth::SessionState;
use crate::cache::KeyValueStore;
use crate::config::RateLimitConfig;
use crate::error::{AppError, AppResult};

const KEY_PREFIX: &str = "ratelimit:";

/// Per-identity sliding-window limiter.
///
/// Window entries are scored in seconds but carry microsecond precision, so
/// two requests inside the same second count as two entries.
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn KeyValueStore>,
    max_requests: u64,
    window: Duration,
    enforce: bool,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn KeyValueStore>, config: &RateLimitConfig) -> Self {
        Self {
            store,
            max_requests: config.max_requests,
            window: config.window,
            enforce: config.enforce,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn is_enforced(&self) -> bool {
        self.enforce
    }

    /// Record a request for `identity` now and decide whether it may proceed.
    ///
    /// When enforcement is off the store is not touched and every request is
    /// allowed.
    pub async fn allow(&self, identity: &str) -> AppResult<bool> {
        if !self.enforce {
            return Ok(true);
        }
        let now = Utc::now().timestamp_micros() as f64 / 1_000_000.0;
        self.check_at(identity, now).await
    }

    /// Record a request at `now` (seconds since the epoch) and decide whether
    /// it may proceed. Ignores the enforcement switch.
    pub async fn check_at(&self, identity: &str, now: f64) -> AppResult<bool> {
        let key = format!("{}{}", KEY_PREFIX, identity);
        let earlier = self.store.record_in_window(&key, now, self.window).await?;
        Ok(earlier < self.max_requests)
    }
}

/// Limiter identity of a request: the signed-in user if the session resolved,
/// otherwise the client address (first `X-Forwarded-For` entry, then the peer).
pub fn identity_for(req: &ServiceRequest) -> String {
    if let Some(user) = req
        .extensions()
        .get::<SessionState>()
        .and_then(|state| state.user())
    {
        return format!("user:{}", user.id);
    }

    let forwarded = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string);

    let addr = forwarded
        .or_else(|| req.peer_addr().map(|a| a.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string());

    format!("ip:{}", addr)
}

/// Rate limiting middleware factory.
///
/// Needs `web::Data<RateLimiter>` registered as app data. Must run inside
/// [`crate::auth::SessionResolver`] so signed-in users are counted per user.
pub struct RateLimit;

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service: Rc::new(service),
        }))
    }
}

/// Rate limiting middleware service.
pub struct RateLimitMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let limiter = req.app_data::<web::Data<RateLimiter>>().cloned();

        Box::pin(async move {
            let Some(limiter) = limiter else {
                let err = AppError::Internal("Rate limiter is not configured".to_string());
                return Ok(req.error_response(err).map_into_right_body());
            };

            if limiter.is_enforced() {
                let identity = identity_for(&req);
                match limiter.allow(&identity).await {
                    Ok(true) => {}
                    Ok(false) => {
                        warn!(identity = %identity, path = %req.path(), "Rate limit exceeded");
                        let err = AppError::RateLimited {
                            retry_after_secs: limiter.window().as_secs(),
                        };
                        return Ok(req.error_response(err).map_into_right_body());
                    }
                    Err(err) => return Ok(req.error_response(err).map_into_right_body()),
                }
            }

            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}
