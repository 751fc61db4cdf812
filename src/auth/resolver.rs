//! Session resolution middleware.
//!
//! Runs once per request: reads the session cookie, looks the token up in the
//! session store and loads the user. The outcome is stored in the request
//! extensions as a [`SessionState`] for the auth extractors and the rate
//! limiter to read. Resolution failures are recorded as
//! [`SessionState::Unavailable`] rather than failing the request, so routes
//! that do not require a user keep working while the store is down.

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::{Error, HttpMessage, web};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};
use std::rc::Rc;
use tracing::{error, warn};

use super::session::{SessionManager, SessionStore, token_fingerprint};
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::User;

/// Outcome of resolving the session cookie of a request.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// No session cookie was sent
    Anonymous,
    /// The cookie names a session that is absent or expired
    Invalid,
    /// The session pointed at a user that no longer exists; the session has
    /// been deleted
    Vanished,
    /// The session store or database failed while resolving the cookie
    Unavailable(String),
    Authenticated(User),
}

impl SessionState {
    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

/// Resolve a session token to a [`SessionState`].
///
/// A session whose user is gone is deleted before returning
/// [`SessionState::Vanished`]. Store and database failures are errors, never
/// an anonymous outcome.
pub async fn resolve_session(
    sessions: &SessionStore,
    pool: &DbPool,
    token: &str,
) -> AppResult<SessionState> {
    let user_id = match sessions.get(token).await {
        Ok(user_id) => user_id,
        Err(AppError::NotFound(_)) => return Ok(SessionState::Invalid),
        Err(e) => return Err(e),
    };

    match pool.get_user(user_id).await? {
        Some(user) => Ok(SessionState::Authenticated(user)),
        None => {
            warn!(
                session = %token_fingerprint(token),
                user_id = %user_id,
                "Session points to a deleted user, removing it"
            );
            sessions.delete(token).await?;
            Ok(SessionState::Vanished)
        }
    }
}

/// Session resolution middleware factory.
///
/// Needs `web::Data<SessionManager>` and `web::Data<DbPool>` registered as app data.
pub struct SessionResolver;

impl<S, B> Transform<S, ServiceRequest> for SessionResolver
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionResolverMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionResolverMiddleware {
            service: Rc::new(service),
        }))
    }
}

/// Session resolution middleware service.
pub struct SessionResolverMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for SessionResolverMiddleware<S>
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

        let sessions = req.app_data::<web::Data<SessionManager>>().cloned();
        let pool = req.app_data::<web::Data<DbPool>>().cloned();

        Box::pin(async move {
            let (Some(sessions), Some(pool)) = (sessions, pool) else {
                let err = AppError::Internal(
                    "Session resolver is missing its session manager or database pool".to_string(),
                );
                return Ok(req.error_response(err).map_into_right_body());
            };

            let token = req
                .cookie(sessions.cookie_name())
                .map(|c| c.value().to_string())
                .filter(|v| !v.is_empty());

            let state = match token {
                None => SessionState::Anonymous,
                Some(token) => match resolve_session(sessions.store(), &pool, &token).await {
                    Ok(state) => state,
                    Err(err) => {
                        error!(
                            session = %token_fingerprint(&token),
                            error = %err,
                            "Session resolution failed"
                        );
                        SessionState::Unavailable(err.to_string())
                    }
                },
            };

            req.extensions_mut().insert(state);

            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}
