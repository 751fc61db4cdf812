//! Actix-web extractors for the three session access policies.
//!
//! All of them read the [`SessionState`] left in the request extensions by
//! [`super::SessionResolver`]; none of them touch the session store.

use actix_web::cookie::Cookie;
use actix_web::dev::Payload;
use actix_web::http::{StatusCode, header};
use actix_web::{FromRequest, HttpMessage, HttpRequest, HttpResponse, ResponseError, web};
use std::future::{Ready, ready};

use super::resolver::SessionState;
use super::session::SessionManager;
use crate::error::{AppError, ErrorResponse};
use crate::models::User;

/// Where the browser policy sends signed-out visitors.
pub const LOGIN_PATH: &str = "/login";

/// Why an auth extractor refused a request.
///
/// When the session pointed at a deleted user, the rejection carries a cookie
/// that clears the session cookie in the browser.
#[derive(Debug)]
pub enum AuthRejection {
    /// JSON endpoints: 401
    Unauthorized { clear_cookie: Option<Cookie<'static>> },
    /// Browser pages: 303 to the login page
    LoginRedirect { clear_cookie: Option<Cookie<'static>> },
    /// The session could not be resolved because a backend failed
    Unavailable(String),
    /// The session resolver did not run for this route
    Misconfigured,
}

impl std::fmt::Display for AuthRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthRejection::Unauthorized { .. } => write!(f, "Unauthorized"),
            AuthRejection::LoginRedirect { .. } => write!(f, "Login required"),
            AuthRejection::Unavailable(reason) => write!(f, "Session unavailable: {}", reason),
            AuthRejection::Misconfigured => write!(f, "Internal configuration error"),
        }
    }
}

impl ResponseError for AuthRejection {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthRejection::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AuthRejection::LoginRedirect { .. } => StatusCode::SEE_OTHER,
            AuthRejection::Unavailable(_) | AuthRejection::Misconfigured => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AuthRejection::Unauthorized { clear_cookie } => {
                let mut builder = HttpResponse::Unauthorized();
                if let Some(cookie) = clear_cookie {
                    builder.cookie(cookie.clone());
                }
                builder.json(ErrorResponse {
                    error: "UNAUTHORIZED".to_string(),
                    message: "Unauthorized".to_string(),
                })
            }
            AuthRejection::LoginRedirect { clear_cookie } => {
                let mut builder = HttpResponse::SeeOther();
                builder.insert_header((header::LOCATION, LOGIN_PATH));
                if let Some(cookie) = clear_cookie {
                    builder.cookie(cookie.clone());
                }
                builder.finish()
            }
            AuthRejection::Unavailable(reason) => AppError::Cache(reason.clone()).error_response(),
            AuthRejection::Misconfigured => {
                tracing::error!("Auth extractor used on a route without session resolution");
                HttpResponse::InternalServerError().json(ErrorResponse {
                    error: "INTERNAL_ERROR".to_string(),
                    message: "An internal error occurred".to_string(),
                })
            }
        }
    }
}

fn session_state(req: &HttpRequest) -> Option<SessionState> {
    req.extensions().get::<SessionState>().cloned()
}

/// Removal cookie for a session whose user has vanished; `None` otherwise.
fn clear_cookie_for(req: &HttpRequest, state: &SessionState) -> Option<Cookie<'static>> {
    if *state != SessionState::Vanished {
        return None;
    }
    req.app_data::<web::Data<SessionManager>>()
        .map(|sessions| sessions.removal_cookie())
}

/// Signed-in user for JSON endpoints. Anything else is a 401.
///
/// ```ignore
/// async fn list(user: ApiUser) -> AppResult<HttpResponse> {
///     let ApiUser(user) = user;
///     // ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ApiUser(pub User);

impl FromRequest for ApiUser {
    type Error = AuthRejection;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = match session_state(req) {
            None => Err(AuthRejection::Misconfigured),
            Some(SessionState::Authenticated(user)) => Ok(ApiUser(user)),
            Some(SessionState::Unavailable(reason)) => Err(AuthRejection::Unavailable(reason)),
            Some(state) => Err(AuthRejection::Unauthorized {
                clear_cookie: clear_cookie_for(req, &state),
            }),
        };
        ready(result)
    }
}

/// Signed-in user for browser pages. Anything else redirects to the login page.
#[derive(Debug, Clone)]
pub struct PageUser(pub User);

impl FromRequest for PageUser {
    type Error = AuthRejection;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = match session_state(req) {
            None => Err(AuthRejection::Misconfigured),
            Some(SessionState::Authenticated(user)) => Ok(PageUser(user)),
            Some(SessionState::Unavailable(reason)) => Err(AuthRejection::Unavailable(reason)),
            Some(state) => Err(AuthRejection::LoginRedirect {
                clear_cookie: clear_cookie_for(req, &state),
            }),
        };
        ready(result)
    }
}

/// Signed-in user if there is one. Never rejects and never sets cookies, even
/// when the session could not be resolved.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

impl FromRequest for MaybeUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let user = session_state(req).and_then(|state| match state {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        });
        ready(Ok(MaybeUser(user)))
    }
}
