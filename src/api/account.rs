//! Account and session endpoints.

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use crate::auth::{ApiUser, LOGIN_PATH, MaybeUser, PageUser, SessionManager};
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{UpdateProfileRequest, User};

/// Current session user, `null` when signed out.
#[derive(Serialize, ToSchema)]
pub struct SessionResponse {
    pub user: Option<User>,
}

fn session_token(req: &HttpRequest, sessions: &SessionManager) -> Option<String> {
    req.cookie(sessions.cookie_name())
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

/// Profile of the signed-in user.
#[utoipa::path(
    get,
    path = "/api/v1/me",
    tag = "Account",
    responses(
        (status = 200, description = "Signed-in user", body = User),
        (status = 401, description = "Not signed in", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_me(user: ApiUser) -> HttpResponse {
    HttpResponse::Ok().json(user.0)
}

/// Edit the signed-in user's email or display name.
#[utoipa::path(
    patch,
    path = "/api/v1/me",
    tag = "Account",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 400, description = "Blank field", body = crate::error::ErrorResponse),
        (status = 401, description = "Not signed in", body = crate::error::ErrorResponse),
    )
)]
pub async fn update_me(
    user: ApiUser,
    pool: web::Data<DbPool>,
    body: web::Json<UpdateProfileRequest>,
) -> AppResult<HttpResponse> {
    body.validate().map_err(AppError::InvalidInput)?;

    let updated = pool
        .update_user(
            user.0.id,
            body.email.as_deref().map(str::trim),
            body.name.as_deref().map(str::trim),
        )
        .await?;

    info!(user_id = %updated.id, "Profile updated");
    Ok(HttpResponse::Ok().json(updated))
}

/// Delete the signed-in user together with their library, and end the session.
#[utoipa::path(
    delete,
    path = "/api/v1/me",
    tag = "Account",
    responses(
        (status = 204, description = "Account deleted"),
        (status = 401, description = "Not signed in", body = crate::error::ErrorResponse),
    )
)]
pub async fn delete_me(
    req: HttpRequest,
    user: ApiUser,
    pool: web::Data<DbPool>,
    sessions: web::Data<SessionManager>,
) -> AppResult<HttpResponse> {
    pool.delete_user(user.0.id).await?;
    let removal = sessions
        .logout(session_token(&req, &sessions).as_deref())
        .await?;

    info!(user_id = %user.0.id, "Account deleted");
    Ok(HttpResponse::NoContent().cookie(removal).finish())
}

/// Current session, if any. Never fails for signed-out callers.
#[utoipa::path(
    get,
    path = "/auth/session",
    tag = "Account",
    responses(
        (status = 200, description = "Current user or null", body = SessionResponse),
    )
)]
pub async fn current_session(user: MaybeUser) -> HttpResponse {
    HttpResponse::Ok().json(SessionResponse { user: user.0 })
}

/// End the current session and return to the login page.
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "Account",
    responses(
        (status = 303, description = "Session ended, redirect to the login page"),
    )
)]
pub async fn logout(
    req: HttpRequest,
    sessions: web::Data<SessionManager>,
) -> AppResult<HttpResponse> {
    let removal = sessions
        .logout(session_token(&req, &sessions).as_deref())
        .await?;

    Ok(HttpResponse::SeeOther()
        .insert_header((header::LOCATION, LOGIN_PATH))
        .cookie(removal)
        .finish())
}

/// Account page data for the browser; signed-out visitors go to the login page.
pub async fn account_page(user: PageUser) -> HttpResponse {
    HttpResponse::Ok().json(SessionResponse {
        user: Some(user.0),
    })
}

/// Configure `/api/v1/me` routes.
pub fn configure_api_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/me")
            .route(web::get().to(get_me))
            .route(web::patch().to(update_me))
            .route(web::delete().to(delete_me)),
    );
}

/// Configure browser-facing session routes outside the API scope.
pub fn configure_session_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/auth/session", web::get().to(current_session))
        .service(
            web::resource("/auth/logout")
                .route(web::post().to(logout))
                .route(web::get().to(logout)),
        )
        .route("/account", web::get().to(account_page));
}
