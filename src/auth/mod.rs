//! Session-backed authentication.
//!
//! A request's session cookie is resolved once by [`SessionResolver`]; handlers
//! then pick an access policy through one of the extractors:
//! - [`PageUser`]: browser pages, redirects to `/login` when signed out
//! - [`ApiUser`]: JSON endpoints, answers 401 when signed out
//! - [`MaybeUser`]: never blocks

mod extractor;
mod resolver;
mod session;

pub use extractor::{ApiUser, AuthRejection, LOGIN_PATH, MaybeUser, PageUser};
pub use resolver::{SessionResolver, SessionState, resolve_session};
pub use session::{SESSION_COOKIE_MAX_AGE_SECS, SessionManager, SessionStore, token_fingerprint};
