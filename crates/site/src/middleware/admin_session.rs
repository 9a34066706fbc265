//! Admin session marker cookie.
//!
//! A successful login sets `admin_token=authenticated` for 24 hours. The
//! marker carries no identity or signature: anyone holding the cookie is
//! treated as the admin. Keep the admin API behind HTTPS.

use axum::{
    extract::FromRequestParts,
    http::{header::COOKIE, request::Parts},
};
use tower_sessions::cookie::{Cookie, SameSite, time::Duration};

use crate::error::AppError;

/// Cookie holding the admin session marker.
pub const ADMIN_COOKIE_NAME: &str = "admin_token";

/// The only cookie value accepted as a session.
pub const ADMIN_MARKER_VALUE: &str = "authenticated";

/// Marker lifetime in hours.
pub const ADMIN_SESSION_HOURS: i64 = 24;

/// Build the cookie issued on successful login.
#[must_use]
pub fn marker_cookie() -> Cookie<'static> {
    Cookie::build((ADMIN_COOKIE_NAME, ADMIN_MARKER_VALUE))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .path("/")
        .max_age(Duration::hours(ADMIN_SESSION_HOURS))
        .build()
}

/// Build the cookie that makes the browser drop the marker.
#[must_use]
pub fn clear_marker_cookie() -> Cookie<'static> {
    Cookie::build((ADMIN_COOKIE_NAME, ""))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .path("/")
        .max_age(Duration::seconds(-1))
        .build()
}

/// Whether the request headers carry a valid marker.
fn has_marker(parts: &Parts) -> bool {
    parts
        .headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .any(|cookie| cookie.name() == ADMIN_COOKIE_NAME && cookie.value() == ADMIN_MARKER_VALUE)
}

/// Extractor that requires the admin session marker.
///
/// Rejects with `AppError::Unauthenticated` if the cookie is missing or has
/// any value other than the marker.
///
/// # Example
///
/// ```rust,ignore
/// async fn inbox(_admin: RequireAdminSession, State(state): State<AppState>) -> Result<..> {
///     ...
/// }
/// ```
pub struct RequireAdminSession;

impl<S> FromRequestParts<S> for RequireAdminSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if has_marker(parts) {
            Ok(Self)
        } else {
            Err(AppError::Unauthenticated)
        }
    }
}
