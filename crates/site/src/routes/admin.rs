//! Admin route handlers.
//!
//! Credential endpoints (`login`, `initializePassword`, `setPassword`) are
//! rate limited in [`super::app`]. Only `getSubmissions` needs the session
//! marker.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::header::SET_COOKIE,
    response::{AppendHeaders, IntoResponse},
};
use serde::Deserialize;
use tracing::instrument;

use bridgia_core::{ContactSubmission, ValidationErrors};

use super::Success;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::{RequireAdminSession, clear_marker_cookie, marker_cookie};
use crate::services::auth::{AdminAuthService, AuthError};
use crate::state::AppState;

/// Body of `login` and `initializePassword`.
#[derive(Deserialize)]
pub struct PasswordInput {
    pub password: String,
}

/// Body of `setPassword`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPasswordInput {
    pub current_password: String,
    pub new_password: String,
}

/// Log in with the admin password.
///
/// POST /api/admin.login
///
/// Sets the `admin_token` marker cookie on success only.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<PasswordInput>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(input) = payload?;

    AdminAuthService::new(state.store())
        .login(&input.password)
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "Admin login rejected"))?;

    add_breadcrumb("admin", "Admin logged in", None);
    tracing::info!("Admin logged in");

    Ok((
        AppendHeaders([(SET_COOKIE, marker_cookie().to_string())]),
        Json(Success::new()),
    ))
}

/// Set the admin password for the first time.
///
/// POST /api/admin.initializePassword
#[instrument(skip_all)]
pub async fn initialize_password(
    State(state): State<AppState>,
    payload: std::result::Result<Json<PasswordInput>, JsonRejection>,
) -> Result<Json<Success>> {
    let Json(input) = payload?;

    AdminAuthService::new(state.store())
        .initialize_password(&input.password)
        .await?;

    add_breadcrumb("admin", "Admin password initialized", None);
    Ok(Json(Success::new()))
}

/// Change the admin password.
///
/// POST /api/admin.setPassword
///
/// Proof of the current password is the only authorization.
#[instrument(skip_all)]
pub async fn set_password(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SetPasswordInput>, JsonRejection>,
) -> Result<Json<Success>> {
    let Json(input) = payload?;

    AdminAuthService::new(state.store())
        .set_password(&input.current_password, &input.new_password)
        .await
        .map_err(|e| match e {
            AuthError::WeakPassword(reason) => {
                AppError::Validation(ValidationErrors::single("newPassword", reason))
            }
            other => other.into(),
        })?;

    add_breadcrumb("admin", "Admin password changed", None);
    Ok(Json(Success::new()))
}

/// List every submission, newest first.
///
/// GET /api/admin.getSubmissions
#[instrument(skip_all)]
pub async fn get_submissions(
    _admin: RequireAdminSession,
    State(state): State<AppState>,
) -> Result<Json<Vec<ContactSubmission>>> {
    let submissions = state.store().list_submissions().await?;
    tracing::debug!(count = submissions.len(), "Listing submissions");
    Ok(Json(submissions))
}

/// Drop the session marker.
///
/// POST /api/admin.logout
pub async fn logout() -> impl IntoResponse {
    add_breadcrumb("admin", "Admin logged out", None);

    (
        AppendHeaders([(SET_COOKIE, clear_marker_cookie().to_string())]),
        Json(Success::new()),
    )
}
