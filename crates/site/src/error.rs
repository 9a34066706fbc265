//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. All route handlers return
//! `Result<T, AppError>`.
//!
//! Every error response has the same JSON shape:
//!
//! ```json
//! {"error": {"code": "BAD_REQUEST", "message": "...", "fields": {"email": "Invalid email"}}}
//! ```
//!
//! `fields` is only present for validation failures.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use bridgia_core::ValidationErrors;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::intake::IntakeError;
use crate::services::notify::NotifyError;

/// Application-level error type for the site.
#[derive(Debug, Error)]
pub enum AppError {
    /// One or more input fields are invalid.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// The request body could not be read.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// No admin session marker on the request.
    #[error("Authentication required")]
    Unauthenticated,

    /// Wrong admin password.
    #[error("Invalid password")]
    InvalidCredentials,

    /// The admin password was already set.
    #[error("Admin password already initialized")]
    AlreadyInitialized,

    /// The admin password has not been set yet.
    #[error("Admin password not initialized")]
    NotInitialized,

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Owner notification failed.
    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::AlreadyInitialized => StatusCode::FORBIDDEN,
            Self::NotInitialized => StatusCode::PRECONDITION_FAILED,
            Self::Database(_) | Self::Notify(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => "BAD_REQUEST",
            Self::Unauthenticated | Self::InvalidCredentials => "UNAUTHORIZED",
            Self::AlreadyInitialized => "FORBIDDEN",
            Self::NotInitialized => "PRECONDITION_FAILED",
            Self::Database(_) | Self::Notify(_) | Self::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    const fn is_server_error(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Notify(_) | Self::Internal(_))
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::WeakPassword(reason) => {
                Self::Validation(ValidationErrors::single("password", reason))
            }
            AuthError::AlreadyInitialized => Self::AlreadyInitialized,
            AuthError::NotInitialized => Self::NotInitialized,
            AuthError::InvalidCredentials => Self::InvalidCredentials,
            AuthError::Repository(e) => Self::Database(e),
            AuthError::PasswordHash => Self::Internal("password hashing failed".to_string()),
        }
    }
}

impl From<IntakeError> for AppError {
    fn from(err: IntakeError) -> Self {
        match err {
            IntakeError::Validation(errors) => Self::Validation(errors),
            IntakeError::Repository(e) => Self::Database(e),
            IntakeError::Notify(e) => Self::Notify(e),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: ErrorDetail<'a>,
}

#[derive(Serialize)]
struct ErrorDetail<'a> {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a ValidationErrors>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(_) | Self::Notify(_) | Self::Internal(_) => {
                "Internal server error".to_string()
            }
            Self::Validation(_) => "Invalid input".to_string(),
            Self::BadRequest(reason) => reason.clone(),
            _ => self.to_string(),
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code(),
                message,
                fields: match &self {
                    Self::Validation(errors) if !errors.is_empty() => Some(errors),
                    _ => None,
                },
            },
        };

        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for admin actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("admin", "Password changed", None);
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_error_display() {
        assert_eq!(AppError::Unauthenticated.to_string(), "Authentication required");
        assert_eq!(AppError::InvalidCredentials.to_string(), "Invalid password");
        assert_eq!(
            AppError::AlreadyInitialized.to_string(),
            "Admin password already initialized"
        );
        assert_eq!(
            AppError::NotInitialized.to_string(),
            "Admin password not initialized"
        );
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::Validation(ValidationErrors::single("name", "x"))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(get_status(AppError::Unauthenticated), StatusCode::UNAUTHORIZED);
        assert_eq!(get_status(AppError::InvalidCredentials), StatusCode::UNAUTHORIZED);
        assert_eq!(get_status(AppError::AlreadyInitialized), StatusCode::FORBIDDEN);
        assert_eq!(
            get_status(AppError::NotInitialized),
            StatusCode::PRECONDITION_FAILED
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_validation_body_has_fields() {
        let mut errors = ValidationErrors::default();
        errors.add("email", "Invalid email");
        errors.add("name", "Name is required");

        let (status, body) = body_json(AppError::Validation(errors)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
        assert_eq!(body["error"]["fields"]["email"], "Invalid email");
        assert_eq!(body["error"]["fields"]["name"], "Name is required");
    }

    #[tokio::test]
    async fn test_internal_details_hidden() {
        let (status, body) = body_json(AppError::Notify(NotifyError::Status(502))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "INTERNAL_SERVER_ERROR");
        assert_eq!(body["error"]["message"], "Internal server error");
        assert!(body["error"].get("fields").is_none());
    }

    #[test]
    fn test_weak_password_maps_to_field() {
        let err = AppError::from(AuthError::WeakPassword("too short".to_string()));
        let AppError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert_eq!(errors.get("password"), Some("too short"));
    }
}
