//! HTTP route handlers for the site API.
//!
//! # Route Structure
//!
//! Procedures follow the `namespace.procedure` naming the website frontend
//! already calls.
//!
//! ```text
//! GET  /health                       - Liveness check
//! GET  /health/ready                 - Readiness check (store reachable)
//!
//! # Contact
//! POST /api/contact.submit           - Submit the contact form
//!
//! # Admin (credential routes are rate limited)
//! POST /api/admin.login              - Log in, sets admin_token cookie
//! POST /api/admin.initializePassword - One-time password setup
//! POST /api/admin.setPassword        - Change password (needs current one)
//! GET  /api/admin.getSubmissions     - Inbox (requires admin_token)
//! POST /api/admin.logout             - Clear admin_token
//! ```

pub mod admin;
pub mod contact;

use axum::{
    Router,
    extract::State,
    http::{HeaderValue, Method, StatusCode, header::CONTENT_TYPE},
    middleware,
    routing::{get, post},
};
use serde::Serialize;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultOnResponse, OnResponse, TraceLayer},
};
use tracing::Span;

use crate::config::TrustedProxy;
use crate::middleware::{auth_rate_limiter, request_id_middleware, security_headers_middleware};
use crate::state::AppState;

/// `{"success": true}` body returned by mutating procedures.
#[derive(Debug, Serialize)]
pub struct Success {
    pub success: bool,
}

impl Success {
    #[must_use]
    pub const fn new() -> Self {
        Self { success: true }
    }
}

impl Default for Success {
    fn default() -> Self {
        Self::new()
    }
}

/// Admin routes that accept the admin password.
fn credential_routes(rate_limit: Option<TrustedProxy>) -> Router<AppState> {
    let routes = Router::new()
        .route("/api/admin.login", post(admin::login))
        .route(
            "/api/admin.initializePassword",
            post(admin::initialize_password),
        )
        .route("/api/admin.setPassword", post(admin::set_password));

    match rate_limit {
        Some(proxy) => routes.layer(auth_rate_limiter(proxy)),
        None => routes,
    }
}

/// Create all API routes.
///
/// `rate_limit` names the trusted proxy for client IP keys; `None` disables
/// the credential rate limiter.
pub fn routes(rate_limit: Option<TrustedProxy>) -> Router<AppState> {
    Router::new()
        .route("/api/contact.submit", post(contact::submit))
        .route("/api/admin.getSubmissions", get(admin::get_submissions))
        .route("/api/admin.logout", post(admin::logout))
        .merge(credential_routes(rate_limit))
}

/// CORS for a frontend served from another origin.
///
/// Credentials are allowed so the browser sends `admin_token` cross-site.
fn cors_layer(origin: &str) -> Option<CorsLayer> {
    let Ok(origin) = HeaderValue::from_str(origin) else {
        tracing::warn!(origin, "Ignoring invalid SITE_CORS_ORIGIN");
        return None;
    };

    Some(
        CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([CONTENT_TYPE])
            .max_age(std::time::Duration::from_secs(60 * 60)),
    )
}

/// Build the complete application router.
///
/// Sentry layers are added by the binary; everything else lives here so
/// tests exercise the same stack.
pub fn app(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes(
            state
                .config()
                .rate_limit
                .then_some(state.config().trusted_proxy),
        ))
        .layer(middleware::from_fn(security_headers_middleware));

    if let Some(cors) = state.config().cors_origin.as_deref().and_then(cors_layer) {
        router = router.layer(cors);
    }

    router
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
