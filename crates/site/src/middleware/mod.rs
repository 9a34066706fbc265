//! HTTP middleware stack for the site.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. CORS (only when `SITE_CORS_ORIGIN` is set)
//! 5. Security headers
//! 6. Rate limiting on admin credential routes (governor)

pub mod admin_session;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;

pub use admin_session::{RequireAdminSession, clear_marker_cookie, marker_cookie};
pub use rate_limit::auth_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
