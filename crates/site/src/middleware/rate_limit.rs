//! Rate limiting middleware using governor and `tower_governor`.
//!
//! Only the admin credential endpoints are limited. They guard a single
//! shared secret, so brute forcing is the main threat.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{extract::ConnectInfo, http::Request};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

use crate::config::TrustedProxy;

// =============================================================================
// Client IP Key Extractor
// =============================================================================

/// Key extractor for the client IP.
///
/// Keys on the peer address of the connection unless a trusted proxy is
/// configured, in which case only that proxy's client IP header is read.
/// Generic forwarding headers (`X-Forwarded-For`, `X-Real-IP`) are never
/// used: a direct caller can set them to anything.
#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor {
    proxy: TrustedProxy,
}

impl ClientIpKeyExtractor {
    #[must_use]
    pub const fn new(proxy: TrustedProxy) -> Self {
        Self { proxy }
    }

    fn header_ip<T>(req: &Request<T>, name: &str) -> Option<IpAddr> {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
    }
}

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        self.proxy
            .client_ip_header()
            .and_then(|name| Self::header_ip(req, name))
            .or_else(|| {
                req.extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip())
            })
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

// =============================================================================
// Rate Limiter Configuration
// =============================================================================

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create rate limiter for admin auth endpoints: ~10 requests per minute per IP.
///
/// Configuration: 1 request every 6 seconds (replenish), burst of 5.
///
/// # Panics
///
/// This function will not panic. The configuration uses only valid positive
/// integers (`per_second(6)` and `burst_size(5)`), which are always accepted
/// by `GovernorConfigBuilder`.
#[must_use]
pub fn auth_rate_limiter(proxy: TrustedProxy) -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor::new(proxy))
        .per_second(6) // Replenish 1 token every 6 seconds (~10/minute)
        .burst_size(5) // Allow burst of 5 requests
        .finish()
        .expect("rate limiter config with per_second(6) and burst_size(5) is valid");
    GovernorLayer::new(Arc::new(config))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tower_governor::key_extractor::KeyExtractor;

    use super::*;

    fn with_peer<T>(mut req: Request<T>, peer: [u8; 4]) -> Request<T> {
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from((peer, 4711))));
        req
    }

    #[test]
    fn test_ignores_forwarding_headers_without_proxy() {
        let req = Request::builder()
            .header("x-forwarded-for", "198.51.100.4")
            .header("x-real-ip", "198.51.100.5")
            .header("cf-connecting-ip", "203.0.113.7")
            .header("fly-client-ip", "203.0.113.8")
            .body(())
            .unwrap();
        let req = with_peer(req, [192, 0, 2, 1]);

        let ip = ClientIpKeyExtractor::new(TrustedProxy::None)
            .extract(&req)
            .unwrap();
        assert_eq!(ip, "192.0.2.1".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_cloudflare_header_when_trusted() {
        let req = Request::builder()
            .header("x-forwarded-for", "10.0.0.1")
            .header("cf-connecting-ip", "203.0.113.7")
            .body(())
            .unwrap();
        let req = with_peer(req, [192, 0, 2, 1]);

        let ip = ClientIpKeyExtractor::new(TrustedProxy::Cloudflare)
            .extract(&req)
            .unwrap();
        assert_eq!(ip, "203.0.113.7".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_fly_header_when_trusted() {
        let req = Request::builder()
            .header("cf-connecting-ip", "203.0.113.7")
            .header("fly-client-ip", "198.51.100.9")
            .body(())
            .unwrap();
        let req = with_peer(req, [192, 0, 2, 1]);

        let ip = ClientIpKeyExtractor::new(TrustedProxy::Fly)
            .extract(&req)
            .unwrap();
        assert_eq!(ip, "198.51.100.9".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_trusted_header_missing_falls_back_to_peer() {
        let req = with_peer(Request::builder().body(()).unwrap(), [192, 0, 2, 1]);

        let ip = ClientIpKeyExtractor::new(TrustedProxy::Cloudflare)
            .extract(&req)
            .unwrap();
        assert_eq!(ip, "192.0.2.1".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_no_source_is_error() {
        let req = Request::builder()
            .header("x-forwarded-for", "198.51.100.4")
            .body(())
            .unwrap();
        assert!(
            ClientIpKeyExtractor::new(TrustedProxy::None)
                .extract(&req)
                .is_err()
        );
    }
}
