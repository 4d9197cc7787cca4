//! # Coordinator Rate Limiting
//!
//! Token-bucket rate limiter guarding the coordinator entry point (§5):
//! one bucket keyed by the caller's credential, one keyed by peer address.
//! Either bucket exhausting returns *rate limited* before any database work.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use parking_lot::RwLock;

use crate::error::AppError;
use crate::state::AppState;

/// Rate limiter configuration.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    /// Maximum requests per window.
    pub max_requests: u64,
    /// Window duration in seconds.
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 60,
            window_secs: 60,
        }
    }
}

#[derive(Debug, Clone)]
struct BucketState {
    count: u64,
    window_start: Instant,
}

/// A single keyed token bucket, shared across requests.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    buckets: Arc<RwLock<HashMap<String, BucketState>>>,
}

impl RateLimiter {
    /// Create a new limiter with the given config.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            buckets: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Maximum number of unique keys before triggering a prune sweep.
    const MAX_BUCKETS: usize = 10_000;

    /// Check whether a request keyed by `key` should be allowed.
    fn check(&self, key: &str) -> bool {
        let mut buckets = self.buckets.write();
        let now = Instant::now();

        if buckets.len() >= Self::MAX_BUCKETS {
            let window = self.config.window_secs.max(1);
            buckets.retain(|_, bucket| now.duration_since(bucket.window_start).as_secs() < window);
        }

        let bucket = buckets.entry(key.to_string()).or_insert(BucketState {
            count: 0,
            window_start: now,
        });

        if now.duration_since(bucket.window_start).as_secs() >= self.config.window_secs {
            bucket.count = 0;
            bucket.window_start = now;
        }

        if bucket.count >= self.config.max_requests {
            false
        } else {
            bucket.count += 1;
            true
        }
    }
}

/// The two buckets guarding the coordinator entry point.
#[derive(Debug, Clone)]
pub struct CoordinatorRateLimiter {
    per_credential: RateLimiter,
    per_peer: RateLimiter,
}

impl CoordinatorRateLimiter {
    /// Build both buckets from the same config.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            per_credential: RateLimiter::new(config),
            per_peer: RateLimiter::new(config),
        }
    }

    fn check(&self, credential_key: &str, peer_key: &str) -> bool {
        self.per_credential.check(credential_key) && self.per_peer.check(peer_key)
    }
}

/// Middleware enforcing [`CoordinatorRateLimiter`] ahead of any database
/// work. The credential key is the raw `Authorization` header value (not
/// yet parsed — this runs before the auth middleware) so an attacker
/// cycling through secrets for one agent id still shares one bucket.
///
/// Peer address comes from `ConnectInfo`, populated only when the server is
/// bound with `into_make_service_with_connect_info::<SocketAddr>()`; its
/// absence (unit tests, some reverse-proxy setups) falls back to a shared
/// key rather than rejecting the request, so it degrades to credential-only
/// limiting instead of failing closed.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let limiter = match request.extensions().get::<CoordinatorRateLimiter>() {
        Some(limiter) => limiter.clone(),
        None => return Ok(next.run(request).await),
    };
    let _ = &state;

    let credential_key = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("anonymous")
        .to_string();
    let peer_key = peer.map(|ConnectInfo(addr)| addr.ip().to_string()).unwrap_or_else(|| "unknown-peer".to_string());

    if !limiter.check(&credential_key, &peer_key) {
        return Err(AppError::RateLimited);
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_limiter_allows_first_request() {
        let limiter = RateLimiter::new(RateLimitConfig { max_requests: 10, window_secs: 60 });
        assert!(limiter.check("key"));
    }

    #[test]
    fn check_under_limit_returns_true() {
        let limiter = RateLimiter::new(RateLimitConfig { max_requests: 5, window_secs: 60 });
        for i in 0..5 {
            assert!(limiter.check("client-a"), "request {i} should be allowed");
        }
    }

    #[test]
    fn check_over_limit_returns_false() {
        let limiter = RateLimiter::new(RateLimitConfig { max_requests: 3, window_secs: 60 });
        assert!(limiter.check("client-a"));
        assert!(limiter.check("client-a"));
        assert!(limiter.check("client-a"));
        assert!(!limiter.check("client-a"));
    }

    #[test]
    fn different_keys_have_independent_buckets() {
        let limiter = RateLimiter::new(RateLimitConfig { max_requests: 2, window_secs: 60 });
        assert!(limiter.check("a"));
        assert!(limiter.check("a"));
        assert!(!limiter.check("a"));
        assert!(limiter.check("b"));
    }

    #[test]
    fn window_reset_allows_new_requests() {
        let limiter = RateLimiter::new(RateLimitConfig { max_requests: 1, window_secs: 0 });
        assert!(limiter.check("client-a"));
        assert!(limiter.check("client-a"), "zero-second window resets on every check");
    }

    #[test]
    fn coordinator_limiter_requires_both_buckets_to_pass() {
        let limiter = CoordinatorRateLimiter::new(RateLimitConfig { max_requests: 1, window_secs: 60 });
        assert!(limiter.check("cred-a", "peer-a"));
        // Same credential, different peer: credential bucket now exhausted.
        assert!(!limiter.check("cred-a", "peer-b"));
        // Different credential, peer-a already used: peer bucket exhausted.
        assert!(!limiter.check("cred-b", "peer-a"));
        // Fresh pair still exhausted on the peer side is independent per key.
        assert!(limiter.check("cred-c", "peer-c"));
    }

    #[test]
    fn default_config_has_sane_values() {
        let config = RateLimitConfig::default();
        assert!(config.max_requests > 0);
        assert!(config.window_secs > 0);
    }
}
