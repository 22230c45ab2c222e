//! Rate limiting middleware.

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::{
    collections::HashMap,
    net::SocketAddr,
    num::NonZeroU32,
    sync::{Arc, RwLock},
    time::Duration,
};

use crate::config::RateLimitConfig;

/// Per-IP rate limiter using Governor.
pub type IpRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// State for rate limiting.
#[derive(Clone)]
pub struct RateLimitState {
    /// Per-IP rate limiters for the upload endpoint.
    upload_limiters: Arc<RwLock<HashMap<String, Arc<IpRateLimiter>>>>,
    /// Per-IP rate limiters for the download endpoint.
    download_limiters: Arc<RwLock<HashMap<String, Arc<IpRateLimiter>>>>,
    /// Upload quota.
    upload_quota: Quota,
    /// Download quota.
    download_quota: Quota,
}

impl RateLimitState {
    /// Create a new rate limit state from configuration.
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            upload_limiters: Arc::new(RwLock::new(HashMap::new())),
            download_limiters: Arc::new(RwLock::new(HashMap::new())),
            upload_quota: window_quota(config.upload_limit, config.window_secs),
            download_quota: window_quota(config.download_limit, config.window_secs),
        }
    }

    /// Get or create a rate limiter for the given IP.
    fn get_or_create_limiter(
        limiters: &RwLock<HashMap<String, Arc<IpRateLimiter>>>,
        ip: &str,
        quota: Quota,
    ) -> Arc<IpRateLimiter> {
        // Try read lock first
        {
            let read_guard = limiters.read().unwrap();
            if let Some(limiter) = read_guard.get(ip) {
                return limiter.clone();
            }
        }

        let mut write_guard = limiters.write().unwrap();

        // Double-check after acquiring write lock
        if let Some(limiter) = write_guard.get(ip) {
            return limiter.clone();
        }

        let limiter = Arc::new(RateLimiter::direct(quota));
        write_guard.insert(ip.to_string(), limiter.clone());
        limiter
    }

    /// Check if an upload request is allowed for the given IP.
    pub fn check_upload(&self, ip: &str) -> bool {
        let limiter = Self::get_or_create_limiter(&self.upload_limiters, ip, self.upload_quota);
        limiter.check().is_ok()
    }

    /// Check if a download request is allowed for the given IP.
    pub fn check_download(&self, ip: &str) -> bool {
        let limiter = Self::get_or_create_limiter(&self.download_limiters, ip, self.download_quota);
        limiter.check().is_ok()
    }

    /// Cleanup old entries (call periodically).
    pub fn cleanup(&self) {
        let mut upload_guard = self.upload_limiters.write().unwrap();
        upload_guard.retain(|_, v| Arc::strong_count(v) > 1);

        let mut download_guard = self.download_limiters.write().unwrap();
        download_guard.retain(|_, v| Arc::strong_count(v) > 1);
    }

    /// Start a background task to periodically clean up old entries.
    pub fn start_cleanup_task(self: Arc<Self>) {
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(300)).await; // Every 5 minutes
                self.cleanup();
            }
        });
    }
}

/// Build a quota of `limit` requests per `window_secs`, with the full
/// window available as burst.
fn window_quota(limit: u32, window_secs: u64) -> Quota {
    let limit = NonZeroU32::new(limit).unwrap_or(NonZeroU32::MIN);
    let replenish = Duration::from_secs(window_secs.max(1)) / limit.get();
    Quota::with_period(replenish)
        .unwrap_or_else(|| Quota::per_minute(limit))
        .allow_burst(limit)
}

/// Extract client IP from request.
fn get_client_ip(req: &Request<Body>) -> String {
    // Try X-Forwarded-For header first (for reverse proxy)
    if let Some(forwarded) = req
        .headers()
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok())
    {
        // Take the first IP in the chain
        if let Some(ip) = forwarded.split(',').next() {
            return ip.trim().to_string();
        }
    }

    // Try X-Real-IP header
    if let Some(real_ip) = req
        .headers()
        .get("X-Real-IP")
        .and_then(|v| v.to_str().ok())
    {
        return real_ip.to_string();
    }

    // Fall back to connection info
    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    // Default to unknown
    "unknown".to_string()
}

/// Rate limiting middleware for the upload endpoint.
pub async fn upload_rate_limit(
    state: Arc<RateLimitState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let ip = get_client_ip(&req);

    if !state.check_upload(&ip) {
        tracing::warn!(ip = %ip, "Upload rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            "Too many upload requests. Please try again later.",
        )
            .into_response();
    }

    next.run(req).await
}

/// Rate limiting middleware for the download endpoint.
///
/// Applied to the shared `/api/files/:key` route; only GET (download) is
/// limited, DELETE passes through unthrottled.
pub async fn download_rate_limit(
    state: Arc<RateLimitState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if req.method() == Method::GET {
        let ip = get_client_ip(&req);

        if !state.check_download(&ip) {
            tracing::warn!(ip = %ip, "Download rate limit exceeded");
            return (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many download requests. Please try again later.",
            )
                .into_response();
        }
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(upload: u32, download: u32) -> RateLimitConfig {
        RateLimitConfig {
            window_secs: 300,
            upload_limit: upload,
            download_limit: download,
        }
    }

    #[test]
    fn test_upload_rate_limit() {
        let state = RateLimitState::new(&test_config(3, 100));

        // First 3 requests should succeed
        assert!(state.check_upload("127.0.0.1"));
        assert!(state.check_upload("127.0.0.1"));
        assert!(state.check_upload("127.0.0.1"));

        // 4th request should fail
        assert!(!state.check_upload("127.0.0.1"));

        // Different IP should work
        assert!(state.check_upload("192.168.1.1"));
    }

    #[test]
    fn test_download_rate_limit() {
        let state = RateLimitState::new(&test_config(5, 3));

        assert!(state.check_download("127.0.0.1"));
        assert!(state.check_download("127.0.0.1"));
        assert!(state.check_download("127.0.0.1"));

        assert!(!state.check_download("127.0.0.1"));
    }

    #[test]
    fn test_limits_are_independent() {
        let state = RateLimitState::new(&test_config(1, 1));

        assert!(state.check_upload("127.0.0.1"));
        // Exhausting the upload limit leaves the download limit untouched.
        assert!(!state.check_upload("127.0.0.1"));
        assert!(state.check_download("127.0.0.1"));
    }

    #[test]
    fn test_window_quota_zero_limit_clamps() {
        // A zero limit clamps to one request rather than panicking.
        let _quota = window_quota(0, 300);
    }
}
